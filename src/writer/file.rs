use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::app::Result;
use crate::domain::{FeedItem, PageContext};
use crate::writer::serialize;

/// Write the feed to `dest`, replacing any previous file.
///
/// The document goes to a temporary file next to `dest` first and is renamed
/// into place once complete, so readers never see a partial feed.
pub fn write_feed_file(dest: &Path, page: &PageContext, items: &[FeedItem]) -> Result<usize> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let tmp = NamedTempFile::new_in(dir)?;
    debug!("Staging feed in {}", tmp.path().display());

    let mut buffered = serialize(page, items, BufWriter::new(tmp))?;
    buffered.flush()?;

    let tmp = buffered.into_inner().map_err(|e| e.into_error())?;
    tmp.as_file().sync_all()?;
    publishable(&tmp)?;
    tmp.persist(dest).map_err(|e| e.error)?;

    info!("Wrote {} items to {}", items.len(), dest.display());
    Ok(items.len())
}

// Temp files are created owner-only; a feed is meant to be served.
#[cfg(unix)]
fn publishable(tmp: &NamedTempFile) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tmp.as_file()
        .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    Ok(())
}

#[cfg(not(unix))]
fn publishable(_tmp: &NamedTempFile) -> Result<()> {
    Ok(())
}
