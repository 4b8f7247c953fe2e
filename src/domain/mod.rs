pub mod item;
pub mod page;

pub use item::{
    fingerprint, FeedItem, LinkSource, PostKindTag, ResolvedLink, ResolvedTimestamp,
    TimestampSource,
};
pub use page::PageContext;
