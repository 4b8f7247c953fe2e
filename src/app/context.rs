use std::path::Path;

use crate::app::error::Result;
use crate::config::Config;

pub struct AppContext {
    pub config: Config,
}

impl AppContext {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        Ok(Self {
            config: Config::load(config_path)?,
        })
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }
}
