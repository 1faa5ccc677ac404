use std::path::Path;
use anyhow::{anyhow, Result};

use crate::config::proc_loader::{file_to_config, parse_config};
use crate::config::settings::ServiceConfig;

/// Settings from `config_path`, or built-in defaults when no file is given.
pub fn run(config_path: Option<&str>) -> Result<ServiceConfig> {
    match config_path {
        Some(config_path) => {
            let path = Path::new(config_path);
            file_to_config(path).map_err(|e| anyhow!(format!("Invalid config format: {}", e)))
        }
        None => parse_config(""),
    }
}
