use std::{fs, path::Path};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::config::settings::{LoggingConfig, ServiceConfig};

/// Load settings from a YAML file, expanding `${VAR}` / `${VAR:default}` first.
pub fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;

    let expanded = expand_env_vars(&content);
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = if content.trim().is_empty() {
        ServiceConfig::default()
    } else {
        serde_yaml::from_str(content)?
    };

    // Apply defaults
    if service_config.logging.is_none() {
        service_config.logging = Some(LoggingConfig::default());
    }
    service_config.upstream.api_base = service_config.upstream.api_base.trim_end_matches('/').to_owned();
    debug!("config parsed: {:?}", service_config);

    Ok(service_config)
}

fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
