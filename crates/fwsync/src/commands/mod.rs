//! Command handlers, one module per subcommand.

pub mod apply;
pub mod fetch;
pub mod validate;

use std::io::Read;
use std::path::Path;

use fwsync_core::Payload;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Read and parse a payload file; `-` reads stdin (for pipeline use).
pub fn read_payload(path: &Path) -> Result<Payload, CliError> {
    let contents = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&contents)?)
}

/// Load the config file, honoring `--config` and flag overrides.
pub fn load_config(global: &GlobalOpts) -> Result<fwsync_config::Config, CliError> {
    let mut config = match &global.config {
        Some(path) => fwsync_config::load_config_from(path)?,
        None => fwsync_config::load_config_or_default(),
    };

    if !global.project.is_empty() {
        config.projects = global.project.clone();
    }
    if let Some(timeout) = global.timeout {
        config.transport.timeout_secs = timeout;
    }
    if global.insecure {
        config.transport.insecure = true;
    }

    Ok(config)
}
