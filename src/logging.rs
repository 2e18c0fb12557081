//! Logger initialisation.
//!
//! Everything in the crate logs through the `log` facade; this only installs
//! `env_logger` behind it.

use std::sync::Once;

use serde::{Deserialize, Serialize};

/// Logger configuration.
///
/// `filter` follows the `env_logger` filter syntax, e.g. `"info"` or
/// `"rtgl=debug,wgpu=warn"`. `color` forces ANSI colouring on or off; unset means
/// auto-detect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub color: Option<bool>,
}

impl LoggingConfig {
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            filter: Some(filter.into()),
            color: None,
        }
    }

    fn write_style(&self) -> env_logger::WriteStyle {
        match self.color {
            Some(true) => env_logger::WriteStyle::Always,
            Some(false) => env_logger::WriteStyle::Never,
            None => env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initialises the global logger once; later calls are ignored.
///
/// The filter comes from the config, then `RUST_LOG`, then defaults to `info`.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style());

        // A test harness may already have installed a logger
        if builder.try_init().is_err() {
            log::debug!("logger already installed");
            return;
        }

        log::debug!("logging initialized");
    });
}
