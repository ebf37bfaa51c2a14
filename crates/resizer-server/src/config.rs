//! Server configuration from command-line flags and environment.

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Default request body ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 << 20;

/// Default pixel ceiling for decoded and target images: 40 megapixels.
pub const DEFAULT_MAX_PIXELS: u64 = 40_000_000;

/// HTTP image resizer.
#[derive(Debug, Clone, Parser)]
#[command(name = "resizer-server", version, about, long_about = None)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "RESIZER_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Largest accepted request body, in bytes.
    #[arg(long, env = "RESIZER_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Largest decoded or requested image, in pixels. 0 disables the check.
    #[arg(long, env = "RESIZER_MAX_PIXELS", default_value_t = DEFAULT_MAX_PIXELS)]
    pub max_pixels: u64,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, env = "RESIZER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, env = "RESIZER_LOG_JSON")]
    pub log_json: bool,
}

impl Config {
    /// The pixel ceiling as the pipeline expects it.
    #[must_use]
    pub const fn pixel_limit(&self) -> Option<u64> {
        if self.max_pixels == 0 {
            None
        } else {
            Some(self.max_pixels)
        }
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set.
///
/// # Errors
///
/// Returns an error if `level` is not a valid filter directive or a
/// global subscriber is already installed.
pub fn init_tracing(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()?;
    }
    Ok(())
}
