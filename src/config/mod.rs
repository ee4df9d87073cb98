//! Typed configuration from environment variables.
//!
//! Loads once at startup. Every setting has a default, so a bare environment
//! renders with `openscad` and `key.scad` into `./out`. CLI flags override.

pub mod tables;

pub use tables::KeyTables;

use crate::error::{Error, Result};
use std::num::NonZeroUsize;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub renderer: PathBuf,
    pub template: PathBuf,
    pub out_dir: PathBuf,
    pub max_concurrent: Option<NonZeroUsize>,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let max_concurrent = match var("KEYCAPS_MAX_CONCURRENT") {
            Some(raw) => Some(parse_positive("KEYCAPS_MAX_CONCURRENT", &raw)?),
            None => None,
        };

        Ok(Self {
            renderer: var("KEYCAPS_RENDERER")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("openscad")),
            template: var("KEYCAPS_TEMPLATE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("key.scad")),
            out_dir: var("KEYCAPS_OUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("out")),
            max_concurrent,
            otel_endpoint: var("OTEL_ENDPOINT"),
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_positive(name: &str, raw: &str) -> Result<NonZeroUsize> {
    raw.trim().parse::<NonZeroUsize>().map_err(|_| {
        Error::Config(format!("{name} must be a positive integer, got {raw:?}"))
    })
}
