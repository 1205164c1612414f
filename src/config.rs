use std::{env, path::PathBuf};

use crate::{error::StreamError, stream::ShapePolicy, types::StreamResult};

pub const PAGE_SIZE_VAR: &str = "STREAM_PAGE_SIZE";
pub const SHAPE_POLICY_VAR: &str = "STREAM_SHAPE_POLICY";
pub const THRESHOLD_VAR: &str = "STREAM_THRESHOLD";
pub const SEED_CSV_VAR: &str = "STREAM_SEED_CSV";

const DEFAULT_PAGE_SIZE: usize = 100;
const DEFAULT_THRESHOLD: f64 = 25.0;

/// Settings of the `cursor-stream` binary.
///
/// The library itself has no defaults: page sizes and policies are always
/// passed in by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub page_size: usize,
    pub shape_policy: ShapePolicy,
    pub threshold: f64,
    pub seed_csv: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            shape_policy: ShapePolicy::default(),
            threshold: DEFAULT_THRESHOLD,
            seed_csv: None,
        }
    }
}

impl Config {
    pub fn from_env() -> StreamResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from any variable source; unset variables keep
    /// their default, malformed ones are rejected.
    pub fn from_lookup<F>(lookup: F) -> StreamResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup(PAGE_SIZE_VAR) {
            config.page_size = match v.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => return Err(invalid(PAGE_SIZE_VAR, &v)),
            };
        }
        if let Some(v) = lookup(SHAPE_POLICY_VAR) {
            config.shape_policy = v.parse()?;
        }
        if let Some(v) = lookup(THRESHOLD_VAR) {
            config.threshold = match v.trim().parse::<f64>() {
                Ok(t) if t.is_finite() => t,
                _ => return Err(invalid(THRESHOLD_VAR, &v)),
            };
        }
        if let Some(v) = lookup(SEED_CSV_VAR) {
            if !v.trim().is_empty() {
                config.seed_csv = Some(PathBuf::from(v));
            }
        }

        Ok(config)
    }
}

fn invalid(name: &str, value: &str) -> StreamError {
    StreamError::query(&format!("invalid value for {}: `{}`", name, value))
}
