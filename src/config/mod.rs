//! Run configuration loaded from TOML or JSON files.
mod loader;
mod parse;
pub mod types;

#[cfg(test)]
mod tests;

pub use loader::{load_config, load_config_file};
pub use types::{DurationValue, HttpMethod, RunConfig};

pub(crate) use parse::{parse_basic_auth, parse_duration_value, parse_header};
