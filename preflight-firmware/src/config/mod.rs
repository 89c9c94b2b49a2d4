//! Boot configuration
//!
//! The configuration is compiled into the image from `params.toml` and
//! parsed at boot by a small no_std parser.

pub mod toml;

pub use toml::{parse_config, BootConfig, ParseError};
