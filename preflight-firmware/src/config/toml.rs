//! Simple TOML parser for the boot configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `params.toml`. It does NOT support all of TOML.
//!
//! Supported features:
//! - Key = value pairs (string, integer, float)
//! - [preflight] and [params] section headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Multi-line strings
//! - Arrays and inline tables
//! - Dotted keys

use heapless::String as HString;

use preflight_core::config::{ConfigError, PreflightConfig};
use preflight_drivers::params::{ParamError, ParamTable};

/// Longest boot argument line
pub const MAX_ARGS_LEN: usize = 64;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown section header
    InvalidSection,
    /// Value could not be parsed for its key
    InvalidValue,
    /// Key not understood in [preflight]
    UnknownKey,
    /// Parameter rejected by the table
    Param(ParamError),
    /// Resulting configuration is unusable
    Config(ConfigError),
}

/// Everything loaded from `params.toml`
#[derive(Debug, Clone, Default)]
pub struct BootConfig {
    /// Boot arguments, whitespace separated
    pub args: HString<MAX_ARGS_LEN>,
    pub preflight: PreflightConfig,
    pub params: ParamTable,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Preflight,
    Params,
}

/// Parse the boot configuration
pub fn parse_config(input: &str) -> Result<BootConfig, ParseError> {
    let mut config = BootConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            match section {
                Section::Preflight => apply_preflight(&mut config, key, value)?,
                Section::Params => {
                    let value: f32 = parse_number(value)?;
                    config.params.set(key, value).map_err(ParseError::Param)?;
                }
                // Keys before the first section are ignored
                Section::Root => {}
            }
        }
    }

    config.preflight.validate().map_err(ParseError::Config)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "preflight" => Ok(Section::Preflight),
        "params" => Ok(Section::Params),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = match value.find('#') {
        // Make sure # is not inside a string
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => value[..hash_pos].trim(),
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

fn parse_number<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

fn apply_preflight(config: &mut BootConfig, key: &str, value: &str) -> Result<(), ParseError> {
    let pf = &mut config.preflight;
    match key {
        "args" => {
            config.args.clear();
            config
                .args
                .push_str(parse_string(value))
                .map_err(|_| ParseError::InvalidValue)?;
        }
        "settle_ms" => pf.timing.settle_ms = parse_number(value)?,
        "message_gap_ms" => pf.timing.message_gap_ms = parse_number(value)?,
        "channel_count" => pf.channels.count = parse_number(value)?,
        "lower_bound" => pf.channels.lower_bound = parse_number(value)?,
        "upper_bound" => pf.channels.upper_bound = parse_number(value)?,
        "deadzone_max" => pf.channels.deadzone_max = parse_number(value)?,
        "alert_cycles" => pf.alert.cycles = parse_number(value)?,
        "alert_cycle_ms" => pf.alert.cycle_ms = parse_number(value)?,
        "major_every" => pf.alert.major_every = parse_number(value)?,
        "minor_every" => pf.alert.minor_every = parse_number(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}
