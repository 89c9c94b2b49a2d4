//! Build script for preflight-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates params.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Capacity of the on-target parameter table
const MAX_PARAMS: usize = 128;

/// Longest parameter name the table stores
const MAX_PARAM_NAME: usize = 16;

/// Longest boot argument line
const MAX_ARGS_LEN: usize = 64;

/// Integer keys accepted in [preflight], with their upper limit
const PREFLIGHT_INTEGERS: &[(&str, i64)] = &[
    ("settle_ms", u32::MAX as i64),
    ("message_gap_ms", u32::MAX as i64),
    ("channel_count", 18),
    ("alert_cycles", u16::MAX as i64),
    ("alert_cycle_ms", u32::MAX as i64),
    ("major_every", u16::MAX as i64),
    ("minor_every", u16::MAX as i64),
];

/// Numeric keys accepted in [preflight]
const PREFLIGHT_FLOATS: &[&str] = &["lower_bound", "upper_bound", "deadzone_max"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate params.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=params.toml");

    let config_path = Path::new("params.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: params.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds params.toml as its boot configuration.      ║\n\
            ║  Please create one in the preflight-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read params.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in params.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_preflight(&config, &mut errors);
    validate_params(&config, &mut errors);
    report_errors("Invalid params.toml configuration", &errors);

    println!("cargo:warning=params.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report_errors(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Only [preflight] and [params] are understood by the on-target parser
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(table) = config.as_table() else {
        return;
    };
    for (name, value) in table {
        match (name.as_str(), value) {
            ("preflight" | "params", toml::Value::Table(_)) => {}
            ("preflight" | "params", _) => errors.push(format!("[{}] must be a table", name)),
            _ => errors.push(format!("unknown section or key '{}'", name)),
        }
    }
}

/// Validate [preflight] key types and ranges
fn validate_preflight(config: &toml::Value, errors: &mut Vec<String>) {
    let preflight = match config.get("preflight") {
        Some(toml::Value::Table(t)) => t,
        _ => return,
    };

    for (key, value) in preflight {
        if key == "args" {
            match value {
                toml::Value::String(args) if args.len() <= MAX_ARGS_LEN => {}
                toml::Value::String(_) => {
                    errors.push(format!("[preflight] args longer than {} chars", MAX_ARGS_LEN))
                }
                _ => errors.push("[preflight] args must be a string".to_string()),
            }
        } else if let Some((_, max)) = PREFLIGHT_INTEGERS.iter().find(|(name, _)| name == key) {
            match value {
                toml::Value::Integer(n) if (0..=*max).contains(n) => {}
                toml::Value::Integer(_) => {
                    errors.push(format!("[preflight] {} must be 0-{}", key, max))
                }
                _ => errors.push(format!("[preflight] {} must be an integer", key)),
            }
        } else if PREFLIGHT_FLOATS.contains(&key.as_str()) {
            if !matches!(value, toml::Value::Integer(_) | toml::Value::Float(_)) {
                errors.push(format!("[preflight] {} must be a number", key));
            }
        } else {
            errors.push(format!("[preflight] unknown key '{}'", key));
        }
    }

    for key in ["channel_count", "major_every", "minor_every"] {
        if let Some(toml::Value::Integer(0)) = preflight.get(key) {
            errors.push(format!("[preflight] {} cannot be 0", key));
        }
    }
}

/// Validate [params] names and values
fn validate_params(config: &toml::Value, errors: &mut Vec<String>) {
    let params = match config.get("params") {
        Some(toml::Value::Table(t)) => t,
        _ => return,
    };

    if params.len() > MAX_PARAMS {
        errors.push(format!("[params] holds {} entries, limit is {}", params.len(), MAX_PARAMS));
    }

    for (name, value) in params {
        if name.len() > MAX_PARAM_NAME {
            errors.push(format!("[params] name '{}' longer than {} chars", name, MAX_PARAM_NAME));
        }
        if !matches!(value, toml::Value::Integer(_) | toml::Value::Float(_)) {
            errors.push(format!("[params] {} must be a number", name));
        }
    }
}
