//! Command line handling

use crate::error::UsageError;
use crate::verdict::FailurePolicy;

/// Usage text printed for `--help` and for any argument not understood
pub const USAGE: &str =
    "usage: preflight_check [--fail-on-error]\n\tif fail on error is enabled, will return 1 on error";

pub const FAIL_ON_ERROR: &str = "--fail-on-error";
pub const HELP: &str = "--help";

/// Parse the arguments following the program name
///
/// `--fail-on-error` may be repeated. `--help` wins over everything else,
/// wherever it appears.
pub fn parse_args<'a, I>(args: I) -> Result<FailurePolicy, UsageError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut policy = FailurePolicy::Tolerate;
    let mut unknown = false;

    for arg in args {
        match arg {
            FAIL_ON_ERROR => policy = FailurePolicy::Strict,
            HELP => return Err(UsageError::HelpRequested),
            _ => {
                #[cfg(feature = "defmt")]
                defmt::warn!("unknown argument: {}", arg);
                unknown = true;
            }
        }
    }

    if unknown {
        Err(UsageError::UnknownArgument)
    } else {
        Ok(policy)
    }
}

/// Split a whitespace separated argument line
pub fn split_args(line: &str) -> impl Iterator<Item = &str> {
    line.split_whitespace()
}
