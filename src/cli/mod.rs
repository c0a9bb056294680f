use clap::Parser;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::format::Format;

/// Environment variable consulted when `--umask` is not given.
pub const UMASK_ENV: &str = "VBA2ZIP_UMASK";

/// Convert between directories, Vimball archives (plain or gzipped) and zip archives.
///
/// The output format comes from --to or, failing that, from the program name,
/// read as `<src>2<dst>` (`vba2zip` reads Vimball and writes zip). The source
/// format comes from --from, then from the program name when --to is absent,
/// and is otherwise detected.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The directory or archive to convert.
    #[arg(required_unless_present = "list_outputs")]
    pub source: Option<PathBuf>,

    /// Where to write the result. Defaults to the source's base name with the output extension.
    pub destination: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, value_enum)]
    pub to: Option<Format>,

    /// Source format, skipping detection.
    #[arg(short, long, value_enum)]
    pub from: Option<Format>,

    /// List the available output formats and exit.
    #[arg(long = "list-outputs", alias = "list_outputs")]
    pub list_outputs: bool,

    /// File-creation mask (octal) used for default permissions. Falls back to VBA2ZIP_UMASK, then the process umask.
    #[arg(long, value_parser = parse_octal)]
    pub umask: Option<u32>,

    /// Log every member as it is converted.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses an octal permission mask such as `022` or `0o077`.
pub fn parse_octal(value: &str) -> Result<u32, String> {
    let digits = value.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);
    match u32::from_str_radix(digits, 8) {
        Ok(mask) if mask <= 0o777 => Ok(mask),
        Ok(_) => Err(format!("umask '{}' is larger than 777", value)),
        Err(_) => Err(format!("umask '{}' is not an octal number", value)),
    }
}

/// Gets the umask from the command-line option or the `VBA2ZIP_UMASK` environment variable.
///
/// Priority:
/// 1. `--umask` command-line argument.
/// 2. `VBA2ZIP_UMASK` environment variable.
/// 3. Returns `Ok(None)` if neither is present, letting the caller query the process.
pub fn get_umask_from_opt_or_env(umask_opt: Option<u32>) -> Result<Option<u32>, ConvertError> {
    if let Some(mask) = umask_opt {
        return Ok(Some(mask));
    }
    match std::env::var(UMASK_ENV) {
        Ok(value) => parse_octal(&value)
            .map(Some)
            .map_err(|e| ConvertError::Argument(format!("{}: {}", UMASK_ENV, e))),
        Err(_) => Ok(None),
    }
}

/// Name this program was invoked as, without its directory.
pub fn program_name() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_owned())
}

/// Parses command-line arguments using `clap`.
///
/// Unlike `Args::parse`, errors (including `--help`) are returned so the caller
/// decides on the exit code.
pub fn run() -> Result<Args, clap::Error> {
    Args::try_parse()
}
