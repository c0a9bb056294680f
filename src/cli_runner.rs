//! Runs a parsed command line: resolves the conversion mode, permission
//! defaults and paths, then hands over to [`convert_path`].

use std::io::{self, Write};

use crate::cli::{self, Args};
use crate::common::PermDefaults;
use crate::convert::convert_path;
use crate::error::{ConvertError, Result};
use crate::format::{Format, Mode};

/// Public entry for running CLI logic.
pub fn run_cli_app(args: &Args) -> Result<()> {
    if args.list_outputs {
        return list_outputs(&mut io::stdout().lock()).map_err(|e| ConvertError::io("<stdout>", e));
    }

    let source = args
        .source
        .as_deref()
        .ok_or_else(|| ConvertError::Argument("missing source path".into()))?;

    let defaults = match cli::get_umask_from_opt_or_env(args.umask)? {
        Some(umask) => PermDefaults::with_umask(umask),
        None => PermDefaults::from_process(),
    };

    let mode = resolve_mode(args.from, args.to, &cli::program_name())?;
    convert_path(source, args.destination.as_deref(), mode.from, mode.to, defaults)?;
    Ok(())
}

/// Explicit flags win. The program name is only consulted without `--to`,
/// and then also supplies the source format unless `--from` is given.
fn resolve_mode(from: Option<Format>, to: Option<Format>, program: &str) -> Result<Mode> {
    match to {
        Some(to) => Ok(Mode { from, to }),
        None => {
            let named = Mode::from_program_name(program)?;
            Ok(Mode { from: from.or(named.from), to: named.to })
        }
    }
}

/// One line per writer: identifier, then extension.
pub fn list_outputs(out: &mut impl Write) -> io::Result<()> {
    for format in Format::ALL {
        let extension = if format.extension().is_empty() { "(directory)" } else { format.extension() };
        writeln!(out, "{:<8}{}", format.tag(), extension)?;
    }
    Ok(())
}
