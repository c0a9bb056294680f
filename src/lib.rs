//! # vba2zip Core Library
//!
//! Converts between four archive-like containers: a directory tree, a Vim
//! "Vimball" text archive, its gzip-compressed variant, and a zip archive.
//!
//! ## Key Modules
//!
//! - [`common`]: The [`Member`] value every reader produces and every writer consumes.
//! - [`reader`]: Directory and Vimball (plain or gzipped) sources.
//! - [`writer`]: Directory, Vimball, gzipped Vimball and zip destinations.
//! - [`format`]: Format tags, source auto-detection and default output names.
//! - [`convert`]: The driver moving members from a reader into a writer.
//!
//! ## Examples
//!
//! ```no_run
//! use std::path::Path;
//! use vba2zip::{convert_path, Format, PermDefaults};
//!
//! let out = convert_path(Path::new("plugin.vba"), None, None, Format::Zip, PermDefaults::from_process())?;
//! assert_eq!(out, Path::new("plugin.zip"));
//! # Ok::<(), vba2zip::ConvertError>(())
//! ```

pub mod cli;
pub mod cli_runner;
pub mod common;
pub mod convert;
pub mod error;
pub mod format;
pub mod reader;
pub mod writer;

// Cross-platform filesystem wrapper
pub mod fsx;

pub use common::{Member, PermDefaults};
pub use convert::{convert, convert_path, ConvertStats};
pub use error::ConvertError;
pub use format::{Format, Mode};
pub use reader::Reader;
pub use writer::{ArchiveWrite, Writer};
