//! Parse `.env` files and turn them into shell statements.
//!
//! [`parse_str`] and friends return every `NAME=VALUE` assignment in document
//! order. Values may be unquoted, `'single'`, `"double"`, or triple-quoted
//! (`'''`/`"""`) across several lines. Double-quoted, triple-double-quoted and
//! unquoted values expand backslash escapes and `${NAME}` references; a
//! reference resolves to the first earlier binding with that name, then to the
//! host environment, then to nothing.
//!
//! The host environment is only ever read, through an [`EnvLookup`]. Use the
//! `_with_env` variants to supply a fixed map in place of the process
//! environment.
//!
//! [`EnvLoader`] locates a dotenv file on disk, and [`Shell`] formats bindings
//! as `export`/`set`/`$env:` statements.

mod env;
mod error;
mod escape;
mod interpolate;
mod loader;
mod model;
mod parser;
mod shell;

pub use env::{EnvLookup, HostEnv};
pub use error::{Error, ParseError, ParseErrorKind};
pub use loader::{EnvLoader, dotenv, parse_path};
pub use model::{Binding, LoadedEnv};
pub use parser::{
    parse_bytes, parse_bytes_with_env, parse_reader, parse_reader_with_env, parse_str,
    parse_str_with_env,
};
pub use shell::{Shell, UnknownShell, quote, render};
