//! Turn a callable's signature and its description into a command-line
//! grammar.
//!
//! A [`Command`] wraps a function together with a [`Signature`] (its
//! parameters, defaults and catch-alls) and an optional free-form
//! description. Option lines in the description such as
//! `-t=<int>, --times=<int>` contribute short aliases and metavars; the
//! metavars select how values are cast. Parsing never consults global state:
//! callers pass the raw tokens and decide what to do with the result.
//!
//! - [`Command::parse`] turns tokens into positional and keyword values.
//! - [`Command::execute`] parses and calls the wrapped function.
//! - [`Command::build_usage`] renders a one-line synopsis.
//! - [`Program`] dispatches between several commands.

pub mod bind;
pub mod cast;
pub mod command;
pub mod error;
pub mod model;
pub mod program;
pub mod scan;
pub mod signature;
pub mod usage;
pub mod value;

pub use bind::Parsed;
pub use cast::Caster;
pub use command::{Callable, Command, RawArgs};
pub use error::{Error, InvokeError, ParseError, Result, SignatureError};
pub use model::ParameterModel;
pub use program::{Outcome, Program, ProgramOptions};
pub use signature::{Arguments, Param, Signature};
pub use value::Value;
