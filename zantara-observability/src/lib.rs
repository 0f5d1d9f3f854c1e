//! Structured logging for the zantara core. No HTTP middleware here —
//! transport is an out-of-scope collaborator; this crate covers the
//! ambient tracing setup and the `log_*!` macro family the rest of the
//! workspace uses.

pub mod init;
pub mod macros;

pub use init::*;

pub use tracing::{debug, error, info, instrument, span, trace, warn, Level};
