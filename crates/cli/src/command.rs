//! Command trait for the jconfig CLI
//!
//! Every subcommand implements [`Command`] and receives the shared
//! [`RuntimeContext`] holding settings and run-wide flags.

use crate::common::RuntimeContext;
use crate::error::Result;

/// Trait for all jconfig commands
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` describing what went wrong.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
