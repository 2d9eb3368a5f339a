//! Terminal user interface components

pub mod prompt;

pub use prompt::TerminalDialog;
