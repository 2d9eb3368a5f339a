//! CLI command implementations

pub mod configure;
pub mod load;
pub mod show;
