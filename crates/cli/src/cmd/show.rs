//! Print the configuration tree

use anyhow::Context;
use clap::Args;
use jconfig_engine::{ConfigTree, Defaults, Replay, saved};
use std::path::PathBuf;

use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;

/// Parse every visible node with default (or saved) values and print a report
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Root schema file
    #[arg(short, long, value_name = "FILE", default_value = "./config.json")]
    pub input: String,

    /// Saved configuration to apply before reporting
    #[arg(short, long, value_name = "FILE")]
    pub saved: Option<PathBuf>,
}

impl Command for ShowCommand {
    type Output = String;

    fn execute(&self, _context: &RuntimeContext) -> Result<String> {
        let mut tree = ConfigTree::new(&self.input)?;
        let answers = match &self.saved {
            Some(path) => saved::load(path)?,
            None => indexmap::IndexMap::new(),
        };
        tree.configure(tree.root(), &mut Replay::new(answers, Defaults))
            .with_context(|| format!("Failed to load {}", self.input))?;

        let report = tree.report_all();
        print!("{report}");
        Ok(report)
    }
}
