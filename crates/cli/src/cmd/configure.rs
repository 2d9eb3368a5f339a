//! Interactive configuration

use anyhow::Context;
use clap::Args;
use jconfig_engine::ConfigTree;
use std::path::PathBuf;

use crate::command::Command;
use crate::common::{RuntimeContext, finish_run};
use crate::error::Result;
use crate::ui::TerminalDialog;

/// Walk the schema tree and prompt for every visible item
#[derive(Debug, Args)]
pub struct ConfigureCommand {
    /// Root schema file
    #[arg(short, long, value_name = "FILE", default_value = "./config.json")]
    pub input: String,

    /// Output configuration file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Generated header file
    #[arg(short = 'g', long = "header", value_name = "FILE")]
    pub header: Option<PathBuf>,
}

impl Command for ConfigureCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let outputs = context.outputs(self.output.as_deref(), self.header.as_deref());
        let mut tree = ConfigTree::new(&self.input)?;
        let mut dialog = TerminalDialog::new();

        tree.configure(tree.root(), &mut dialog)
            .with_context(|| format!("Failed to configure {}", self.input))?;
        finish_run(&tree, context, &outputs)
    }
}
