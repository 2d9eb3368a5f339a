//! Replay of a saved configuration

use anyhow::Context;
use clap::Args;
use jconfig_engine::{ConfigTree, Defaults, Dialog, Replay, saved};
use std::path::PathBuf;

use crate::command::Command;
use crate::common::{RuntimeContext, finish_run};
use crate::error::Result;
use crate::ui::TerminalDialog;

/// Re-run configuration with answers taken from a saved `.config`
///
/// Items the saved file does not mention are prompted for, or take their
/// defaults with `--defaults`.
#[derive(Debug, Args)]
pub struct LoadCommand {
    /// Saved configuration to replay
    #[arg(short, long, value_name = "FILE")]
    pub input: PathBuf,

    /// Root schema file
    #[arg(short = 't', long = "template", value_name = "FILE", default_value = "./config.json")]
    pub template: String,

    /// Output configuration file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Generated header file
    #[arg(short = 'g', long = "header", value_name = "FILE")]
    pub header: Option<PathBuf>,

    /// Take defaults for items missing from the saved file instead of prompting
    #[arg(short = 'y', long)]
    pub defaults: bool,
}

impl Command for LoadCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let outputs = context.outputs(self.output.as_deref(), self.header.as_deref());
        let saved = saved::load(&self.input).with_context(|| {
            format!("Failed to read saved configuration {}", self.input.display())
        })?;
        tracing::info!(path = %self.input.display(), values = saved.len(), "replaying");

        let mut tree = ConfigTree::new(&self.template)?;
        let mut dialog: Box<dyn Dialog> = if self.defaults {
            Box::new(Replay::new(saved, Defaults))
        } else {
            Box::new(Replay::new(saved, TerminalDialog::new()))
        };

        tree.configure(tree.root(), dialog.as_mut())
            .with_context(|| format!("Failed to configure {}", self.template))?;
        finish_run(&tree, context, &outputs)
    }
}
