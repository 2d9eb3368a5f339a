//! Common utilities and types shared across CLI commands

use crate::error::Result;
use crate::repos::RepoExecutor;
use jconfig_config::Settings;
use jconfig_engine::ConfigTree;
use jconfig_engine::output::{write_config, write_header};
use owo_colors::OwoColorize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Shared state for command execution
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Loaded (or default) settings
    pub settings: Settings,
    /// Working directory of the run
    pub cwd: PathBuf,
    /// Skip cloning and building repos regardless of settings
    pub skip_repos: bool,
}

impl RuntimeContext {
    /// Create a context for one run
    #[must_use]
    pub fn new(settings: Settings, cwd: PathBuf, skip_repos: bool) -> Self {
        Self {
            settings,
            cwd,
            skip_repos,
        }
    }

    /// Whether repos should be processed in this run
    #[must_use]
    pub fn repos_enabled(&self) -> bool {
        self.settings.repos.enabled && !self.skip_repos
    }

    /// Output locations, with command-line overrides applied
    #[must_use]
    pub fn outputs(&self, config: Option<&Path>, header: Option<&Path>) -> OutputPaths {
        let resolve = |flag: Option<&Path>, setting: &Path| {
            let path = flag.unwrap_or(setting);
            if path.is_relative() {
                self.cwd.join(path)
            } else {
                path.to_path_buf()
            }
        };
        OutputPaths {
            config: resolve(config, &self.settings.output.config),
            header: resolve(header, &self.settings.output.header),
        }
    }
}

/// Where a run writes its results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// `.config` file
    pub config: PathBuf,
    /// Generated header
    pub header: PathBuf,
}

/// Build repos, then write `.config` and the header for a configured tree
pub fn finish_run(
    tree: &ConfigTree,
    context: &RuntimeContext,
    outputs: &OutputPaths,
) -> Result<()> {
    if context.repos_enabled() {
        RepoExecutor::new(&context.settings).run(tree)?;
    } else {
        tracing::debug!("repo processing disabled");
    }

    let generated = tree.gen_entries()?;

    let mut config = BufWriter::new(File::create(&outputs.config)?);
    write_config(&mut config, tree, &generated)?;
    config.flush()?;

    let mut header = BufWriter::new(File::create(&outputs.header)?);
    write_header(&mut header, &generated)?;
    header.flush()?;

    tracing::info!(
        config = %outputs.config.display(),
        header = %outputs.header.display(),
        variables = tree.store().len(),
        "outputs written"
    );
    println!(
        "{} {} and {}",
        "Wrote".green().bold(),
        outputs.config.display(),
        outputs.header.display()
    );
    Ok(())
}
