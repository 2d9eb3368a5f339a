//! Fetching and building repos declared in schemas
//!
//! For every repo of a parsed node, in tree order:
//!
//! 1. clone the checkout with git2 when it does not exist yet
//! 2. read `package.json` and check its name
//! 3. run the build commands through `sh -c` inside the checkout
//! 4. copy the listed outputs into the output directory
//! 5. append the repo's lines to the ledger next to the declaring schema

use crate::error::{CommandError, Result};
use jconfig_config::Settings;
use jconfig_engine::repo::RepoLedger;
use jconfig_engine::{ConfigTree, RepoSite};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Runs the side effects of repo entries for one configuration run
#[derive(Debug)]
pub struct RepoExecutor {
    ledger_name: String,
    clean_ledger: bool,
    ledger: RepoLedger,
}

impl RepoExecutor {
    /// Executor following the `[repos]` and `[output]` settings
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        Self {
            ledger_name: settings.output.ledger.clone(),
            clean_ledger: settings.repos.clean_ledger,
            ledger: RepoLedger::new(),
        }
    }

    /// Process every repo of the tree
    pub fn run(&mut self, tree: &ConfigTree) -> Result<()> {
        let sites = tree.repo_sites();
        if self.clean_ledger {
            self.clean_ledgers(tree)?;
        }
        if sites.is_empty() {
            return Ok(());
        }

        info!(count = sites.len(), "processing repos");
        for site in &sites {
            self.process(tree, site)?;
        }
        Ok(())
    }

    /// Remove ledgers left by a previous run next to every parsed schema
    fn clean_ledgers(&self, tree: &ConfigTree) -> Result<()> {
        let mut seen = HashSet::new();
        for node_id in tree.walk() {
            let Some(base_dir) = tree.node(node_id).and_then(|n| n.base_dir()) else {
                continue;
            };
            let ledger = base_dir.join(&self.ledger_name);
            if seen.insert(ledger.clone()) && ledger.is_file() {
                debug!(path = %ledger.display(), "removing stale ledger");
                fs::remove_file(&ledger)?;
            }
        }
        Ok(())
    }

    fn process(&mut self, tree: &ConfigTree, site: &RepoSite<'_>) -> Result<()> {
        let store = tree.store();
        let repo = site.repo;
        let dir = repo.resolved_dir(store);
        let out_dir = repo.resolved_out_dir(store);

        info!(repo = repo.name(), url = repo.url().unwrap_or("-"), path = %dir.display(), "repo");
        if !dir.exists() {
            let Some(url) = repo.url() else {
                return Err(CommandError::MissingRepoUrl {
                    name: repo.name().to_string(),
                    path: dir,
                });
            };
            clone(url, &dir)?;
        }

        let manifest = repo.load_manifest(store)?;
        for command in repo.build_commands(&manifest) {
            build(command, &dir)?;
        }

        fs::create_dir_all(&out_dir)?;
        for output in &manifest.output {
            copy_output(&dir.join(output), &out_dir)?;
        }

        let entry = self.ledger.entry(&dir, &out_dir, &manifest);
        let ledger_path = site.base_dir.join(&self.ledger_name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&ledger_path)?;
        file.write_all(entry.as_bytes())?;
        debug!(path = %ledger_path.display(), "ledger updated");
        Ok(())
    }
}

fn clone(url: &str, dir: &Path) -> Result<()> {
    debug!(url, path = %dir.display(), "Starting git clone");
    git2::build::RepoBuilder::new()
        .clone(url, dir)
        .map_err(|source| CommandError::Clone {
            url: url.to_string(),
            source,
        })?;
    info!(path = %dir.display(), "Repository cloned successfully");
    Ok(())
}

fn build(command: &str, dir: &Path) -> Result<()> {
    debug!(command, dir = %dir.display(), "running build command");
    duct::cmd("sh", ["-c", command])
        .dir(dir)
        .stderr_to_stdout()
        .run()
        .map(|_| ())
        .map_err(|source| CommandError::BuildFailed {
            command: command.to_string(),
            dir: dir.to_path_buf(),
            source,
        })
}

fn copy_output(from: &Path, out_dir: &Path) -> Result<()> {
    let to: PathBuf = match from.file_name() {
        Some(name) => out_dir.join(name),
        None => out_dir.to_path_buf(),
    };
    fs::copy(from, &to).map_err(|source| CommandError::CopyOutput {
        from: from.to_path_buf(),
        to: out_dir.to_path_buf(),
        source,
    })?;
    Ok(())
}
