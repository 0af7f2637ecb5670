// File: ./src/context.rs
//! Where daybook keeps its config file and key-value store.
//!
//! Both locations hang off a root: the platform dirs from
//! `directories::ProjectDirs`, the `--root` override of the CLI, or a
//! throwaway temp dir in tests.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";
const STORE_FILE: &str = "store.json";

pub trait AppContext: std::fmt::Debug {
    fn get_data_dir(&self) -> Result<PathBuf>;
    fn get_config_dir(&self) -> Result<PathBuf>;

    fn get_config_file_path(&self) -> Result<PathBuf> {
        Ok(self.get_config_dir()?.join(CONFIG_FILE))
    }

    fn get_store_path(&self) -> Result<PathBuf> {
        Ok(self.get_data_dir()?.join(STORE_FILE))
    }
}

fn create_dir(path: PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create directory: {:?}", path))?;
    Ok(path)
}

#[derive(Clone, Debug)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    /// With `Some(root)`, config goes to `root/config` and data to `root/data`.
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    fn resolve(&self, sub: &str, platform: fn(&ProjectDirs) -> &Path) -> Result<PathBuf> {
        let path = match &self.override_root {
            Some(root) => root.join(sub),
            None => ProjectDirs::from("org", "daybook", "daybook")
                .map(|dirs| platform(&dirs).to_path_buf())
                .ok_or_else(|| anyhow::anyhow!("No home directory"))?,
        };
        create_dir(path)
    }
}

impl AppContext for StandardContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        self.resolve("data", ProjectDirs::data_dir)
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        self.resolve("config", ProjectDirs::config_dir)
    }
}

/// Temp-dir layout for tests, deleted on drop.
#[derive(Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("daybook_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        create_dir(self.root.join("data"))
    }

    fn get_config_dir(&self) -> Result<PathBuf> {
        create_dir(self.root.join("config"))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
