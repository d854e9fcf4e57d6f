//! Configuration management utilities.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::app::store::DEFAULT_MAX_FILES;
use crate::domain::model::{MergeOptions, SeparatorStyle, SortKey};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".codemerge/config.toml";

/// Layered configuration loaded from defaults, user, workspace, explicit file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub merge: Merge,
    #[serde(default)]
    pub export: Export,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Limits {
    #[serde(default)]
    max_files: Option<usize>,
    #[serde(default)]
    read_threads: Option<usize>,
}

impl Limits {
    pub fn max_files(&self) -> usize {
        self.max_files.unwrap_or(DEFAULT_MAX_FILES)
    }

    pub fn read_threads(&self) -> usize {
        self.read_threads.unwrap_or(0)
    }

    pub fn set_max_files(&mut self, value: usize) {
        self.max_files = Some(value);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Merge {
    #[serde(default)]
    include_separator: Option<bool>,
    #[serde(default)]
    separator_style: Option<SeparatorStyle>,
    #[serde(default)]
    sort: Option<SortKey>,
}

impl Merge {
    pub fn include_separator(&self) -> bool {
        self.include_separator.unwrap_or(true)
    }

    pub fn separator_style(&self) -> SeparatorStyle {
        self.separator_style.unwrap_or_default()
    }

    pub fn sort(&self) -> SortKey {
        self.sort.unwrap_or_default()
    }

    pub fn options(&self) -> MergeOptions {
        MergeOptions {
            include_separator: self.include_separator(),
            separator_style: self.separator_style(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Export {
    #[serde(default)]
    file_prefix: Option<String>,
    #[serde(default)]
    output_dir: Option<PathBuf>,
    #[serde(default)]
    copy_to_clipboard: Option<bool>,
}

impl Export {
    fn default_file_prefix() -> &'static str {
        "merged-code"
    }

    pub fn file_prefix(&self) -> String {
        self.file_prefix
            .clone()
            .unwrap_or_else(|| Self::default_file_prefix().to_owned())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn copy_to_clipboard(&self) -> bool {
        self.copy_to_clipboard.unwrap_or(false)
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    max_files: Option<String>,
    sort: Option<String>,
    separator_style: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            max_files: env::var("CODEMERGE_MAX_FILES").ok(),
            sort: env::var("CODEMERGE_SORT").ok(),
            separator_style: env::var("CODEMERGE_SEPARATOR_STYLE").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(max_files: &str, sort: &str, separator_style: &str) -> Self {
        Self {
            max_files: Some(max_files.to_owned()),
            sort: Some(sort.to_owned()),
            separator_style: Some(separator_style.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    ///
    /// `explicit` is an additional file layered above the workspace config.
    pub fn load_with_explicit(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit
            && !path.exists()
        {
            anyhow::bail!("config file not found: {}", path.display());
        }

        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, explicit.map(Path::to_path_buf), env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        explicit: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        for path in [global, workspace, explicit].into_iter().flatten() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading config layer");
                layers.push(Self::from_file(&path)?);
            }
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        apply_env_overrides(merged, env_overrides)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data).with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            limits: merge_limits(self.limits, other.limits),
            merge: merge_merge(self.merge, other.merge),
            export: merge_export(self.export, other.export),
        }
    }
}

fn merge_limits(mut base: Limits, overlay: Limits) -> Limits {
    if let Some(value) = overlay.max_files {
        base.max_files = Some(value);
    }
    if let Some(value) = overlay.read_threads {
        base.read_threads = Some(value);
    }
    base
}

fn merge_merge(mut base: Merge, overlay: Merge) -> Merge {
    if let Some(value) = overlay.include_separator {
        base.include_separator = Some(value);
    }
    if let Some(value) = overlay.separator_style {
        base.separator_style = Some(value);
    }
    if let Some(value) = overlay.sort {
        base.sort = Some(value);
    }
    base
}

fn merge_export(mut base: Export, overlay: Export) -> Export {
    if let Some(value) = overlay.file_prefix {
        base.file_prefix = Some(value);
    }
    if let Some(value) = overlay.output_dir {
        base.output_dir = Some(value);
    }
    if let Some(value) = overlay.copy_to_clipboard {
        base.copy_to_clipboard = Some(value);
    }
    base
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("codemerge/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Result<Config> {
    if let Some(raw) = env.max_files {
        let value = raw
            .trim()
            .parse()
            .with_context(|| format!("CODEMERGE_MAX_FILES must be a number, got '{raw}'"))?;
        config.limits.max_files = Some(value);
    }
    if let Some(raw) = env.sort {
        config.merge.sort = Some(raw.parse().context("invalid CODEMERGE_SORT")?);
    }
    if let Some(raw) = env.separator_style {
        config.merge.separator_style =
            Some(raw.parse().context("invalid CODEMERGE_SEPARATOR_STYLE")?);
    }
    Ok(config)
}
