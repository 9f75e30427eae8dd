//! `.logtallyrc` / `config.ini` support: default arguments and named aliases.
//!
//! ```ini
//! defaults = --format markdown --top 5
//!
//! [aliases]
//! errors = --filter-field status --filter-value 500
//! api-errors = -a errors --threads 4
//! ```

use anyhow::{anyhow, bail, Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const PROJECT_FILE_NAME: &str = ".logtallyrc";
const APP_DIR: &str = "logtally";
const USER_FILE_NAME: &str = "config.ini";
const MAX_ALIAS_DEPTH: usize = 10;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub defaults: Option<String>,
    pub aliases: BTreeMap<String, String>,
}

impl ConfigFile {
    /// Parse INI text. Unknown keys and sections are ignored.
    pub fn parse(content: &str) -> Result<Self> {
        let mut config = Self::default();
        let mut section: Option<String> = None;

        for (number, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                section = Some(name.trim().to_string());
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                bail!("line {}: expected 'key = value', got '{}'", number + 1, line);
            };
            let (key, value) = (key.trim(), value.trim());

            match section.as_deref() {
                None if key == "defaults" => config.defaults = Some(value.to_string()),
                Some("aliases") => {
                    config.aliases.insert(key.to_string(), value.to_string());
                }
                _ => {}
            }
        }

        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Load the explicit file if given, otherwise the first file found in the
    /// search order. No file at all yields an empty configuration.
    pub fn load(custom_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = custom_path {
            return Self::load_from_path(path);
        }
        match find_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Prepend defaults (after the program name) and expand `-a/--alias NAME`.
    ///
    /// User arguments come after the defaults so they win on conflicts.
    pub fn expand_args(&self, args: Vec<String>) -> Result<Vec<String>> {
        let mut args = args.into_iter();
        let mut combined: Vec<String> = args.next().into_iter().collect();

        if let Some(defaults) = &self.defaults {
            let words = shell_words::split(defaults)
                .context("Invalid defaults: failed to parse arguments")?;
            combined.extend(words);
        }
        combined.extend(args);

        self.expand_aliases(combined, &mut HashSet::new(), 0)
    }

    fn expand_aliases(
        &self,
        args: Vec<String>,
        active: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Vec<String>> {
        let mut expanded = Vec::with_capacity(args.len());
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            if let Some(name) = attached_alias_name(&arg) {
                expanded.extend(self.resolve_alias(name, active, depth)?);
                continue;
            }
            if arg != "-a" && arg != "--alias" {
                expanded.push(arg);
                continue;
            }
            let Some(name) = iter.next() else {
                // Dangling flag is left for clap to report.
                expanded.push(arg);
                break;
            };
            expanded.extend(self.resolve_alias(&name, active, depth)?);
        }

        Ok(expanded)
    }

    /// Arguments an alias stands for, with nested aliases expanded.
    pub fn resolve_alias(
        &self,
        name: &str,
        active: &mut HashSet<String>,
        depth: usize,
    ) -> Result<Vec<String>> {
        if depth >= MAX_ALIAS_DEPTH {
            return Err(anyhow!("Alias chain too deep: more than {} levels", MAX_ALIAS_DEPTH));
        }
        if !active.insert(name.to_string()) {
            return Err(anyhow!("Circular dependency detected in alias: {}", name));
        }

        let value = self
            .aliases
            .get(name)
            .ok_or_else(|| anyhow!("Unknown alias: {}", name))?;
        let words = shell_words::split(value)
            .with_context(|| format!("Invalid alias '{}': failed to parse arguments", name))?;
        let resolved = self.expand_aliases(words, active, depth + 1)?;

        active.remove(name);
        Ok(resolved)
    }

    /// Human-readable description for `--show-config`.
    pub fn describe(&self, loaded_from: Option<&Path>) -> String {
        let mut out = String::new();
        match loaded_from {
            Some(path) => out.push_str(&format!("Configuration loaded from: {}\n", path.display())),
            None => out.push_str("No configuration file found. Using built-in defaults.\n"),
        }

        if let Some(defaults) = &self.defaults {
            out.push_str(&format!("\ndefaults = {}\n", defaults));
        }
        if !self.aliases.is_empty() {
            out.push_str("\n[aliases]\n");
            for (name, value) in &self.aliases {
                out.push_str(&format!("{} = {}\n", name, value));
            }
        }

        out.push_str("\nSearch order:\n");
        for (i, path) in config_search_paths().iter().enumerate() {
            let status = if path.is_file() { "found" } else { "not found" };
            out.push_str(&format!("  {}. {} ({})\n", i + 1, path.display(), status));
        }
        out
    }
}

/// Nearest `.logtallyrc` walking up from `start`.
pub fn find_project_config_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(PROJECT_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

pub fn user_config_paths() -> Vec<PathBuf> {
    let home = env::var_os("HOME").map(PathBuf::from);
    let config_home = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| home.as_ref().map(|h| h.join(".config")));

    let mut paths = Vec::new();
    if let Some(dir) = config_home {
        paths.push(dir.join(APP_DIR).join(USER_FILE_NAME));
    }
    if let Some(home) = home {
        paths.push(home.join(PROJECT_FILE_NAME));
    }
    paths
}

/// Candidate files in precedence order: project first, then user files.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(project) = env::current_dir()
        .ok()
        .and_then(|cwd| find_project_config_from(&cwd))
    {
        paths.push(project);
    }
    paths.extend(user_config_paths());
    paths
}

pub fn find_config_path() -> Option<PathBuf> {
    config_search_paths().into_iter().find(|p| p.is_file())
}

/// Alias name given in the same word as the flag: `--alias=NAME`, `-a=NAME` or `-aNAME`.
fn attached_alias_name(arg: &str) -> Option<&str> {
    let name = match arg.strip_prefix("--alias=") {
        Some(name) => name,
        None => {
            let rest = arg.strip_prefix("-a").filter(|rest| !rest.is_empty())?;
            rest.strip_prefix('=').unwrap_or(rest)
        }
    };
    Some(name)
}
