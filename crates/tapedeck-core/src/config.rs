use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::locator::DEFAULT_MAX_ANCESTOR_DEPTH;
use crate::prefs::DEFAULT_PATH;

/// Global configuration loaded from `~/.config/tapedeck/config.toml`.
/// Keys missing from the file take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapedeckConfig {
    /// Custom URI scheme the external downloader is registered for.
    pub scheme: String,
    /// Debounce quiet window for change observation, in milliseconds.
    pub quiet_window_ms: u64,
    /// Save path offered when no path has been remembered for a site.
    pub default_path: String,
    /// Separator used when composing output templates.
    pub path_separator: String,
    /// Cookie containers no longer than this (trimmed) are not attached.
    pub min_cookie_container_len: usize,
    /// How many levels the SoundCloud locator climbs looking for a track container.
    pub max_ancestor_depth: usize,
}

impl Default for TapedeckConfig {
    fn default() -> Self {
        Self {
            scheme: "ytdl".to_string(),
            quiet_window_ms: 100,
            default_path: DEFAULT_PATH.to_string(),
            path_separator: "\\".to_string(),
            min_cookie_container_len: 50,
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
        }
    }
}

impl TapedeckConfig {
    pub fn quiet_window(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.quiet_window_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tapedeck")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TapedeckConfig> {
    load_or_init_at(&config_path()?)
}

pub fn load_or_init_at(path: &std::path::Path) -> Result<TapedeckConfig> {
    if !path.exists() {
        let default_cfg = TapedeckConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml).with_context(|| format!("write config: {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path).with_context(|| format!("read config: {}", path.display()))?;
    let cfg: TapedeckConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}
