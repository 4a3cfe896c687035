use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::frames::{DEFAULT_STAGGER_FRAME, FrameGridSpec};

pub const API_URL_ENV: &str = "MONSTER_SPRITES_API_URL";

/// Loaded once at startup and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub viewer_monster_id: u32,
    pub gallery_monster_id: u32,
    pub tick_ms: u64,
    pub stagger_frame: u32,
    pub grid: FrameGridSpec,
    pub sprite_width: u32,
    pub sprite_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            viewer_monster_id: 36,
            gallery_monster_id: 32,
            tick_ms: 16,
            stagger_frame: DEFAULT_STAGGER_FRAME,
            grid: FrameGridSpec::default(),
            sprite_width: 100,
            sprite_height: 100,
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("monster-sprites").join("config.toml"))
    }

    /// Config file if present, then the API URL from the environment.
    pub fn load() -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) => Self::load_or_init(&path)?,
            None => Self::default(),
        };
        Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
    }

    /// Reads `path`, or writes the defaults there on first run. A config
    /// directory that cannot be written to is not fatal.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from_file(path);
        }
        let config = Self::default();
        if let Err(e) = config.save_to_file(path) {
            eprintln!("Could not write default config {}: {:#}", path.display(), e);
        }
        Ok(config)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let config: Self = toml::from_str(s)?;
        Ok(config.normalized())
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)
            .with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.api_url = self.api_url.trim().trim_end_matches('/').to_string();
        self
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    /// URL the sheet behind a descriptor's `image_path` is served from.
    pub fn image_url(&self, image_path: &str) -> String {
        let sep = if image_path.starts_with('/') { "" } else { "/" };
        format!("{}/images{}{}", self.api_url, sep, image_path)
    }
}
