use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_PAGE_SIZE: u32 = 512;
pub const DEFAULT_MAX_PAGES: u32 = 64;
pub const DEFAULT_PADDING: u32 = 1;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub atlas: AtlasConfig,
}

/// Page geometry and capacity, fixed for the lifetime of a manager.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct AtlasConfig {
    /// Pixel dimension of every page, both axes.
    pub page_size: u32,
    /// Upper bound on simultaneously resident pages.
    pub max_pages: u32,
    /// Gap left to the right of and below each glyph.
    pub padding: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            padding: DEFAULT_PADDING,
        }
    }
}

impl AtlasConfig {
    pub fn new(page_size: u32, max_pages: u32) -> Self {
        Self {
            page_size,
            max_pages,
            ..Default::default()
        }
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.max_pages == 0 {
            return Err(ConfigError::ZeroMaxPages);
        }
        if self.padding >= self.page_size {
            return Err(ConfigError::PaddingTooLarge {
                padding: self.padding,
                page_size: self.page_size,
            });
        }
        Ok(())
    }
}

impl Config {
    /// Loads the user config file, falling back to defaults on any problem.
    pub fn load() -> Self {
        match config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Config::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Failed to read config file: {}", e);
                return Config::default();
            }
        };

        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to parse config file: {}", e);
                Config::default()
            }
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    let base = match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::config_dir()?,
    };
    Some(base.join("fontman").join("config.toml"))
}
