//! CLI settings file.
//!
//! A small JSON file holding the backend base URL and the poll interval.
//! Loaded on start with flag overrides applied on top; written back with
//! restrictive permissions on first run so users have a file to edit.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

/// Backend the CLI talks to when nothing else is configured.
const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Default interval between task status queries, in milliseconds.
const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;

// ============================================================================
// Settings
// ============================================================================

/// Persisted CLI preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend base URL.
    pub backend_url: Url,

    /// Interval between task status queries, in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: Url::parse(DEFAULT_BACKEND_URL).expect("default backend URL parses"),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Settings {
    /// Loads settings from the default path, falling back to defaults.
    ///
    /// On first run (no file yet) the defaults are written back so the file
    /// exists for editing. A missing or unreadable file never blocks the CLI.
    pub async fn load_or_init() -> Self {
        let path = default_settings_path();
        match Self::load(&path).await {
            Ok(settings) => settings,
            Err(e) => {
                let settings = Self::default();
                if path.exists() {
                    warn!(path = %path.display(), error = %e, "Failed to load settings, using defaults");
                } else if let Err(e) = settings.save(&path).await {
                    warn!(path = %path.display(), error = %e, "Failed to write default settings");
                }
                settings
            }
        }
    }

    /// Loads settings from a specific path.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let settings = serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;

        debug!(path = %path.display(), "Settings loaded");
        Ok(settings)
    }

    /// Saves settings to a specific path.
    ///
    /// Creates parent directories, writes atomically (temp file + rename),
    /// and restricts permissions on Unix.
    pub async fn save(&self, path: &Path) -> Result<()> {
        create_secure_parent_dirs(path).await?;

        let json = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &json)
            .await
            .with_context(|| format!("writing {}", temp_path.display()))?;
        tokio::fs::rename(&temp_path, path).await?;

        set_restrictive_permissions(path).await?;

        debug!(path = %path.display(), "Settings saved");
        Ok(())
    }
}

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the configuration directory.
///
/// - macOS: `~/Library/Application Support/ParsePilot`
/// - Linux: `~/.config/parsepilot`
/// - Windows: `%APPDATA%\ParsePilot`
pub fn default_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support").join("ParsePilot"))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    #[cfg(not(target_os = "macos"))]
    {
        dirs::config_dir()
            .map(|c| c.join("parsepilot"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Returns the settings file path.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}

// ============================================================================
// File helpers
// ============================================================================

async fn create_secure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            debug!(path = %parent.display(), "Creating config directory");
            tokio::fs::create_dir_all(parent).await?;
            set_restrictive_dir_permissions(parent).await?;
        }
    }
    Ok(())
}

/// Restricts a file to owner read/write (0o600) on Unix.
#[cfg(unix)]
async fn set_restrictive_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o600);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

/// Restricts a directory to owner access (0o700) on Unix.
#[cfg(unix)]
async fn set_restrictive_dir_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = tokio::fs::metadata(path).await?;
    let mut perms = metadata.permissions();
    perms.set_mode(0o700);
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}

#[cfg(not(unix))]
async fn set_restrictive_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(not(unix))]
async fn set_restrictive_dir_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
