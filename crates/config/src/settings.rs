// Application settings
// Loaded from ~/.config/stationsplit/settings.toml

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Registry base URL, normalized to end in `/api`.
    pub url: String,

    /// Registry API token.
    pub token: String,

    /// Optional path to a DXCC reference CSV.
    pub dxcc_path: Option<String>,
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("stationsplit");
        config_dir.join("settings.toml")
    }

    /// Load settings from disk, falling back to defaults. Problems with
    /// an existing file come back as warnings for the caller to report.
    pub fn load() -> (Self, Vec<String>) {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        if !path.exists() {
            return (Self::default(), Vec::new());
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(settings) => (settings, Vec::new()),
                Err(e) => (
                    Self::default(),
                    vec![format!(
                        "cannot parse {}: {e}; using default settings",
                        path.display()
                    )],
                ),
            },
            Err(e) => (
                Self::default(),
                vec![format!(
                    "cannot read {}: {e}; using default settings",
                    path.display()
                )],
            ),
        }
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let text = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, text).map_err(|e| e.to_string())
    }

    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.token.trim().is_empty()
    }

    /// Get the config file path for display/opening
    pub fn config_path_display() -> String {
        Self::config_path().to_string_lossy().to_string()
    }
}

/// Normalize a user-entered registry URL: default to https, strip any
/// trailing slash and make sure the `/api` suffix is present.
pub fn normalize_url(raw: &str) -> String {
    let mut url = raw.trim().to_string();
    if url.is_empty() {
        return url;
    }
    if !url.starts_with("http") {
        url = format!("https://{url}");
    }
    url = url.trim_end_matches('/').to_string();
    if !url.ends_with("/api") {
        url.push_str("/api");
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_bare_host() {
        assert_eq!(normalize_url("log.example.com"), "https://log.example.com/api");
    }

    #[test]
    fn normalizes_trailing_slash() {
        assert_eq!(
            normalize_url("https://log.example.com/"),
            "https://log.example.com/api"
        );
    }

    #[test]
    fn keeps_existing_api_suffix() {
        assert_eq!(
            normalize_url("http://log.example.com/api"),
            "http://log.example.com/api"
        );
    }

    #[test]
    fn empty_url_stays_empty() {
        assert_eq!(normalize_url("   "), "");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let (settings, warnings) = Settings::load_from(Path::new("/nonexistent/settings.toml"));
        assert!(!settings.is_configured());
        assert!(settings.dxcc_path.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn corrupt_file_warns_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "url = [not toml").unwrap();

        let (settings, warnings) = Settings::load_from(&path);
        assert!(!settings.is_configured());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("cannot parse"));
    }

    #[test]
    fn round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("settings.toml");

        let settings = Settings {
            url: "https://log.example.com/api".into(),
            token: "SECRET".into(),
            dxcc_path: Some("/data/dxcc.csv".into()),
        };
        settings.save_to(&path).unwrap();

        let (loaded, warnings) = Settings::load_from(&path);
        assert_eq!(loaded.url, settings.url);
        assert_eq!(loaded.token, settings.token);
        assert_eq!(loaded.dxcc_path.as_deref(), Some("/data/dxcc.csv"));
        assert!(loaded.is_configured());
        assert!(warnings.is_empty());
    }
}
