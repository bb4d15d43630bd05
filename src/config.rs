use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extract: ExtractConfig,
    pub bridge: BridgeConfig,
    pub state: StateConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Origin used to build canonical post URLs.
    pub site_origin: String,
    /// Substring identifying images served from the platform's media path.
    pub media_marker: String,
    /// Hosts whose links and embeds count as video.
    pub video_hosts: Vec<String>,
    /// Section titles that start a "discover more" area.
    pub discover_headings: Vec<String>,
    pub discover_heading_prefixes: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            site_origin: "https://x.com".to_string(),
            media_marker: "pbs.twimg.com/media".to_string(),
            video_hosts: vec!["youtube.com".to_string(), "youtu.be".to_string()],
            discover_headings: vec![
                "Discover more".to_string(),
                "发现更多".to_string(),
                "你可能感兴趣的推文".to_string(),
            ],
            discover_heading_prefixes: vec!["源自于整个".to_string()],
        }
    }
}

impl ExtractConfig {
    pub fn is_discover_heading(&self, text: &str) -> bool {
        let text = text.trim();
        self.discover_headings.iter().any(|h| h == text)
            || self
                .discover_heading_prefixes
                .iter()
                .any(|p| text.starts_with(p.as_str()))
    }

    pub fn is_video_link(&self, url: &str) -> bool {
        self.video_hosts.iter().any(|host| url.contains(host.as_str()))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub timeout_ms: u64,
    pub channel_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            channel_capacity: 32,
        }
    }
}

impl BridgeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StateConfig {
    /// Ancestor hops walked before giving up on a post payload.
    pub max_depth: usize,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self { max_depth: 50 }
    }
}

impl Config {
    /// Default config location: `<config dir>/x2md/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("x2md").join("config.toml"))
    }

    /// Load from `path`, or from the default location. A missing default
    /// file yields the built-in defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bridge.timeout(), Duration::from_secs(5));
        assert_eq!(config.state.max_depth, 50);
        assert_eq!(config.extract.site_origin, "https://x.com");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bridge]\ntimeout_ms = 250\n\n[state]\nmax_depth = 10").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.bridge.timeout_ms, 250);
        assert_eq!(config.bridge.channel_capacity, 32);
        assert_eq!(config.state.max_depth, 10);
        assert_eq!(config.extract.video_hosts.len(), 2);
    }

    #[test]
    fn test_missing_explicit_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_invalid_toml_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bridge\ntimeout_ms = ").unwrap();
        assert!(Config::from_file(file.path()).is_err());
    }

    #[test]
    fn test_discover_heading_match() {
        let extract = ExtractConfig::default();
        assert!(extract.is_discover_heading("  Discover more "));
        assert!(extract.is_discover_heading("源自于整个 X"));
        assert!(!extract.is_discover_heading("Discover"));
    }

    #[test]
    fn test_video_link() {
        let extract = ExtractConfig::default();
        assert!(extract.is_video_link("https://www.youtube.com/watch?v=1"));
        assert!(extract.is_video_link("https://youtu.be/abc"));
        assert!(!extract.is_video_link("https://example.com"));
    }
}
