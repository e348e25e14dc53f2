use std::collections::HashSet;

use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Address of the cloud-drive API, host:port.
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub password: String,
    /// Root paths to scan, as the user sees them (may include the local
    /// mount-point prefix; the path mapper strips it).
    pub scan_paths: Vec<String>,
    /// Local name under which the remote drive is mounted.
    pub mount_point: String,
    /// File extensions treated as video files, with or without a leading dot.
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,
}

fn default_address() -> String {
    "127.0.0.1:19798".to_string()
}

fn default_video_extensions() -> Vec<String> {
    [
        ".mkv", ".iso", ".ts", ".mp4", ".avi", ".rmvb", ".wmv", ".m2ts", ".mpg", ".flv", ".rm",
        ".mov",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl AppConfig {
    /// Lower-cased, dot-prefixed extension set used by the scanner filter.
    pub fn extension_filter(&self) -> HashSet<String> {
        self.video_extensions
            .iter()
            .map(|ext| {
                let ext = ext.trim().to_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .filter(|ext| ext.len() > 1)
            .collect()
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_extensions(exts: &[&str]) -> AppConfig {
        AppConfig {
            address: default_address(),
            account: String::new(),
            password: String::new(),
            scan_paths: vec!["/Movies".to_string()],
            mount_point: "/".to_string(),
            video_extensions: exts.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_extension_filter_normalizes_case_and_dots() {
        let config = config_with_extensions(&["MP4", ".Mkv", " .avi "]);
        let filter = config.extension_filter();
        assert!(filter.contains(".mp4"));
        assert!(filter.contains(".mkv"));
        assert!(filter.contains(".avi"));
        assert_eq!(filter.len(), 3);
    }

    #[test]
    fn test_extension_filter_drops_empty_entries() {
        let config = config_with_extensions(&["", ".", "mp4"]);
        let filter = config.extension_filter();
        assert_eq!(filter.len(), 1);
        assert!(filter.contains(".mp4"));
    }

    #[test]
    fn test_default_extensions_cover_common_video_types() {
        let defaults = default_video_extensions();
        assert!(defaults.contains(&".mp4".to_string()));
        assert!(defaults.contains(&".mkv".to_string()));
        assert_eq!(defaults.len(), 12);
    }
}
