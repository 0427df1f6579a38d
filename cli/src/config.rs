use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use badge_core::{DEFAULT_TIMEOUT, HttpStoreConfig};
use badge_media::NormalizeOptions;
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "touchbadge.toml";
pub const DEFAULT_TOKEN_ENV: &str = "TOUCHBADGE_STORAGE_TOKEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlayConfig {
    pub normalize: Option<NormalizeOverlay>,
    pub storage: Option<StorageOverlay>,
}

/// `[normalize]` table. A limit of 0 disables that limit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizeOverlay {
    pub jpeg_quality: Option<u8>,
    pub apply_exif_orientation: Option<bool>,
    pub max_file_size: Option<usize>,
    pub max_dimension: Option<u32>,
    pub max_pixels: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageOverlay {
    pub endpoint: Option<String>,
    pub token_env: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Flags that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub jpeg_quality: Option<u8>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub endpoint: Option<String>,
    pub token_env: String,
    pub timeout: Duration,
}

impl StorageSettings {
    /// Build HTTP store settings, reading the token through `lookup_env`
    pub fn http_store_config(
        &self,
        lookup_env: impl Fn(&str) -> Option<String>,
    ) -> Result<HttpStoreConfig> {
        let Some(endpoint) = self.endpoint.clone() else {
            bail!(
                "no storage endpoint configured (set [storage].endpoint, pass --endpoint, or use --dry-run)"
            );
        };
        let token = lookup_env(&self.token_env).filter(|t| !t.trim().is_empty());
        if token.is_none() {
            tracing::debug!(token_env = %self.token_env, "no storage token set; uploading anonymously");
        }
        Ok(HttpStoreConfig {
            endpoint,
            token,
            timeout: self.timeout,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub normalize: NormalizeOptions,
    pub storage: StorageSettings,
}

impl ResolvedConfig {
    pub fn new(overlay: Option<OverlayConfig>, cli: CliOverrides) -> Result<Self> {
        let overlay = overlay.unwrap_or_default();
        let normalize_overlay = overlay.normalize.unwrap_or_default();
        let storage_overlay = overlay.storage.unwrap_or_default();

        let defaults = NormalizeOptions::default();
        let jpeg_quality = cli
            .jpeg_quality
            .or(normalize_overlay.jpeg_quality)
            .unwrap_or(defaults.jpeg_quality);
        if !(1..=100).contains(&jpeg_quality) {
            bail!("jpeg quality must be between 1 and 100, got {jpeg_quality}");
        }

        let normalize = NormalizeOptions {
            apply_exif_orientation: normalize_overlay
                .apply_exif_orientation
                .unwrap_or(defaults.apply_exif_orientation),
            jpeg_quality,
            max_dimension: limit(normalize_overlay.max_dimension, defaults.max_dimension),
            max_file_size: limit(normalize_overlay.max_file_size, defaults.max_file_size),
            max_pixels: limit(normalize_overlay.max_pixels, defaults.max_pixels),
        };

        let timeout = storage_overlay
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            bail!("storage timeout_secs must be greater than 0");
        }

        let storage = StorageSettings {
            endpoint: cli
                .endpoint
                .or(storage_overlay.endpoint)
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            token_env: storage_overlay
                .token_env
                .unwrap_or_else(|| DEFAULT_TOKEN_ENV.to_string()),
            timeout,
        };

        Ok(Self { normalize, storage })
    }
}

fn limit<T: Default + PartialEq>(configured: Option<T>, default: Option<T>) -> Option<T> {
    match configured {
        Some(value) if value == T::default() => None,
        Some(value) => Some(value),
        None => default,
    }
}

/// Read the overlay at `path`, or `./touchbadge.toml` when no path is given.
///
/// An explicit path must exist; the implicit default may be missing.
pub fn load_overlay(path: Option<&Path>) -> Result<Option<OverlayConfig>> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    if !explicit && !path.is_file() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let overlay = toml::from_str(&raw).with_context(|| format!("parse config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(Some(overlay))
}

#[cfg(test)]
mod tests {
    use badge_media::{MAX_FILE_SIZE, MAX_IMAGE_PIXELS};

    use super::*;

    fn parse(raw: &str) -> OverlayConfig {
        toml::from_str(raw).unwrap()
    }

    #[test]
    fn defaults_without_overlay() {
        let config = ResolvedConfig::new(None, CliOverrides::default()).unwrap();
        assert_eq!(config.normalize, NormalizeOptions::default());
        assert_eq!(config.storage.endpoint, None);
        assert_eq!(config.storage.token_env, DEFAULT_TOKEN_ENV);
        assert_eq!(config.storage.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn overlay_values_apply() {
        let overlay = parse(
            r#"
            [normalize]
            jpeg_quality = 80
            apply_exif_orientation = false
            max_dimension = 4096

            [storage]
            endpoint = "https://blossom.example.com"
            token_env = "MY_TOKEN"
            timeout_secs = 5
            "#,
        );
        let config = ResolvedConfig::new(Some(overlay), CliOverrides::default()).unwrap();
        assert_eq!(config.normalize.jpeg_quality, 80);
        assert!(!config.normalize.apply_exif_orientation);
        assert_eq!(config.normalize.max_dimension, Some(4096));
        assert_eq!(config.normalize.max_file_size, Some(MAX_FILE_SIZE));
        assert_eq!(config.normalize.max_pixels, Some(MAX_IMAGE_PIXELS));
        assert_eq!(
            config.storage.endpoint.as_deref(),
            Some("https://blossom.example.com")
        );
        assert_eq!(config.storage.token_env, "MY_TOKEN");
        assert_eq!(config.storage.timeout, Duration::from_secs(5));
    }

    #[test]
    fn cli_flags_win() {
        let overlay = parse(
            r#"
            [normalize]
            jpeg_quality = 80
            [storage]
            endpoint = "https://from-file.example.com"
            "#,
        );
        let config = ResolvedConfig::new(
            Some(overlay),
            CliOverrides {
                jpeg_quality: Some(60),
                endpoint: Some("https://from-flag.example.com".to_string()),
            },
        )
        .unwrap();
        assert_eq!(config.normalize.jpeg_quality, 60);
        assert_eq!(
            config.storage.endpoint.as_deref(),
            Some("https://from-flag.example.com")
        );
    }

    #[test]
    fn zero_disables_limit() {
        let overlay = parse("[normalize]\nmax_dimension = 0\nmax_pixels = 0\n");
        let config = ResolvedConfig::new(Some(overlay), CliOverrides::default()).unwrap();
        assert_eq!(config.normalize.max_dimension, None);
        assert_eq!(config.normalize.max_pixels, None);
        assert_eq!(config.normalize.max_file_size, Some(MAX_FILE_SIZE));
    }

    #[test]
    fn rejects_bad_values() {
        let bad_quality = CliOverrides {
            jpeg_quality: Some(0),
            ..Default::default()
        };
        assert!(ResolvedConfig::new(None, bad_quality).is_err());

        let zero_timeout = parse("[storage]\ntimeout_secs = 0\n");
        assert!(ResolvedConfig::new(Some(zero_timeout), CliOverrides::default()).is_err());

        assert!(toml::from_str::<OverlayConfig>("[normalize]\nquality = 3\n").is_err());
    }

    #[test]
    fn http_store_config_reads_token_from_env() {
        let overlay = parse("[storage]\nendpoint = \"https://b.example.com\"\ntoken_env = \"TB\"\n");
        let config = ResolvedConfig::new(Some(overlay), CliOverrides::default()).unwrap();

        let http = config
            .storage
            .http_store_config(|name| (name == "TB").then(|| "secret".to_string()))
            .unwrap();
        assert_eq!(http.endpoint, "https://b.example.com");
        assert_eq!(http.token.as_deref(), Some("secret"));

        let anonymous = config
            .storage
            .http_store_config(|_| Some("  ".to_string()))
            .unwrap();
        assert_eq!(anonymous.token, None);
    }

    #[test]
    fn http_store_config_requires_endpoint() {
        let config = ResolvedConfig::new(None, CliOverrides::default()).unwrap();
        assert!(config.storage.http_store_config(|_| None).is_err());
    }

    #[test]
    fn load_overlay_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("badge.toml");
        std::fs::write(&path, "[normalize]\njpeg_quality = 70\n").unwrap();

        let overlay = load_overlay(Some(&path)).unwrap().unwrap();
        assert_eq!(overlay.normalize.unwrap().jpeg_quality, Some(70));

        let missing = dir.path().join("missing.toml");
        assert!(load_overlay(Some(&missing)).is_err());

        std::fs::write(&path, "not = [valid").unwrap();
        assert!(load_overlay(Some(&path)).is_err());
    }
}
