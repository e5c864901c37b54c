//! Environment-driven runtime configuration. Read once at startup and treated
//! as read-only afterwards; missing optional keys degrade individual features
//! instead of failing the whole process.

use anyhow::{Result, bail};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3002;

/// DashScope accepts several env names for historical reasons; first match
/// wins in this order.
pub const DASHSCOPE_KEY_CANDIDATES: &[&str] = &["DASHSCOPE_API_KEY", "QWEN_API_KEY"];

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub production: bool,
    pub cors_allowed_origins: Vec<String>,
    pub fish_audio_key: Option<String>,
    pub dashscope_key: Option<String>,
    pub liblib_access_key: Option<String>,
    pub liblib_secret_key: Option<String>,
}

/// Trim whitespace and strip one layer of surrounding quotes; `.env` files
/// copied from shell snippets often carry them.
pub fn normalize_env_value(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| {
            trimmed
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
        })
        .unwrap_or(trimmed)
        .trim()
        .to_string()
}

/// Root data directory. `FUDAI_DATA_DIR` overrides the default `~/.fudai`.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = read_env("FUDAI_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fudai")
}

fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| normalize_env_value(&v))
        .filter(|v| !v.is_empty())
}

fn read_first_env(candidates: &[&str]) -> Option<String> {
    candidates.iter().find_map(|k| read_env(k))
}

#[derive(Debug, Default)]
pub struct ConfigReport {
    pub hard_errors: Vec<String>,
    pub soft_warnings: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let production = read_env("RUN_ENV").as_deref() == Some("production");
        let cors_allowed_origins = read_env("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            host: read_env("FUDAI_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: read_env("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            production,
            cors_allowed_origins,
            fish_audio_key: read_env("FISH_AUDIO_API_KEY"),
            dashscope_key: read_first_env(DASHSCOPE_KEY_CANDIDATES),
            liblib_access_key: read_env("LIBLIB_ACCESS_KEY"),
            liblib_secret_key: read_env("LIBLIB_SECRET_KEY"),
        }
    }

    pub fn voice_enabled(&self) -> bool {
        self.fish_audio_key.is_some()
    }

    pub fn vision_enabled(&self) -> bool {
        self.dashscope_key.is_some()
    }

    pub fn image_enabled(&self) -> bool {
        self.liblib_access_key.is_some() && self.liblib_secret_key.is_some()
    }

    /// Classify missing configuration. Hard errors abort startup in
    /// production; everything degrades gracefully in development.
    pub fn report(&self) -> ConfigReport {
        let mut report = ConfigReport::default();

        if !self.image_enabled() {
            report
                .hard_errors
                .push("missing LiblibAI keys (LIBLIB_ACCESS_KEY / LIBLIB_SECRET_KEY)".to_string());
        }
        if !self.vision_enabled() {
            report.hard_errors.push(format!(
                "missing DashScope key ({})",
                DASHSCOPE_KEY_CANDIDATES.join(" / ")
            ));
        }
        if !self.voice_enabled() {
            report
                .soft_warnings
                .push("missing FISH_AUDIO_API_KEY (voice endpoints disabled)".to_string());
        }
        if self.production && self.cors_allowed_origins.is_empty() {
            report
                .hard_errors
                .push("CORS_ALLOWED_ORIGINS is not set in production".to_string());
        }

        report
    }

    /// Log the validation report; in production, hard errors stop the boot.
    pub fn validate(&self) -> Result<()> {
        let report = self.report();
        for warning in &report.soft_warnings {
            tracing::warn!("config: {}", warning);
        }
        for error in &report.hard_errors {
            tracing::error!("config: {}", error);
        }
        if !report.hard_errors.is_empty() {
            if self.production {
                bail!("incomplete production configuration, refusing to start");
            }
            tracing::warn!("continuing with degraded features (development mode)");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_quotes_and_whitespace() {
        assert_eq!(normalize_env_value("  abc "), "abc");
        assert_eq!(normalize_env_value("\"abc\""), "abc");
        assert_eq!(normalize_env_value("'abc'"), "abc");
        assert_eq!(normalize_env_value(" \"abc\" "), "abc");
        assert_eq!(normalize_env_value(""), "");
        assert_eq!(normalize_env_value("'"), "'");
    }

    #[test]
    fn missing_voice_key_is_a_soft_warning() {
        let config = ServerConfig {
            dashscope_key: Some("k".into()),
            liblib_access_key: Some("ak".into()),
            liblib_secret_key: Some("sk".into()),
            ..Default::default()
        };
        let report = config.report();
        assert!(report.hard_errors.is_empty());
        assert_eq!(report.soft_warnings.len(), 1);
        assert!(report.soft_warnings[0].contains("FISH_AUDIO_API_KEY"));
    }

    #[test]
    fn missing_vendor_keys_are_hard_errors() {
        let config = ServerConfig::default();
        let report = config.report();
        assert_eq!(report.hard_errors.len(), 2);
    }

    #[test]
    fn production_without_cors_allowlist_is_a_hard_error() {
        let config = ServerConfig {
            production: true,
            dashscope_key: Some("k".into()),
            fish_audio_key: Some("k".into()),
            liblib_access_key: Some("ak".into()),
            liblib_secret_key: Some("sk".into()),
            ..Default::default()
        };
        assert_eq!(config.report().hard_errors.len(), 1);

        let config = ServerConfig {
            cors_allowed_origins: vec!["https://www.fudaiai.com".into()],
            ..config
        };
        assert!(config.report().hard_errors.is_empty());
    }

    #[test]
    fn feature_flags_track_key_presence() {
        let mut config = ServerConfig::default();
        assert!(!config.voice_enabled());
        assert!(!config.image_enabled());
        config.fish_audio_key = Some("k".into());
        config.liblib_access_key = Some("ak".into());
        assert!(config.voice_enabled());
        assert!(!config.image_enabled());
        config.liblib_secret_key = Some("sk".into());
        assert!(config.image_enabled());
    }
}
