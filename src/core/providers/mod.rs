//! Static vendor registry: name, base URL, and how requests are authorized.
//! Loaded once from an embedded JSON document; immutable at runtime.

use serde::{Deserialize, Serialize};

const PROVIDERS_JSON: &str = include_str!("providers.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRegistry {
    pub providers: Vec<ProviderDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDef {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub auth: AuthConfig,
    /// Seconds before an upstream call is abandoned.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(rename = "type")]
    pub auth_type: AuthType,
    /// Env var holding the bearer key or access key.
    pub key_env: String,
    /// Env var holding the secret key for signature auth.
    #[serde(default)]
    pub secret_env: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// LiblibAI x-access-key / x-timestamp / x-nonce / x-sign header set.
    Signature,
}

impl ProviderRegistry {
    pub fn load() -> Self {
        serde_json::from_str(PROVIDERS_JSON).expect("providers.json is invalid")
    }

    pub fn get_provider(&self, id: &str) -> Option<&ProviderDef> {
        let normalized = id.to_lowercase();
        self.providers
            .iter()
            .find(|p| p.id == normalized || p.name.to_lowercase() == normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_loads_embedded_providers() {
        let registry = ProviderRegistry::load();
        assert!(registry.providers.len() >= 3);
        for p in &registry.providers {
            assert!(p.base_url.starts_with("https://"), "{}", p.id);
            assert!(p.timeout_secs > 0);
        }
    }

    #[test]
    fn lookup_by_id_or_display_name() {
        let registry = ProviderRegistry::load();
        let fish = registry.get_provider("fish_audio").unwrap();
        assert_eq!(fish.auth.auth_type, AuthType::Bearer);
        assert!(registry.get_provider("Fish Audio").is_some());
        assert!(registry.get_provider("no-such-vendor").is_none());
    }

    #[test]
    fn liblib_is_signature_authed_with_secret() {
        let registry = ProviderRegistry::load();
        let liblib = registry.get_provider("liblib").unwrap();
        assert_eq!(liblib.auth.auth_type, AuthType::Signature);
        assert!(liblib.auth.secret_env.is_some());
    }
}
