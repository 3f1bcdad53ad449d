// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const ENV_AI_CONFIG_PATH: &str = "AI_CONFIG_PATH";

fn default_provider() -> String {
    "deepseek".to_string()
}
fn default_timeout_secs() -> u64 {
    80
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    pub enabled: bool,
    /// "deepseek" | "openai" (case-insensitive). Both speak chat-completions.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Empty means the provider default.
    #[serde(default)]
    pub model: String,
    /// Empty means the provider default.
    #[serde(default)]
    pub base_url: String,
    /// "ENV" means: read from DEEPSEEK_API_KEY / OPENAI_API_KEY (by provider)
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: String::new(),
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AiConfig {
    /// Load from JSON or TOML (picked by extension, JSON otherwise).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        let cfg: AiConfig = if is_toml {
            toml::from_str(&data)?
        } else {
            serde_json::from_str(&data)?
        };
        cfg.normalized()
    }

    /// Env-only config: enabled iff an API key is present and AI_ENABLED is not "0".
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = env::var("DEEPSEEK_API_KEY").unwrap_or_default();
        let switched_off = env::var("AI_ENABLED").is_ok_and(|v| v == "0" || v.eq_ignore_ascii_case("false"));
        let cfg = AiConfig {
            enabled: !api_key.trim().is_empty() && !switched_off,
            model: env::var("AI_MODEL").unwrap_or_default(),
            base_url: env::var("AI_BASE_URL").unwrap_or_default(),
            api_key,
            timeout_secs: env::var("AI_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_else(default_timeout_secs),
            ..AiConfig::default()
        };
        cfg.normalized()
    }

    /// `$AI_CONFIG_PATH` if set, otherwise env.
    pub fn load_default() -> anyhow::Result<Self> {
        match env::var(ENV_AI_CONFIG_PATH) {
            Ok(p) if !p.trim().is_empty() => Self::load_from_file(p),
            _ => Self::from_env(),
        }
    }

    fn normalized(mut self) -> anyhow::Result<Self> {
        self.provider = self.provider.trim().to_lowercase();

        let (base, model) = match self.provider.as_str() {
            "deepseek" => ("https://api.deepseek.com", "deepseek-chat"),
            "openai" => ("https://api.openai.com/v1", "gpt-4o-mini"),
            other => anyhow::bail!("Unsupported provider in config: {other}"),
        };
        if self.base_url.trim().is_empty() {
            self.base_url = base.to_string();
        }
        if self.model.trim().is_empty() {
            self.model = model.to_string();
        }

        if self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = match self.provider.as_str() {
                "deepseek" => env::var("DEEPSEEK_API_KEY")
                    .map_err(|_| anyhow::anyhow!("Missing DEEPSEEK_API_KEY env var"))?,
                _ => env::var("OPENAI_API_KEY")
                    .map_err(|_| anyhow::anyhow!("Missing OPENAI_API_KEY env var"))?,
            };
        }

        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        Ok(self)
    }

    /// Enabled and holding a key.
    pub fn is_usable(&self) -> bool {
        self.enabled && !self.api_key.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_file_fills_provider_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("ai.json");
        fs::write(&p, r#"{"enabled":true,"provider":"DeepSeek","api_key":"sk-test"}"#).unwrap();
        let cfg = AiConfig::load_from_file(&p).unwrap();
        assert_eq!(cfg.provider, "deepseek");
        assert_eq!(cfg.model, "deepseek-chat");
        assert_eq!(cfg.base_url, "https://api.deepseek.com");
        assert_eq!(cfg.timeout_secs, 80);
        assert!(cfg.is_usable());
    }

    #[test]
    fn toml_file_is_supported() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("ai.toml");
        fs::write(
            &p,
            "enabled = true\nprovider = \"openai\"\napi_key = \"k\"\nmodel = \"gpt-4o\"\n",
        )
        .unwrap();
        let cfg = AiConfig::load_from_file(&p).unwrap();
        assert_eq!(cfg.model, "gpt-4o");
        assert_eq!(cfg.base_url, "https://api.openai.com/v1");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("ai.json");
        fs::write(&p, r#"{"enabled":true,"provider":"mystery"}"#).unwrap();
        assert!(AiConfig::load_from_file(&p).is_err());
    }

    #[test]
    fn disabled_is_not_usable() {
        let cfg = AiConfig {
            api_key: "k".into(),
            ..AiConfig::default()
        };
        assert!(!cfg.is_usable());
    }
}
