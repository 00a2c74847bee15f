use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u16(profile: &str, key: &str, default: u16) -> u16 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub server: ServerConfig,
    pub llm: LlmConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PITCHSENSE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("PITCHSENSE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            server: ServerConfig::from_env_profiled(p),
            llm: LlmConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  server:  {}:{}", self.server.host, self.server.port);
        tracing::info!(
            "  llm:     provider={}, model={}, configured={}",
            self.llm.provider,
            self.llm.model.as_deref().unwrap_or("(none)"),
            self.llm.is_configured()
        );
    }
}

// ── Server ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            host: profiled_env_or(p, "HOST", "0.0.0.0"),
            port: profiled_env_u16(p, "PORT", 3001),
        }
    }
}

// ── LLM backend ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openrouter", "openai", "anthropic", "ollama"
    pub provider: String,
    /// Model identifier passed verbatim to the backend (`AI_MODEL`).
    pub model: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub anthropic_api_key: Option<String>,
    pub ollama_url: String,
}

impl LlmConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            provider: profiled_env_or(p, "LLM_PROVIDER", "openrouter").to_lowercase(),
            model: profiled_env_opt(p, "AI_MODEL"),
            openrouter_api_key: profiled_env_opt(p, "OPENROUTER_API_KEY"),
            openrouter_base_url: profiled_env_or(
                p,
                "OPENROUTER_BASE_URL",
                "https://openrouter.ai/api",
            ),
            openai_api_key: profiled_env_opt(p, "OPENAI_API_KEY"),
            openai_base_url: profiled_env_or(p, "OPENAI_BASE_URL", "https://api.openai.com"),
            anthropic_api_key: profiled_env_opt(p, "ANTHROPIC_API_KEY"),
            ollama_url: profiled_env_or(p, "OLLAMA_URL", "http://localhost:11434"),
        }
    }

    /// The credential for the selected provider, if that provider needs one.
    pub fn api_key(&self) -> Option<&str> {
        match self.provider.as_str() {
            "openrouter" => self.openrouter_api_key.as_deref(),
            "openai" => self.openai_api_key.as_deref(),
            "anthropic" | "claude" => self.anthropic_api_key.as_deref(),
            _ => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "ollama" => self.model.is_some(),
            "openrouter" | "openai" | "anthropic" | "claude" => {
                self.model.is_some() && self.api_key().is_some()
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.to_string(),
            model: Some("openai/gpt-4o-mini".into()),
            openrouter_api_key: None,
            openrouter_base_url: "https://openrouter.ai/api".into(),
            openai_api_key: None,
            openai_base_url: "https://api.openai.com".into(),
            anthropic_api_key: None,
            ollama_url: "http://localhost:11434".into(),
        }
    }

    #[test]
    fn remote_provider_needs_key_and_model() {
        let mut cfg = llm("openrouter");
        assert!(!cfg.is_configured());

        cfg.openrouter_api_key = Some("sk-or-test".into());
        assert!(cfg.is_configured());
        assert_eq!(cfg.api_key(), Some("sk-or-test"));

        cfg.model = None;
        assert!(!cfg.is_configured());
    }

    #[test]
    fn ollama_needs_only_model() {
        let cfg = llm("ollama");
        assert!(cfg.is_configured());
        assert_eq!(cfg.api_key(), None);
    }

    #[test]
    fn unknown_provider_is_not_configured() {
        let mut cfg = llm("mystery");
        cfg.openai_api_key = Some("sk".into());
        assert!(!cfg.is_configured());
    }

    #[test]
    fn profile_label_defaults() {
        let cfg = Config {
            profile: String::new(),
            server: ServerConfig { host: "0.0.0.0".into(), port: 3001 },
            llm: llm("openrouter"),
        };
        assert_eq!(cfg.profile_label(), "default");
    }
}
