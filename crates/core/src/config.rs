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

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_f64(profile: &str, key: &str, default: f64) -> f64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key).as_deref() {
        Some("true" | "1" | "yes") => true,
        Some("false" | "0" | "no") => false,
        _ => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageConfig {
    /// Active profile name (empty = default).
    pub profile: String,
    pub render: RenderConfig,
    pub search: SearchConfig,
    /// "char" or "cl100k"
    pub tokenizer: String,
}

impl PassageConfig {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `PASSAGE_PROFILE`. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("PASSAGE_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            render: RenderConfig::from_env_profiled(p),
            search: SearchConfig::from_env_profiled(p),
            tokenizer: profiled_env_or(p, "PASSAGE_TOKENIZER", "char"),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  render:     max_tokens={}, max_sections={}, overlapping_chunks={}",
            self.render.max_tokens,
            self.render.max_sections,
            self.render.overlapping_chunks
        );
        tracing::info!(
            "  search:     top_k={}, min_score={}, content_max_tokens={}",
            self.search.top_k,
            self.search.min_score,
            self.search.content_max_tokens
        );
        tracing::info!("  tokenizer:  {}", self.tokenizer);
    }
}

impl Default for PassageConfig {
    fn default() -> Self {
        Self {
            profile: String::new(),
            render: RenderConfig::default(),
            search: SearchConfig::default(),
            tokenizer: "char".to_string(),
        }
    }
}

// ── Section rendering ─────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Token budget per section.
    pub max_tokens: usize,
    /// Sections kept by ranked rendering.
    pub max_sections: usize,
    /// Widen ranked sections with surrounding document text.
    pub overlapping_chunks: bool,
}

impl RenderConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            max_tokens: profiled_env_usize(p, "PASSAGE_MAX_TOKENS", 800),
            max_sections: profiled_env_usize(p, "PASSAGE_MAX_SECTIONS", 1),
            overlapping_chunks: profiled_env_bool(p, "PASSAGE_OVERLAPPING_CHUNKS", true),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_tokens: 800,
            max_sections: 1,
            overlapping_chunks: true,
        }
    }
}

// ── Document search ───────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub min_score: f64,
    /// Budget per section when rendering a whole document's matched content.
    pub content_max_tokens: usize,
}

impl SearchConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            top_k: profiled_env_usize(p, "PASSAGE_TOP_K", 10),
            min_score: profiled_env_f64(p, "PASSAGE_MIN_SCORE", 0.0),
            content_max_tokens: profiled_env_usize(p, "PASSAGE_CONTENT_MAX_TOKENS", 8000),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            min_score: 0.0,
            content_max_tokens: 8000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own profile so parallel tests never share keys.

    #[test]
    fn defaults_when_unset() {
        let config = PassageConfig::for_profile("UNSET_PROFILE_FOR_TEST");
        assert_eq!(config.profile_label(), "UNSET_PROFILE_FOR_TEST");
        assert_eq!(config.search.content_max_tokens, 8000);
        assert_eq!(PassageConfig::default().profile_label(), "default");
    }

    #[test]
    fn profiled_keys_take_priority() {
        env::set_var("CFGTEST_PASSAGE_MAX_TOKENS", "256");
        env::set_var("CFGTEST_PASSAGE_OVERLAPPING_CHUNKS", "false");
        env::set_var("CFGTEST_PASSAGE_MIN_SCORE", "0.25");
        let config = PassageConfig::for_profile("cfgtest");
        assert_eq!(config.profile, "CFGTEST");
        assert_eq!(config.render.max_tokens, 256);
        assert!(!config.render.overlapping_chunks);
        assert_eq!(config.search.min_score, 0.25);
    }

    #[test]
    fn unparsable_values_fall_back() {
        env::set_var("BADVAL_PASSAGE_MAX_SECTIONS", "many");
        let config = PassageConfig::for_profile("badval");
        assert!(config.render.max_sections >= 1);
    }
}
