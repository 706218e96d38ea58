use crate::config::BriefConfig;
use anyhow::{Result, bail};
use std::fmt;

/// Environment variables holding the Perplexity key, in lookup order.
pub const PERPLEXITY_KEY_VARS: [&str; 2] = ["PPLX_KEY", "PERPLEXITY_API_KEY"];

/// Environment variables holding the Gemini key, in lookup order.
pub const GEMINI_KEY_VARS: [&str; 3] = ["GEMINI_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Keys for both hosted models.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeys {
    pub perplexity: String,
    pub gemini: String,
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeys").field("perplexity", &"***").field("gemini", &"***").finish()
    }
}

impl ApiKeys {
    /// Reads keys from the process environment.
    pub fn from_env(config: &BriefConfig) -> Result<Self> {
        Self::resolve(config, |name| std::env::var(name).ok())
    }

    /// Environment variables win over `api_key` in the configuration. Blank
    /// values count as missing.
    pub fn resolve(config: &BriefConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let find = |vars: &[&str], fallback: Option<&String>| {
            vars.iter()
                .filter_map(|&name| lookup(name))
                .chain(fallback.cloned())
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        let perplexity = find(&PERPLEXITY_KEY_VARS[..], config.models.hunter.api_key.as_ref());
        let gemini = find(&GEMINI_KEY_VARS[..], config.models.architect.api_key.as_ref());

        match (perplexity, gemini) {
            (Some(perplexity), Some(gemini)) => Ok(Self { perplexity, gemini }),
            (perplexity, gemini) => {
                let mut missing = Vec::new();
                if perplexity.is_none() {
                    missing.push(format!("set {}", alternatives(&PERPLEXITY_KEY_VARS)));
                }
                if gemini.is_none() {
                    missing.push(format!("set {}", alternatives(&GEMINI_KEY_VARS)));
                }
                bail!("API keys missing: {}", missing.join("; "))
            }
        }
    }
}

fn alternatives(vars: &[&str]) -> String {
    match vars {
        [] => String::new(),
        [only] => (*only).to_string(),
        [rest @ .., last] => format!("{} or {last}", rest.join(", ")),
    }
}
