//! TOML configuration for the `brief` binary.
//!
//! Every table is optional. A missing file, table or key falls back to the
//! built-in default, so an empty file is a valid configuration:
//!
//! ```toml
//! [models.hunter]
//! model = "sonar-pro"
//! temperature = 0.2
//!
//! [branding]
//! author = "Northwind Advisory"
//! primary = "#7a1f3d"
//!
//! [output]
//! chart = "image"
//! ```

use anyhow::{Context, Result};
use brief_agent::{Branding, ChartMode, Prompts};
use brief_model::{GeminiConfig, PerplexityConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "brief.toml";

const REDACTED: &str = "***";

/// Configuration validation error with an optional hint.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field: field.into(), message: message.into(), suggestion: None }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Settings for one hosted model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model name; the provider default when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Used only when no key is found in the environment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ModelSettings {
    fn named(model: &str) -> Self {
        Self { model: Some(model.to_string()), ..Default::default() }
    }

    fn validate(&self, table: &str) -> Result<(), ValidationError> {
        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err(ValidationError::new(format!("{table}.model"), "Model name cannot be empty")
                    .with_suggestion("Remove the key to use the provider default"));
            }
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ValidationError::new(
                    format!("{table}.temperature"),
                    format!("Temperature {temperature} is out of range"),
                )
                .with_suggestion("Use a value between 0.0 and 2.0"));
            }
        }
        if self.max_tokens == Some(0) {
            return Err(ValidationError::new(format!("{table}.max_tokens"), "Max tokens must be greater than 0"));
        }
        if self.timeout_secs == Some(0) {
            return Err(ValidationError::new(format!("{table}.timeout_secs"), "Timeout must be greater than 0"));
        }
        if let Some(url) = &self.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ValidationError::new(format!("{table}.base_url"), format!("'{url}' is not an HTTP URL")));
            }
        }
        Ok(())
    }
}

/// The research (hunter) and strategy (architect) models.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub hunter: ModelSettings,
    pub architect: ModelSettings,
    /// Request streamed replies from both models.
    pub stream: bool,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            hunter: ModelSettings::named(&PerplexityConfig::default().model),
            architect: ModelSettings::named(&GeminiConfig::default().model),
            stream: false,
        }
    }
}

/// Backoff for transient model errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub enabled: bool,
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f32,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let defaults = RetryConfig::default();
        Self {
            enabled: defaults.enabled,
            max_retries: defaults.max_retries,
            initial_delay_ms: defaults.initial_delay.as_millis() as u64,
            max_delay_ms: defaults.max_delay.as_millis() as u64,
            backoff_multiplier: defaults.backoff_multiplier,
        }
    }
}

impl RetrySettings {
    pub fn to_retry_config(&self) -> RetryConfig {
        let config = RetryConfig::default()
            .with_max_retries(self.max_retries)
            .with_initial_delay(Duration::from_millis(self.initial_delay_ms))
            .with_max_delay(Duration::from_millis(self.max_delay_ms))
            .with_backoff_multiplier(self.backoff_multiplier);
        RetryConfig { enabled: self.enabled, ..config }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// How the financial chart is embedded in a report.
    pub chart: ChartMode,
    /// Default directory for generated briefs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// Effective configuration of the `brief` binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BriefConfig {
    pub models: ModelsConfig,
    pub branding: Branding,
    pub output: OutputSettings,
    pub retry: RetrySettings,
    pub prompts: Prompts,
}

impl BriefConfig {
    /// Parses a TOML document, filling provider defaults for omitted model names.
    pub fn from_toml(text: &str) -> Result<Self> {
        let mut config: BriefConfig = toml::from_str(text).context("invalid configuration")?;
        let defaults = ModelsConfig::default();
        if config.models.hunter.model.is_none() {
            config.models.hunter.model = defaults.hunter.model;
        }
        if config.models.architect.model.is_none() {
            config.models.architect.model = defaults.architect.model;
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads the first configuration found, or the defaults when none exists.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine the working directory")?;
        let config_dir = dirs::config_dir();
        match resolve_config_path(explicit, &cwd, config_dir.as_deref()) {
            Some(path) => Self::load_file(&path),
            None => {
                brief_telemetry::debug!("no configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration {}", path.display()))?;
        let config = Self::from_toml(&text).with_context(|| format!("in {}", path.display()))?;
        brief_telemetry::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Checks ranges that the TOML types alone do not enforce.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.models.hunter.validate("models.hunter")?;
        self.models.architect.validate("models.architect")?;

        let branding = &self.branding;
        if branding.font.trim().is_empty() {
            return Err(ValidationError::new("branding.font", "Font name cannot be empty"));
        }
        if !(branding.font_size_pt > 0.0 && branding.font_size_pt <= 72.0) {
            return Err(ValidationError::new(
                "branding.font_size_pt",
                format!("Font size {} is out of range", branding.font_size_pt),
            )
            .with_suggestion("Use a size between 1 and 72 points"));
        }
        if !(2000..=2100).contains(&branding.target_year) {
            return Err(ValidationError::new(
                "branding.target_year",
                format!("Year {} is out of range", branding.target_year),
            ));
        }

        if self.retry.backoff_multiplier < 1.0 {
            return Err(ValidationError::new("retry.backoff_multiplier", "Multiplier must be at least 1.0"));
        }
        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(ValidationError::new("retry.initial_delay_ms", "Initial delay exceeds max_delay_ms"));
        }

        for (field, prompt) in [("prompts.research", &self.prompts.research), ("prompts.strategy", &self.prompts.strategy)]
        {
            if prompt.trim().is_empty() {
                return Err(ValidationError::new(field, "Prompt cannot be empty")
                    .with_suggestion("Remove the key to use the built-in prompt"));
            }
        }
        Ok(())
    }

    /// Research client settings with the given key.
    pub fn hunter_config(&self, api_key: &str) -> PerplexityConfig {
        let settings = &self.models.hunter;
        let model = settings.model.clone().unwrap_or_else(|| PerplexityConfig::default().model);
        let mut config = PerplexityConfig::new(api_key, model);
        config.base_url = settings.base_url.clone();
        config.temperature = settings.temperature;
        config.max_tokens = settings.max_tokens;
        if let Some(timeout) = settings.timeout_secs {
            config.timeout_secs = timeout;
        }
        config
    }

    /// Strategy client settings with the given key.
    pub fn architect_config(&self, api_key: &str) -> GeminiConfig {
        let settings = &self.models.architect;
        let model = settings.model.clone().unwrap_or_else(|| GeminiConfig::default().model);
        let mut config = GeminiConfig::new(api_key, model);
        config.base_url = settings.base_url.clone();
        config.temperature = settings.temperature;
        config.max_output_tokens = settings.max_tokens.map(|t| t.min(i32::MAX as u32) as i32);
        if let Some(timeout) = settings.timeout_secs {
            config.timeout_secs = timeout;
        }
        config
    }

    /// This configuration as TOML, with any API key replaced by `***`.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut redacted = self.clone();
        for settings in [&mut redacted.models.hunter, &mut redacted.models.architect] {
            if settings.api_key.is_some() {
                settings.api_key = Some(REDACTED.to_string());
            }
        }
        toml::to_string_pretty(&redacted).context("cannot serialize configuration")
    }
}

/// The configuration file to read: `explicit`, then `./brief.toml`, then
/// `<config_dir>/brief/config.toml`. `None` means built-in defaults.
///
/// An explicit path is returned even when it does not exist, so that reading
/// it reports the error.
pub fn resolve_config_path(explicit: Option<&Path>, cwd: &Path, config_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = cwd.join(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    config_dir.map(|dir| dir.join("brief").join("config.toml")).filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use brief_agent::DEFAULT_RESEARCH_PROMPT;
    use brief_chart::Rgb;

    #[test]
    fn empty_document_is_the_default_configuration() {
        let config = BriefConfig::from_toml("").unwrap();
        assert_eq!(config, BriefConfig::default());
        assert_eq!(config.models.hunter.model.as_deref(), Some("sonar"));
        assert_eq!(config.models.architect.model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(config.output.chart, ChartMode::Native);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = BriefConfig::from_toml(
            r##"
            [models.hunter]
            temperature = 0.2

            [branding]
            author = "Northwind Advisory"
            primary = "#7a1f3d"

            [output]
            chart = "image"

            [prompts]
            strategy = "Plan for {company}: {research}"
            "##,
        )
        .unwrap();

        assert_eq!(config.models.hunter.model.as_deref(), Some("sonar"));
        assert_eq!(config.models.hunter.temperature, Some(0.2));
        assert_eq!(config.branding.author, "Northwind Advisory");
        assert_eq!(config.branding.file_suffix, "Report");
        assert_eq!(config.branding.palette.primary, Rgb::new(0x7a, 0x1f, 0x3d));
        assert_eq!(config.output.chart, ChartMode::Image);
        assert_eq!(config.prompts.research, DEFAULT_RESEARCH_PROMPT);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let err = BriefConfig::from_toml("[models.architect]\ntemperature = 3.5").unwrap_err();
        assert!(format!("{err:#}").contains("models.architect.temperature"));

        let err = BriefConfig::from_toml("[branding]\nprimary = \"teal\"").unwrap_err();
        assert!(format!("{err:#}").contains("invalid color"));

        let err = BriefConfig::from_toml("[retry]\nbackoff_multiplier = 0.5").unwrap_err();
        assert!(format!("{err:#}").contains("retry.backoff_multiplier"));
    }

    #[test]
    fn client_configs_apply_overrides() {
        let config = BriefConfig::from_toml(
            r#"
            [models.hunter]
            model = "sonar-pro"
            base_url = "http://localhost:9000"
            max_tokens = 2048

            [models.architect]
            timeout_secs = 30
            "#,
        )
        .unwrap();

        let hunter = config.hunter_config("pplx");
        assert_eq!(hunter.model, "sonar-pro");
        assert_eq!(hunter.effective_base_url(), "http://localhost:9000");
        assert_eq!(hunter.max_tokens, Some(2048));
        assert_eq!(hunter.timeout_secs, 180);

        let architect = config.architect_config("gem");
        assert_eq!(architect.api_key, "gem");
        assert_eq!(architect.model, "gemini-2.5-pro");
        assert_eq!(architect.timeout_secs, 30);
    }

    #[test]
    fn retry_settings_convert() {
        let retry = RetrySettings { enabled: false, max_retries: 1, initial_delay_ms: 10, ..Default::default() };
        let config = retry.to_retry_config();
        assert!(!config.enabled);
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.initial_delay, Duration::from_millis(10));
        assert_eq!(config.max_delay, Duration::from_secs(5));
    }

    #[test]
    fn redacted_toml_hides_keys_and_parses_back() {
        let mut config = BriefConfig::default();
        config.models.hunter.api_key = Some("pplx-secret".to_string());

        let text = config.to_redacted_toml().unwrap();
        assert!(!text.contains("pplx-secret"));
        assert!(text.contains(r#"api_key = "***""#));

        let back = BriefConfig::from_toml(&text).unwrap();
        assert_eq!(back.branding, config.branding);
        assert_eq!(back.prompts, config.prompts);
    }

    #[test]
    fn lookup_prefers_explicit_then_local_then_user_dir() {
        let cwd = tempfile::tempdir().unwrap();
        let user = tempfile::tempdir().unwrap();
        let explicit = Path::new("/nowhere/custom.toml");

        assert_eq!(resolve_config_path(Some(explicit), cwd.path(), Some(user.path())), Some(explicit.to_path_buf()));
        assert_eq!(resolve_config_path(None, cwd.path(), Some(user.path())), None);

        let user_file = user.path().join("brief").join("config.toml");
        std::fs::create_dir_all(user_file.parent().unwrap()).unwrap();
        std::fs::write(&user_file, "").unwrap();
        assert_eq!(resolve_config_path(None, cwd.path(), Some(user.path())), Some(user_file));

        let local = cwd.path().join(LOCAL_CONFIG_FILE);
        std::fs::write(&local, "").unwrap();
        assert_eq!(resolve_config_path(None, cwd.path(), Some(user.path())), Some(local));
    }
}
