//! Engine configuration.

use serde::Deserialize;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set to a value that does not parse or is out of range.
    #[error("invalid value {value:?} for {key}")]
    Invalid {
        /// The variable name.
        key: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Tunables for the story engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate assumed for narration PCM when the service reports none.
    pub sample_rate: u32,
    /// How long answer feedback stays visible before the quiz advances.
    pub quiz_feedback_delay_ms: u64,
    /// Number of questions requested per quiz.
    pub quiz_question_count: usize,
    /// Characters of story tail sent when asking for a sequel.
    pub sequel_excerpt_chars: usize,
    /// Target language for translation.
    pub translation_language: String,
    /// Prebuilt narration voice.
    pub voice_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24_000,
            quiz_feedback_delay_ms: 1_000,
            quiz_question_count: 3,
            sequel_excerpt_chars: 100,
            translation_language: "Hindi".to_owned(),
            voice_name: "Kore".to_owned(),
        }
    }
}

impl EngineConfig {
    /// Reads configuration from the process environment, falling back to
    /// defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a variable is set but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a value is set but unusable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(rate) = parse_positive(&lookup, "APNATOON_SAMPLE_RATE")? {
            config.sample_rate = rate;
        }
        if let Some(delay) = parse(&lookup, "APNATOON_QUIZ_FEEDBACK_MS")? {
            config.quiz_feedback_delay_ms = delay;
        }
        if let Some(count) = parse_positive(&lookup, "APNATOON_QUIZ_QUESTIONS")? {
            config.quiz_question_count = count;
        }
        if let Some(chars) = parse(&lookup, "APNATOON_SEQUEL_EXCERPT_CHARS")? {
            config.sequel_excerpt_chars = chars;
        }
        if let Some(language) = lookup("APNATOON_TRANSLATION_LANGUAGE") {
            config.translation_language = language;
        }
        if let Some(voice) = lookup("APNATOON_VOICE") {
            config.voice_name = voice;
        }

        Ok(config)
    }

    /// The quiz feedback delay as a `Duration`.
    #[must_use]
    pub fn quiz_feedback_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.quiz_feedback_delay_ms)
    }
}

fn parse<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value })
        })
        .transpose()
}

fn parse_positive<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Default + PartialEq + ToString,
{
    match parse::<F, T>(lookup, key)? {
        Some(value) if value == T::default() => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
        other => Ok(other),
    }
}
