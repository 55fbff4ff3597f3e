//! Engine tuning knobs: collapse policy, refiner cutoff, autojunk and time budgets.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::DiffError;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Equal runs with more lines than this are candidates for collapsing.
    pub collapse_threshold: usize,
    /// Lines kept visible at each edge of a collapsed run.
    pub context_lines: usize,
    /// Minimum similarity ratio for a non-identical synchronization pair.
    pub sync_cutoff: f64,
    /// Ignore very frequent lines when seeding longest-match searches.
    pub autojunk: bool,
    #[serde(
        deserialize_with = "millis_or_string",
        serialize_with = "as_millis"
    )]
    pub char_diff_timeout: Duration,
    #[serde(
        deserialize_with = "millis_or_string",
        serialize_with = "as_millis"
    )]
    pub debounce_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collapse_threshold: 10,
            context_lines: 3,
            sync_cutoff: 0.75,
            autojunk: false,
            char_diff_timeout: Duration::from_millis(100),
            debounce_delay: Duration::from_millis(250),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, DiffError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DiffError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), DiffError> {
        if !(0.0..=1.0).contains(&self.sync_cutoff) {
            return Err(DiffError::InvalidConfig(format!(
                "sync_cutoff must be within [0, 1], got {}",
                self.sync_cutoff
            )));
        }
        Ok(())
    }
}

fn millis_or_string<'deserialize, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'deserialize>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MillisOrString {
        Millis(u64),
        String(String),
    }

    match MillisOrString::deserialize(deserializer)? {
        MillisOrString::Millis(v) => Ok(Duration::from_millis(v)),
        MillisOrString::String(v) => parse_duration(&v).map_err(serde::de::Error::custom),
    }
}

fn as_millis<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(value.as_millis() as u64)
}

/// Accepts `"150ms"`, `"2s"` or a bare number of milliseconds.
fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    let (digits, unit_ms) = if let Some(v) = s.strip_suffix("ms") {
        (v, 1)
    } else if let Some(v) = s.strip_suffix('s') {
        (v, 1000)
    } else {
        (s, 1)
    };
    let n = digits
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("invalid duration `{s}`"))?;
    n.checked_mul(unit_ms)
        .map(Duration::from_millis)
        .ok_or_else(|| format!("duration `{s}` out of range"))
}
