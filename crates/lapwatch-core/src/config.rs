//! Registry configuration: output unit, rounding and lap-key layout
//!
//! Configuration is resolved in three layers, the same way the API service
//! resolves its own settings: built-in defaults, an optional TOML file and
//! finally `LAPWATCH_*` environment overrides.

use crate::error::{TimingError, TimingResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_VAR: &str = "LAPWATCH_CONFIG_PATH";
/// Configuration file used when `LAPWATCH_CONFIG_PATH` is unset
pub const DEFAULT_CONFIG_PATH: &str = "lapwatch.toml";
/// Largest rounding precision an `f64` can meaningfully represent
pub const MAX_PRECISION: u32 = 15;

/// Common output units and their multipliers over raw seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Seconds,
    Milliseconds,
    Microseconds,
}

impl TimeUnit {
    /// Multiplier converting seconds into this unit
    pub fn multiplier(self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Milliseconds => 1_000.0,
            TimeUnit::Microseconds => 1_000_000.0,
        }
    }

    /// Short suffix used in log lines and CLI output
    pub fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Microseconds => "us",
        }
    }

    /// Parse a unit name such as `ms`, `micros` or `seconds`
    pub fn parse(name: &str) -> TimingResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "s" | "sec" | "secs" | "seconds" => Ok(TimeUnit::Seconds),
            "ms" | "millis" | "milliseconds" => Ok(TimeUnit::Milliseconds),
            "us" | "µs" | "micros" | "microseconds" => Ok(TimeUnit::Microseconds),
            other => Err(TimingError::config_setting(
                "unit",
                format!("unknown time unit '{other}', expected s, ms or us"),
            )),
        }
    }
}

/// How derived lap keys are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LapKeyStyle {
    /// `<key>:<sequence>:<label>`
    #[default]
    Namespaced,
    /// `<sequence>:<label>`
    Sequence,
}

impl LapKeyStyle {
    /// Build the lap key for one recorded lap
    pub fn lap_key(self, key: &str, sequence: u64, label: Option<&str>) -> String {
        let label = label.unwrap_or("");
        match self {
            LapKeyStyle::Namespaced => format!("{key}:{sequence}:{label}"),
            LapKeyStyle::Sequence => format!("{sequence}:{label}"),
        }
    }

    fn parse(name: &str) -> TimingResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "namespaced" => Ok(LapKeyStyle::Namespaced),
            "sequence" => Ok(LapKeyStyle::Sequence),
            other => Err(TimingError::config_setting(
                "lap_key_style",
                format!("unknown lap key style '{other}', expected namespaced or sequence"),
            )),
        }
    }
}

/// Configuration for a timing registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Scale factor applied to raw seconds (1000 = ms, 1_000_000 = µs)
    pub multiplier: f64,
    /// Round every stored duration to this many decimal places of the unit
    pub precision: Option<u32>,
    /// Layout of derived lap keys
    pub lap_key_style: LapKeyStyle,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self::with_unit(TimeUnit::Milliseconds)
    }
}

impl RegistryConfig {
    /// Configuration reporting in the given unit
    pub fn with_unit(unit: TimeUnit) -> Self {
        Self { multiplier: unit.multiplier(), precision: None, lap_key_style: LapKeyStyle::default() }
    }

    /// Configuration with an arbitrary multiplier
    pub fn with_multiplier(multiplier: f64) -> Self {
        Self { multiplier, ..Self::default() }
    }

    pub fn precision(mut self, digits: u32) -> Self {
        self.precision = Some(digits);
        self
    }

    pub fn lap_key_style(mut self, style: LapKeyStyle) -> Self {
        self.lap_key_style = style;
        self
    }

    /// Load configuration from `LAPWATCH_CONFIG_PATH` (or `lapwatch.toml`),
    /// apply environment overrides and validate the result
    pub fn load() -> TimingResult<Self> {
        let config_path =
            std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let config = Self::load_from_path(&config_path)?.apply_env()?;
        config.validate()?;
        info!(
            multiplier = config.multiplier,
            precision = ?config.precision,
            lap_key_style = ?config.lap_key_style,
            "Loaded timing registry configuration"
        );
        Ok(config)
    }

    /// Read a TOML configuration file, falling back to defaults if it is missing
    pub fn load_from_path(path: impl AsRef<Path>) -> TimingResult<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Configuration file '{}' not found. Using default configuration.",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(err) => Err(TimingError::config(format!(
                "failed to read '{}': {err}",
                path.display()
            ))),
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> TimingResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `LAPWATCH_*` overrides from the process environment
    pub fn apply_env(self) -> TimingResult<Self> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides<F>(mut self, lookup: F) -> TimingResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(unit) = lookup("LAPWATCH_UNIT") {
            self.multiplier = TimeUnit::parse(&unit)?.multiplier();
        }
        if let Some(multiplier) = lookup("LAPWATCH_MULTIPLIER") {
            self.multiplier = multiplier.trim().parse::<f64>().map_err(|_| {
                TimingError::config_setting(
                    "multiplier",
                    format!("LAPWATCH_MULTIPLIER is not a number: '{multiplier}'"),
                )
            })?;
        }
        if let Some(precision) = lookup("LAPWATCH_PRECISION") {
            self.precision = Some(precision.trim().parse::<u32>().map_err(|_| {
                TimingError::config_setting(
                    "precision",
                    format!("LAPWATCH_PRECISION is not a digit count: '{precision}'"),
                )
            })?);
        }
        if let Some(style) = lookup("LAPWATCH_LAP_KEYS") {
            self.lap_key_style = LapKeyStyle::parse(&style)?;
        }
        Ok(self)
    }

    /// Reject multipliers and precisions that would make durations meaningless
    pub fn validate(&self) -> TimingResult<()> {
        if !self.multiplier.is_finite() || self.multiplier <= 0.0 {
            return Err(TimingError::config_setting(
                "multiplier",
                format!("multiplier must be a positive number, got {}", self.multiplier),
            ));
        }
        if let Some(digits) = self.precision.filter(|&digits| digits > MAX_PRECISION) {
            return Err(TimingError::config_setting(
                "precision",
                format!("precision must be at most {MAX_PRECISION} digits, got {digits}"),
            ));
        }
        Ok(())
    }

    /// Convert a raw duration into the configured unit
    pub fn scale(&self, duration: Duration) -> f64 {
        let value = duration.as_secs_f64() * self.multiplier;
        match self.precision {
            Some(digits) => {
                let factor = 10f64.powf(f64::from(digits.min(MAX_PRECISION)));
                (value * factor).round() / factor
            }
            None => value,
        }
    }

    /// The named unit matching this multiplier, if any
    pub fn unit(&self) -> Option<TimeUnit> {
        [TimeUnit::Seconds, TimeUnit::Milliseconds, TimeUnit::Microseconds]
            .into_iter()
            .find(|unit| unit.multiplier() == self.multiplier)
    }

    /// Get a descriptive string for the current configuration
    pub fn description(&self) -> String {
        let unit = self.unit().map(TimeUnit::suffix).unwrap_or("custom");
        format!(
            "unit: {unit} (x{}), precision: {:?}, lap keys: {:?}",
            self.multiplier, self.precision, self.lap_key_style
        )
    }
}
