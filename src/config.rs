use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_FLAG_KEY: &str = "bannerpop.shown";
pub const PROGRESS_TICK_MS: u64 = 100;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite number greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f64 },

    #[error("flag key must not be empty")]
    EmptyFlagKey,
}

/// How long each part of the overlay lasts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct TimingConfig {
    pub per_slide_secs: f64,
    pub total_secs: f64,
    pub initial_delay_ms: u64,
    /// Period of the progress process. Not exposed in deck files.
    #[serde(skip)]
    pub progress_tick: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            per_slide_secs: 3.0,
            total_secs: 10.0,
            initial_delay_ms: 1000,
            progress_tick: Duration::from_millis(PROGRESS_TICK_MS),
        }
    }
}

impl TimingConfig {
    pub fn new(
        per_slide_secs: f64,
        total_secs: f64,
        initial_delay_ms: u64,
    ) -> Result<Self, ConfigError> {
        let cfg = Self {
            per_slide_secs,
            total_secs,
            initial_delay_ms,
            ..Self::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive_secs("perSlideSecs", self.per_slide_secs)?;
        positive_secs("totalSecs", self.total_secs)?;
        Ok(())
    }

    pub fn per_slide(&self) -> Duration {
        secs_to_millis(self.per_slide_secs)
    }

    pub fn total(&self) -> Duration {
        secs_to_millis(self.total_secs)
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }
}

/// Timers run at millisecond resolution.
fn secs_to_millis(secs: f64) -> Duration {
    Duration::from_millis((secs * 1000.0).round() as u64)
}

fn positive_secs(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct OverlayConfig {
    pub timing: TimingConfig,
    pub show_once: bool,
    pub flag_key: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            show_once: true,
            flag_key: DEFAULT_FLAG_KEY.to_string(),
        }
    }
}

impl OverlayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;
        if self.flag_key.trim().is_empty() {
            return Err(ConfigError::EmptyFlagKey);
        }
        Ok(())
    }

    pub fn with_overrides(mut self, o: &Overrides) -> Result<Self, ConfigError> {
        if let Some(v) = o.per_slide_secs {
            self.timing.per_slide_secs = v;
        }
        if let Some(v) = o.total_secs {
            self.timing.total_secs = v;
        }
        if let Some(v) = o.initial_delay_ms {
            self.timing.initial_delay_ms = v;
        }
        if let Some(k) = &o.flag_key {
            self.flag_key = k.clone();
        }
        if o.always_show {
            self.show_once = false;
        }
        self.validate()?;
        Ok(self)
    }
}

/// Command line overrides applied on top of whatever the deck carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub per_slide_secs: Option<f64>,
    pub total_secs: Option<f64>,
    pub initial_delay_ms: Option<u64>,
    pub flag_key: Option<String>,
    pub always_show: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn defaults_are_valid() {
        let cfg = OverlayConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.timing.total(), Duration::from_secs(10));
        assert_eq!(cfg.timing.per_slide(), Duration::from_secs(3));
        assert_eq!(cfg.timing.initial_delay(), Duration::from_millis(1000));
        assert_eq!(cfg.timing.progress_tick, Duration::from_millis(100));
    }

    #[test]
    fn rejects_non_positive_durations() {
        assert_matches!(
            TimingConfig::new(0.0, 10.0, 0),
            Err(ConfigError::NotPositive { field: "perSlideSecs", .. })
        );
        assert_matches!(
            TimingConfig::new(2.0, -1.0, 0),
            Err(ConfigError::NotPositive { field: "totalSecs", .. })
        );
        assert_matches!(
            TimingConfig::new(f64::NAN, 1.0, 0),
            Err(ConfigError::NotPositive { .. })
        );
        assert_matches!(
            TimingConfig::new(1.0, f64::INFINITY, 0),
            Err(ConfigError::NotPositive { .. })
        );
    }

    #[test]
    fn zero_delay_is_allowed() {
        let t = TimingConfig::new(2.5, 7.0, 0).unwrap();
        assert_eq!(t.initial_delay(), Duration::ZERO);
        assert_eq!(t.per_slide(), Duration::from_millis(2500));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: OverlayConfig =
            serde_json::from_str(r#"{ "timing": { "totalSecs": 20 }, "showOnce": false }"#)
                .unwrap();
        assert_eq!(cfg.timing.total_secs, 20.0);
        assert_eq!(cfg.timing.per_slide_secs, 3.0);
        assert_eq!(cfg.timing.progress_tick, Duration::from_millis(100));
        assert!(!cfg.show_once);
        assert_eq!(cfg.flag_key, DEFAULT_FLAG_KEY);
    }

    #[test]
    fn overrides_apply_and_validate() {
        let o = Overrides {
            per_slide_secs: Some(1.0),
            total_secs: Some(4.0),
            initial_delay_ms: Some(0),
            flag_key: Some("promo.spring".into()),
            always_show: true,
        };
        let cfg = OverlayConfig::default().with_overrides(&o).unwrap();
        assert_eq!(cfg.timing.per_slide_secs, 1.0);
        assert_eq!(cfg.timing.total_secs, 4.0);
        assert_eq!(cfg.timing.initial_delay_ms, 0);
        assert_eq!(cfg.flag_key, "promo.spring");
        assert!(!cfg.show_once);

        let bad = Overrides {
            flag_key: Some("  ".into()),
            ..Overrides::default()
        };
        assert_eq!(
            OverlayConfig::default().with_overrides(&bad),
            Err(ConfigError::EmptyFlagKey)
        );
    }
}
