//! # Configuration
//!
//! MyWarp reads a single TOML file. Every section is optional and falls back
//! to defaults, with one exception: a limit bundle must state all three caps.
//!
//! ```toml
//! [logging]
//! level = "info"
//! file = "mywarp.log"
//!
//! [limits]
//! enabled = true
//!
//! [limits.default]
//! total = 10
//! private = 5
//! public = 5
//!
//! [[limits.bundles]]
//! identifier = "builder"
//! total = 25
//! private = 15
//! public = 15
//! worlds = ["creative"]
//!
//! [timers]
//! allowed_distance = 2.0
//!
//! [timers.default]
//! warmup_seconds = 5
//! cooldown_seconds = 30
//!
//! [economy]
//! enabled = true
//!
//! [economy.default]
//! warp = 1.5
//! create = 10.0
//! ```
//!
//! [`Config::load`] only parses. [`Config::validate`] turns the raw sections
//! into the typed settings the services run on and rejects anything that
//! would leave a bundle half-configured.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{anyhow, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::economy::{FeeBundle, FeeSettings, FeeType};
use crate::errors::ConfigError;
use crate::host::WorldId;
use crate::limits::{Limit, LimitCaps, LimitSettings, LimitType};
use crate::timer::{Duration, TimeUnit, TimerBundle, TimerSettings};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub timers: TimersConfig,
    #[serde(default)]
    pub economy: EconomyConfig,
    #[serde(default)]
    pub teleport: TeleportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: Some("mywarp.log".to_string()),
        }
    }
}

/// Caps as written in the file. A missing value is a configuration error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CapsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<u32>,
}

impl CapsConfig {
    pub const fn new(total: u32, private: u32, public: u32) -> Self {
        Self {
            total: Some(total),
            private: Some(private),
            public: Some(public),
        }
    }

    fn resolve(&self, bundle: &str) -> Result<LimitCaps, ConfigError> {
        let cap = |limit_type: LimitType| {
            let value = match limit_type {
                LimitType::Total => self.total,
                LimitType::Private => self.private,
                LimitType::Public => self.public,
            };
            value.ok_or_else(|| ConfigError::MissingLimitCap {
                bundle: bundle.to_string(),
                limit_type,
            })
        };
        Ok(LimitCaps::new(
            cap(LimitType::Total)?,
            cap(LimitType::Private)?,
            cap(LimitType::Public)?,
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitBundleConfig {
    pub identifier: String,
    #[serde(flatten)]
    pub caps: CapsConfig,
    /// Worlds the bundle applies to. Absent or empty means every world.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub worlds: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_caps")]
    pub default: CapsConfig,
    #[serde(default)]
    pub bundles: Vec<LimitBundleConfig>,
}

fn default_caps() -> CapsConfig {
    CapsConfig::new(10, 5, 5)
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default: default_caps(),
            bundles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerLengths {
    #[serde(default = "default_warmup_seconds")]
    pub warmup_seconds: u64,
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,
}

fn default_warmup_seconds() -> u64 {
    5
}

fn default_cooldown_seconds() -> u64 {
    30
}

impl Default for TimerLengths {
    fn default() -> Self {
        Self {
            warmup_seconds: default_warmup_seconds(),
            cooldown_seconds: default_cooldown_seconds(),
        }
    }
}

impl TimerLengths {
    fn bundle(&self, identifier: &str) -> Result<TimerBundle, ConfigError> {
        let length = |timer: &'static str, seconds: u64| {
            Duration::checked_of(seconds, TimeUnit::Seconds).ok_or_else(|| ConfigError::DurationTooLong {
                bundle: identifier.to_string(),
                timer,
                seconds,
            })
        };
        Ok(TimerBundle::new(
            identifier,
            length("warmup", self.warmup_seconds)?,
            length("cooldown", self.cooldown_seconds)?,
        ))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerBundleConfig {
    pub identifier: String,
    #[serde(flatten)]
    pub lengths: TimerLengths,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimersConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub abort_on_move: bool,
    #[serde(default = "default_true")]
    pub abort_on_damage: bool,
    #[serde(default = "default_allowed_distance")]
    pub allowed_distance: f64,
    #[serde(default = "default_true")]
    pub notify_on_warmup_start: bool,
    #[serde(default = "default_true")]
    pub notify_on_cooldown_finish: bool,
    #[serde(default)]
    pub default: TimerLengths,
    #[serde(default)]
    pub bundles: Vec<TimerBundleConfig>,
}

fn default_allowed_distance() -> f64 {
    2.0
}

impl Default for TimersConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            abort_on_move: true,
            abort_on_damage: true,
            allowed_distance: default_allowed_distance(),
            notify_on_warmup_start: true,
            notify_on_cooldown_finish: true,
            default: TimerLengths::default(),
            bundles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeBundleConfig {
    pub identifier: String,
    /// Fee type name to amount, e.g. `warp = 1.5`.
    #[serde(default)]
    pub fees: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub inform_after_transaction: bool,
    #[serde(default)]
    pub default: BTreeMap<String, f64>,
    #[serde(default)]
    pub bundles: Vec<FeeBundleConfig>,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            inform_after_transaction: true,
            default: BTreeMap::new(),
            bundles: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeleportConfig {
    /// Centre positions stored on a block corner.
    #[serde(default = "default_true")]
    pub correct_legacy_positions: bool,
    #[serde(default = "default_true")]
    pub safety_search: bool,
    #[serde(default = "default_safety_search_radius")]
    pub safety_search_radius: u32,
}

fn default_safety_search_radius() -> u32 {
    3
}

impl Default for TeleportConfig {
    fn default() -> Self {
        Self {
            correct_legacy_positions: true,
            safety_search: true,
            safety_search_radius: default_safety_search_radius(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Typed settings produced by [`Config::validate`].
#[derive(Debug, Clone)]
pub struct Settings {
    pub limits: LimitSettings,
    pub timers: TimerSettings,
    pub fees: FeeSettings,
    pub teleport: TeleportConfig,
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    /// Convert the raw sections into settings, failing on the first problem.
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let settings = Settings {
            limits: self.limit_settings()?,
            timers: self.timer_settings()?,
            fees: self.fee_settings()?,
            teleport: self.teleport,
        };
        debug!(
            "Validated {} limit, {} timer and {} fee bundles",
            settings.limits.bundles.len(),
            settings.timers.bundles.len(),
            settings.fees.bundles.len()
        );
        Ok(settings)
    }

    fn limit_settings(&self) -> Result<LimitSettings, ConfigError> {
        let default_caps = self.limits.default.resolve("default")?;
        check_identifiers("limit", self.limits.bundles.iter().map(|b| b.identifier.as_str()))?;

        let mut bundles = Vec::with_capacity(self.limits.bundles.len());
        for bundle in &self.limits.bundles {
            let caps = bundle.caps.resolve(&bundle.identifier)?;
            let worlds: BTreeSet<WorldId> = bundle.worlds.iter().map(|w| WorldId::new(w.as_str())).collect();
            bundles.push(Limit::new(bundle.identifier.clone(), caps, Some(worlds)));
        }
        Ok(LimitSettings::new(self.limits.enabled, default_caps, bundles))
    }

    fn timer_settings(&self) -> Result<TimerSettings, ConfigError> {
        let timers = &self.timers;
        if !timers.allowed_distance.is_finite() || timers.allowed_distance < 0.0 {
            return Err(ConfigError::InvalidDistance(timers.allowed_distance));
        }
        check_identifiers("timer", timers.bundles.iter().map(|b| b.identifier.as_str()))?;

        let mut bundles = timers
            .bundles
            .iter()
            .map(|b| b.lengths.bundle(&b.identifier))
            .collect::<Result<Vec<TimerBundle>, ConfigError>>()?;
        bundles.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        Ok(TimerSettings {
            enabled: timers.enabled,
            default: timers.default.bundle("default")?,
            bundles,
            abort_on_move: timers.abort_on_move,
            abort_on_damage: timers.abort_on_damage,
            allowed_distance: timers.allowed_distance,
            notify_on_warmup_start: timers.notify_on_warmup_start,
            notify_on_cooldown_finish: timers.notify_on_cooldown_finish,
        })
    }

    fn fee_settings(&self) -> Result<FeeSettings, ConfigError> {
        let economy = &self.economy;
        check_identifiers("economy", economy.bundles.iter().map(|b| b.identifier.as_str()))?;

        let mut bundles = Vec::with_capacity(economy.bundles.len());
        for bundle in &economy.bundles {
            bundles.push(FeeBundle::new(bundle.identifier.clone(), parse_fees(&bundle.identifier, &bundle.fees)?));
        }
        bundles.sort_by(|a, b| a.identifier.cmp(&b.identifier));

        Ok(FeeSettings {
            enabled: economy.enabled,
            inform_after_transaction: economy.inform_after_transaction,
            default: FeeBundle::new("default", parse_fees("default", &economy.default)?),
            bundles,
        })
    }
}

fn parse_fees(bundle: &str, raw: &BTreeMap<String, f64>) -> Result<BTreeMap<FeeType, f64>, ConfigError> {
    let mut fees = BTreeMap::new();
    for (name, amount) in raw {
        let fee: FeeType = name.parse().map_err(|fee| ConfigError::UnknownFee {
            bundle: bundle.to_string(),
            fee,
        })?;
        if !amount.is_finite() {
            return Err(ConfigError::InvalidFee {
                bundle: bundle.to_string(),
                fee: name.clone(),
                amount: *amount,
            });
        }
        if *amount < 0.0 {
            return Err(ConfigError::NegativeFee {
                bundle: bundle.to_string(),
                fee: name.clone(),
                amount: *amount,
            });
        }
        fees.insert(fee, *amount);
    }
    Ok(fees)
}

/// Bundle identifiers end up as permission node segments: they must be unique
/// within a section, non-empty, free of dots and whitespace, and must not
/// collide with the reserved `default` and `disobey` names.
fn check_identifiers<'a>(section: &'static str, identifiers: impl Iterator<Item = &'a str>) -> Result<(), ConfigError> {
    let mut seen = BTreeSet::new();
    for identifier in identifiers {
        let reserved = matches!(identifier, "default" | "disobey");
        if identifier.is_empty() || reserved || identifier.chars().any(|c| c == '.' || c.is_whitespace()) {
            return Err(ConfigError::InvalidIdentifier {
                section,
                identifier: identifier.to_string(),
            });
        }
        if !seen.insert(identifier) {
            return Err(ConfigError::DuplicateBundle {
                section,
                identifier: identifier.to_string(),
            });
        }
    }
    Ok(())
}
