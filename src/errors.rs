use thiserror::Error;

use crate::limits::LimitType;
use crate::timer::TimerKind;

/// Errors raised while turning a raw configuration into typed settings.
///
/// Every variant is detected at load time so evaluation never sees a
/// half-configured bundle.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A limit bundle does not declare a cap for one of the limit types.
    #[error("limit bundle '{bundle}' has no cap for type {limit_type}")]
    MissingLimitCap {
        bundle: String,
        limit_type: LimitType,
    },

    /// Two bundles in the same section share an identifier.
    #[error("duplicate {section} bundle identifier '{identifier}'")]
    DuplicateBundle {
        section: &'static str,
        identifier: String,
    },

    /// Bundle identifiers become permission node segments and must be usable as such.
    #[error("invalid {section} bundle identifier '{identifier}'")]
    InvalidIdentifier {
        section: &'static str,
        identifier: String,
    },

    /// Fees are amounts to withdraw and cannot be negative.
    #[error("negative fee {amount} for '{fee}' in bundle '{bundle}'")]
    NegativeFee {
        bundle: String,
        fee: String,
        amount: f64,
    },

    /// A fee amount is NaN or infinite.
    #[error("invalid fee {amount} for '{fee}' in bundle '{bundle}'")]
    InvalidFee {
        bundle: String,
        fee: String,
        amount: f64,
    },

    /// A warmup or cooldown is too long to be counted in game ticks.
    #[error("{timer} of {seconds} seconds in timer bundle '{bundle}' is too long")]
    DurationTooLong {
        bundle: String,
        timer: &'static str,
        seconds: u64,
    },

    /// A fee table names a fee type that does not exist.
    #[error("unknown fee type '{fee}' in bundle '{bundle}'")]
    UnknownFee { bundle: String, fee: String },

    /// The allowed warmup movement must be a finite, non-negative distance.
    #[error("invalid allowed distance {0}")]
    InvalidDistance(f64),
}

/// Errors surfaced by the warp core.
///
/// Ordinary denials (limits, funds, running timers, unsafe targets) are not
/// errors; they are reported through result values and player messages.
#[derive(Debug, Error)]
pub enum MyWarpError {
    /// The command sender had to be a player but was not.
    #[error("'{0}' is not a player")]
    NotAPlayer(String),

    /// The exceeded type or maximum was requested from a result that met its limit.
    #[error("limit was not exceeded")]
    LimitNotExceeded,

    /// A timer was started for a subject that already runs one of that kind.
    #[error("a {kind} timer is already running for {subject}")]
    TimerAlreadyRunning { subject: String, kind: TimerKind },

    /// Configuration could not be converted into settings.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Wrapper around IO errors (config file access).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapper around TOML parse errors.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
