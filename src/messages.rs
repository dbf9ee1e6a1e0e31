//! User-facing messages as catalog keys with positional arguments.
//!
//! The core never renders text itself. The host looks the key up in its
//! localized catalog and substitutes the arguments in order.

use std::fmt;

/// Severity a host uses to style the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

/// A catalog key plus the arguments to substitute into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub key: &'static str,
    pub args: Vec<String>,
}

impl Message {
    pub fn info(key: &'static str) -> Self {
        Self {
            kind: MessageKind::Info,
            key,
            args: Vec::new(),
        }
    }

    pub fn success(key: &'static str) -> Self {
        Self {
            kind: MessageKind::Success,
            key,
            args: Vec::new(),
        }
    }

    pub fn error(key: &'static str) -> Self {
        Self {
            kind: MessageKind::Error,
            key,
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, value: impl ToString) -> Self {
        self.args.push(value.to_string());
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key)?;
        if !self.args.is_empty() {
            write!(f, " [{}]", self.args.join(", "))?;
        }
        Ok(())
    }
}

// Timers
pub const WARMUP_STARTED: &str = "timer.warmup.started";
pub const WARMUP_RUNNING: &str = "timer.warmup.running";
pub const WARMUP_ABORT_MOVE: &str = "timer.warmup.aborted.move";
pub const WARMUP_ABORT_DAMAGE: &str = "timer.warmup.aborted.damage";
pub const COOLDOWN_RUNNING: &str = "timer.cooldown.running";
pub const COOLDOWN_FINISHED: &str = "timer.cooldown.finished";

// Economy
pub const INSUFFICIENT_FUNDS: &str = "economy.insufficient-funds";
pub const TRANSACTION_COMPLETE: &str = "economy.transaction-complete";

// Teleport
pub const TELEPORT_SUCCESS: &str = "teleport.success";
pub const TELEPORT_MODIFIED: &str = "teleport.success.modified";
pub const TELEPORT_NO_SAFE_POSITION: &str = "teleport.no-safe-position";
pub const WARP_WELCOME: &str = "warp.welcome";
pub const WARP_NOT_FOUND: &str = "warp.not-found";
pub const WARP_NOT_USABLE: &str = "warp.not-usable";

// Limits
pub const LIMIT_EXCEEDED: &str = "limit.exceeded";
