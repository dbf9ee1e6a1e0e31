//! Fees charged for warp actions.
//!
//! Fee amounts come from permission-scoped bundles; the balance itself lives
//! in an external [`Ledger`] (the server's economy plugin).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::host::LocalPlayer;
use crate::permissions::{
    bundle_permission, first_permitted, PermissionDefault, PermissionNode, PermissionRegistry,
    ECONOMY_BUNDLE_PREFIX, ECONOMY_DISOBEY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeType {
    Create,
    CreatePrivate,
    Delete,
    Give,
    Invite,
    Uninvite,
    Private,
    Public,
    Update,
    Warp,
}

impl FeeType {
    pub const ALL: [FeeType; 10] = [
        FeeType::Create,
        FeeType::CreatePrivate,
        FeeType::Delete,
        FeeType::Give,
        FeeType::Invite,
        FeeType::Uninvite,
        FeeType::Private,
        FeeType::Public,
        FeeType::Update,
        FeeType::Warp,
    ];
}

impl fmt::Display for FeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeeType::Create => "create",
            FeeType::CreatePrivate => "create_private",
            FeeType::Delete => "delete",
            FeeType::Give => "give",
            FeeType::Invite => "invite",
            FeeType::Uninvite => "uninvite",
            FeeType::Private => "private",
            FeeType::Public => "public",
            FeeType::Update => "update",
            FeeType::Warp => "warp",
        };
        f.write_str(name)
    }
}

impl FromStr for FeeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeeType::ALL
            .into_iter()
            .find(|fee| fee.to_string() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Fee amounts granted by one permission. Unlisted fee types cost nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeBundle {
    pub identifier: String,
    pub fees: BTreeMap<FeeType, f64>,
}

impl FeeBundle {
    pub fn new(identifier: impl Into<String>, fees: BTreeMap<FeeType, f64>) -> Self {
        Self {
            identifier: identifier.into(),
            fees,
        }
    }

    pub fn permission(&self) -> String {
        bundle_permission(ECONOMY_BUNDLE_PREFIX, &self.identifier)
    }

    pub fn fee(&self, fee: FeeType) -> f64 {
        self.fees.get(&fee).copied().unwrap_or(0.0)
    }
}

#[derive(Debug, Clone)]
pub struct FeeSettings {
    pub enabled: bool,
    pub inform_after_transaction: bool,
    pub default: FeeBundle,
    /// Ordered by identifier.
    pub bundles: Vec<FeeBundle>,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            inform_after_transaction: true,
            default: FeeBundle::new("default", BTreeMap::new()),
            bundles: Vec::new(),
        }
    }
}

/// Balances held by the server's economy plugin.
pub trait Ledger: Send + Sync {
    fn has(&self, player: &dyn LocalPlayer, amount: f64) -> bool;
    fn withdraw(&self, player: &dyn LocalPlayer, amount: f64);
}

/// Fee amounts and ledger operations as seen by the teleport pipeline.
pub trait EconomyCapability: Send + Sync {
    fn fee(&self, player: &dyn LocalPlayer, fee: FeeType) -> f64;
    fn has_at_least(&self, player: &dyn LocalPlayer, amount: f64) -> bool;
    fn withdraw(&self, player: &dyn LocalPlayer, amount: f64);
    fn inform_after_transaction(&self) -> bool;
}

/// Fee bundles from configuration on top of a host ledger.
pub struct EconomyService {
    settings: FeeSettings,
    ledger: Arc<dyn Ledger>,
}

impl EconomyService {
    pub fn new(settings: FeeSettings, ledger: Arc<dyn Ledger>) -> Self {
        Self { settings, ledger }
    }

    pub fn settings(&self) -> &FeeSettings {
        &self.settings
    }

    pub fn bundle(&self, player: &dyn LocalPlayer) -> &FeeBundle {
        first_permitted(&self.settings.bundles, player, FeeBundle::permission).unwrap_or(&self.settings.default)
    }

    pub fn register_permissions(&self, permissions: &PermissionRegistry) {
        for bundle in &self.settings.bundles {
            permissions.register(PermissionNode::new(
                bundle.permission(),
                format!("Pay the '{}' fees", bundle.identifier),
                PermissionDefault::False,
            ));
        }
    }

    pub fn unregister_permissions(&self, permissions: &PermissionRegistry) {
        for bundle in &self.settings.bundles {
            permissions.unregister(&bundle.permission());
        }
    }
}

impl EconomyCapability for EconomyService {
    fn fee(&self, player: &dyn LocalPlayer, fee: FeeType) -> f64 {
        self.bundle(player).fee(fee)
    }

    fn has_at_least(&self, player: &dyn LocalPlayer, amount: f64) -> bool {
        if amount <= 0.0 || player.has_permission(ECONOMY_DISOBEY) {
            return true;
        }
        self.ledger.has(player, amount)
    }

    fn withdraw(&self, player: &dyn LocalPlayer, amount: f64) {
        if amount <= 0.0 || player.has_permission(ECONOMY_DISOBEY) {
            debug!("Skipping withdrawal of {} from {}", amount, player.name());
            return;
        }
        info!("Withdrawing {} from {}", amount, player.name());
        self.ledger.withdraw(player, amount);
    }

    fn inform_after_transaction(&self) -> bool {
        self.settings.inform_after_transaction
    }
}
