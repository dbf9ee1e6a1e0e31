use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use log::debug;

use super::Warp;

/// The field an update touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarpField {
    Creator,
    Type,
    Position,
    Visits,
    WelcomeMessage,
    Invitations,
}

/// Change notifications delivered to observers after the store changed.
#[derive(Debug, Clone)]
pub enum WarpEvent {
    Added(Warp),
    Removed(Warp),
    Updated { warp: Warp, field: WarpField },
}

pub trait WarpObserver: Send + Sync {
    fn on_event(&self, event: &WarpEvent);
}

/// Access to the set of known warps.
pub trait WarpStore: Send + Sync {
    /// Every warp matching `predicate`.
    fn filter(&self, predicate: &dyn Fn(&Warp) -> bool) -> Vec<Warp>;

    fn get(&self, name: &str) -> Option<Warp>;

    /// Add a warp. Returns false if the name is taken.
    fn add(&self, warp: Warp) -> bool;

    fn remove(&self, name: &str) -> Option<Warp>;

    /// Record a completed teleport to the named warp.
    fn visited(&self, name: &str);
}

/// In-memory warp store; names are case-insensitive.
pub struct MemoryWarpStore {
    warps: RwLock<BTreeMap<String, Warp>>,
    observers: RwLock<Vec<Arc<dyn WarpObserver>>>,
}

impl MemoryWarpStore {
    pub fn new() -> Self {
        Self {
            warps: RwLock::new(BTreeMap::new()),
            observers: RwLock::new(Vec::new()),
        }
    }

    fn key(name: &str) -> String {
        name.to_lowercase()
    }

    pub fn subscribe(&self, observer: Arc<dyn WarpObserver>) {
        self.observers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(observer);
    }

    fn notify(&self, event: WarpEvent) {
        let observers = self.observers.read().unwrap_or_else(|e| e.into_inner());
        for observer in observers.iter() {
            observer.on_event(&event);
        }
    }

    /// Apply `change` to the named warp and announce `field` as updated.
    pub fn update(&self, name: &str, field: WarpField, change: impl FnOnce(&mut Warp)) -> bool {
        let updated = {
            let mut warps = self.warps.write().unwrap_or_else(|e| e.into_inner());
            match warps.get_mut(&Self::key(name)) {
                Some(warp) => {
                    change(warp);
                    Some(warp.clone())
                }
                None => None,
            }
        };
        match updated {
            Some(warp) => {
                self.notify(WarpEvent::Updated { warp, field });
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.warps.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryWarpStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WarpStore for MemoryWarpStore {
    fn filter(&self, predicate: &dyn Fn(&Warp) -> bool) -> Vec<Warp> {
        self.warps
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .filter(|warp| predicate(warp))
            .cloned()
            .collect()
    }

    fn get(&self, name: &str) -> Option<Warp> {
        self.warps
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&Self::key(name))
            .cloned()
    }

    fn add(&self, warp: Warp) -> bool {
        {
            let mut warps = self.warps.write().unwrap_or_else(|e| e.into_inner());
            let key = Self::key(&warp.name);
            if warps.contains_key(&key) {
                return false;
            }
            warps.insert(key, warp.clone());
        }
        debug!("Added warp '{}' in {}", warp.name, warp.world);
        self.notify(WarpEvent::Added(warp));
        true
    }

    fn remove(&self, name: &str) -> Option<Warp> {
        let removed = self
            .warps
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&Self::key(name));
        if let Some(warp) = &removed {
            debug!("Removed warp '{}'", warp.name);
            self.notify(WarpEvent::Removed(warp.clone()));
        }
        removed
    }

    fn visited(&self, name: &str) {
        self.update(name, WarpField::Visits, |warp| warp.visits += 1);
    }
}
