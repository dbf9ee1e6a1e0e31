//! Group membership resolution.
//!
//! Hosts may offer several permission plugins that know about groups. Each one
//! is wrapped in a [`ResolverProbe`]; the probes are tried once at startup in
//! order and the first that yields a resolver is used for the lifetime of the
//! runtime. When none matches, membership falls back to `group.<name>`
//! permission nodes.

use log::info;

use crate::host::LocalPlayer;

/// Answers whether a player belongs to a named group.
pub trait GroupResolver: Send + Sync {
    fn name(&self) -> &str;
    fn has_group(&self, player: &dyn LocalPlayer, group: &str) -> bool;
}

/// Group membership expressed as `group.<name>` permission nodes.
pub struct PermissionGroupResolver;

impl GroupResolver for PermissionGroupResolver {
    fn name(&self) -> &str {
        "permissions"
    }

    fn has_group(&self, player: &dyn LocalPlayer, group: &str) -> bool {
        player.has_permission(&format!("group.{}", group.to_ascii_lowercase()))
    }
}

type ProbeFn = dyn Fn() -> Option<Box<dyn GroupResolver>> + Send + Sync;

/// Checks whether a group-aware plugin is available and, if so, adapts it.
pub struct ResolverProbe {
    pub plugin: String,
    probe: Box<ProbeFn>,
}

impl ResolverProbe {
    pub fn new<F>(plugin: impl Into<String>, probe: F) -> Self
    where
        F: Fn() -> Option<Box<dyn GroupResolver>> + Send + Sync + 'static,
    {
        Self {
            plugin: plugin.into(),
            probe: Box::new(probe),
        }
    }

    fn try_resolve(&self) -> Option<Box<dyn GroupResolver>> {
        (self.probe)()
    }
}

/// Run the probes in order and keep the first resolver found.
pub fn select_group_resolver(probes: &[ResolverProbe]) -> Box<dyn GroupResolver> {
    for probe in probes {
        if let Some(resolver) = probe.try_resolve() {
            info!("Using {} for group resolution", probe.plugin);
            return resolver;
        }
    }
    info!("No group plugin found, resolving groups through permissions");
    Box::new(PermissionGroupResolver)
}
