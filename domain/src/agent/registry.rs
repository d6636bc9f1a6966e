//! Agent registry
//!
//! Static mapping from capability name to invocation contract. Built once
//! at startup and read-only afterwards, so any number of concurrent readers
//! can resolve descriptors without locking.

use super::descriptor::{AgentDescriptor, Capability};
use crate::core::error::DomainError;
use std::collections::HashMap;

/// Read-only capability -> descriptor map
///
/// Registration order is preserved: `all()` returns descriptors in the
/// order they were loaded, which the router and the coordinated plan rely
/// on for deterministic candidate scans.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    entries: Vec<AgentDescriptor>,
    by_capability: HashMap<Capability, usize>,
}

impl AgentRegistry {
    /// Build a registry from a list of descriptors.
    ///
    /// Fails with `InvalidRequest` when the same capability is registered
    /// twice; a registry with ambiguous keys cannot route deterministically.
    pub fn from_descriptors(descriptors: Vec<AgentDescriptor>) -> Result<Self, DomainError> {
        let mut registry = Self::default();
        for descriptor in descriptors {
            registry.insert(descriptor)?;
        }
        Ok(registry)
    }

    fn insert(&mut self, descriptor: AgentDescriptor) -> Result<(), DomainError> {
        let capability = descriptor.capability().clone();
        if self.by_capability.contains_key(&capability) {
            return Err(DomainError::InvalidRequest(format!(
                "duplicate capability in registry: {}",
                capability
            )));
        }
        self.by_capability.insert(capability, self.entries.len());
        self.entries.push(descriptor);
        Ok(())
    }

    /// Resolve a capability to its descriptor.
    pub fn resolve(&self, capability: &Capability) -> Result<&AgentDescriptor, DomainError> {
        self.by_capability
            .get(capability)
            .map(|&idx| &self.entries[idx])
            .ok_or_else(|| DomainError::UnknownAgent(capability.to_string()))
    }

    /// All descriptors in registration order.
    pub fn all(&self) -> &[AgentDescriptor] {
        &self.entries
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.by_capability.contains_key(capability)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: &str) -> AgentDescriptor {
        AgentDescriptor::new(
            Capability::new(name),
            format!("{} agent", name),
            format!("http://localhost:9000/{}", name),
        )
    }

    #[test]
    fn test_resolve_known_capability() {
        let registry =
            AgentRegistry::from_descriptors(vec![descriptor("inventory"), descriptor("location")])
                .unwrap();

        let found = registry.resolve(&Capability::new("inventory")).unwrap();
        assert_eq!(found.capability().as_str(), "inventory");
    }

    #[test]
    fn test_resolve_unknown_capability() {
        let registry = AgentRegistry::from_descriptors(vec![descriptor("inventory")]).unwrap();

        let err = registry.resolve(&Capability::new("navigation")).unwrap_err();
        assert!(matches!(err, DomainError::UnknownAgent(name) if name == "navigation"));
    }

    #[test]
    fn test_registration_order_preserved() {
        let registry = AgentRegistry::from_descriptors(vec![
            descriptor("inventory"),
            descriptor("matchmaking"),
            descriptor("location"),
        ])
        .unwrap();

        let names: Vec<&str> = registry
            .all()
            .iter()
            .map(|d| d.capability().as_str())
            .collect();
        assert_eq!(names, vec!["inventory", "matchmaking", "location"]);
    }

    #[test]
    fn test_duplicate_capability_rejected() {
        let err =
            AgentRegistry::from_descriptors(vec![descriptor("inventory"), descriptor("inventory")])
                .unwrap_err();
        assert!(matches!(err, DomainError::InvalidRequest(_)));
    }
}
