use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Reserved service key whose capabilities are granted across every service.
///
/// A capability listed under `"ALL"` satisfies a capability check for any service
/// the identity already has an entry for. It does not grant access to services
/// missing from the map.
pub const WILDCARD_SERVICE: &str = "ALL";

/// Capabilities granted to an identity, keyed by service name.
///
/// Serialised as `{"service": ["capability", ...]}`. A `null` map or capability
/// list reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Permissions(BTreeMap<String, BTreeSet<String>>);

impl Permissions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `capability` on `service`
    pub fn grant(mut self, service: impl Into<String>, capability: impl Into<String>) -> Self {
        self.0
            .entry(service.into())
            .or_default()
            .insert(capability.into());
        self
    }

    /// Add `service` with no capabilities, which is enough to pass service-only checks
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.0.entry(service.into()).or_default();
        self
    }

    pub fn capabilities(&self, service: &str) -> Option<&BTreeSet<String>> {
        self.0.get(service)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decide whether these permissions grant `capability` on `service`.
    ///
    /// An empty `service` or `capability` skips that dimension. See [`check`].
    pub fn allows(&self, service: &str, capability: &str) -> bool {
        check(self, service, capability)
    }
}

impl<'de> Deserialize<'de> for Permissions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map: Option<BTreeMap<String, Option<BTreeSet<String>>>> =
            Option::deserialize(deserializer)?;
        Ok(Self(
            map.unwrap_or_default()
                .into_iter()
                .map(|(service, capabilities)| (service, capabilities.unwrap_or_default()))
                .collect(),
        ))
    }
}

impl<S, C, I> FromIterator<(S, I)> for Permissions
where
    S: Into<String>,
    C: Into<String>,
    I: IntoIterator<Item = C>,
{
    fn from_iter<T: IntoIterator<Item = (S, I)>>(iter: T) -> Self {
        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for (service, capabilities) in iter {
            map.entry(service.into())
                .or_default()
                .extend(capabilities.into_iter().map(Into::into));
        }
        Self(map)
    }
}

/// Evaluate a permission check.
///
/// - a non-empty `service` must be a key of `permissions`, otherwise access is denied
///   whatever the capability;
/// - a non-empty `capability` must be granted either on `service` or on
///   [`WILDCARD_SERVICE`];
/// - when both are empty the check always allows.
pub fn check(permissions: &Permissions, service: &str, capability: &str) -> bool {
    let scoped = if service.is_empty() {
        None
    } else {
        match permissions.capabilities(service) {
            Some(capabilities) => Some(capabilities),
            None => return false,
        }
    };

    if capability.is_empty() {
        return true;
    }

    let granted = |capabilities: Option<&BTreeSet<String>>| {
        capabilities.is_some_and(|capabilities| capabilities.contains(capability))
    };
    granted(scoped) || granted(permissions.capabilities(WILDCARD_SERVICE))
}
