use crate::permissions::Permissions;
use serde::{Deserialize, Serialize};

/// The principal a token speaks for.
///
/// Built once by the issuer and embedded verbatim in the token; every request
/// presenting that token gets an identical copy back from the authenticator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub permissions: Permissions,
}

impl User {
    /// Whether this identity may use `capability` on `service`
    pub fn can(&self, service: &str, capability: &str) -> bool {
        self.permissions.allows(service, capability)
    }
}
