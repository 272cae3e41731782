use crate::identity::User;
use crate::permissions::{Permissions, WILDCARD_SERVICE};
use log::LevelFilter;

pub(crate) const TEST_PRIVATE_KEY: &str = include_str!("../testdata/jwt_rs256.key");
pub(crate) const TEST_PUBLIC_KEY: &str = include_str!("../testdata/jwt_rs256.pub");
pub(crate) const OTHER_PUBLIC_KEY: &str = include_str!("../testdata/other_rs256.pub");

pub(crate) fn setup_logger() {
    let _ = env_logger::builder()
        .filter_level(LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// A user holding `billing:read` plus the wildcard `ping` capability
pub(crate) fn test_user() -> User {
    User {
        user_id: 7,
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: "grace@example.com".to_string(),
        username: "grace".to_string(),
        permissions: Permissions::new()
            .grant("billing", "read")
            .grant(WILDCARD_SERVICE, "ping"),
    }
}
