use thiserror::Error;

use crate::jwt::Identity;
use crate::jwt::Role;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    #[error("Unauthorized to access this resource")]
    Unauthorized,
}

/// Role and ownership checks over an authenticated identity.
///
/// - No IO
/// - No panics
pub struct AccessPolicy;

impl AccessPolicy {
    /// True when the identity's role is exactly `role`.
    pub fn has_role(identity: &Identity, role: Role) -> bool {
        identity.role == role
    }

    /// True when the identity owns the resource keyed by `owner_id`.
    pub fn is_owner(identity: &Identity, owner_id: &str) -> bool {
        identity.uid == owner_id
    }

    /// Require an exact role match.
    pub fn require_role(identity: &Identity, role: Role) -> Result<(), AuthzError> {
        if Self::has_role(identity, role) {
            Ok(())
        } else {
            Err(AuthzError::Unauthorized)
        }
    }

    /// Require that the identity owns the resource or holds `privileged`.
    ///
    /// The two predicates are evaluated independently; either one grants access.
    pub fn require_owner_or_role(
        identity: &Identity,
        owner_id: &str,
        privileged: Role,
    ) -> Result<(), AuthzError> {
        if Self::is_owner(identity, owner_id) || Self::has_role(identity, privileged) {
            Ok(())
        } else {
            Err(AuthzError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWN_ID: &str = "11111111-1111-4111-8111-111111111111";
    const OTHER_ID: &str = "22222222-2222-4222-8222-222222222222";

    fn identity(role: Role) -> Identity {
        Identity {
            email: "dave@example.com".to_string(),
            first_name: "Dave".to_string(),
            last_name: "Grohl".to_string(),
            uid: OWN_ID.to_string(),
            role,
        }
    }

    #[test]
    fn test_require_role_exact_match() {
        assert!(AccessPolicy::require_role(&identity(Role::Admin), Role::Admin).is_ok());
        assert!(AccessPolicy::require_role(&identity(Role::User), Role::User).is_ok());
        assert_eq!(
            AccessPolicy::require_role(&identity(Role::User), Role::Admin),
            Err(AuthzError::Unauthorized)
        );
        assert_eq!(
            AccessPolicy::require_role(&identity(Role::Admin), Role::User),
            Err(AuthzError::Unauthorized)
        );
    }

    #[test]
    fn test_user_denied_other_users_resource() {
        assert_eq!(
            AccessPolicy::require_owner_or_role(&identity(Role::User), OTHER_ID, Role::Admin),
            Err(AuthzError::Unauthorized)
        );
    }

    #[test]
    fn test_user_allowed_own_resource() {
        assert!(
            AccessPolicy::require_owner_or_role(&identity(Role::User), OWN_ID, Role::Admin)
                .is_ok()
        );
    }

    #[test]
    fn test_admin_allowed_any_resource() {
        let admin = identity(Role::Admin);
        assert!(AccessPolicy::require_owner_or_role(&admin, OTHER_ID, Role::Admin).is_ok());
        assert!(AccessPolicy::require_owner_or_role(&admin, OWN_ID, Role::Admin).is_ok());
    }

    #[test]
    fn test_denial_message() {
        assert_eq!(
            AuthzError::Unauthorized.to_string(),
            "Unauthorized to access this resource"
        );
    }
}
