//! The authorization gate: a pure decision function.
//!
//! Every mutating graph operation that is not self-evidently public
//! calls [`can_mutate`] before touching state; no state change happens
//! on a `false` result.

use souk_types::identity::Identity;
use souk_types::user::UserId;

/// Decide whether `identity` may mutate a resource owned by
/// `resource_owner`.
///
/// True iff the caller is present and is the owner, or the caller is an
/// admin AND the operation explicitly permits the administrative
/// override (`admin_override`). Absent identity is always a no.
pub fn can_mutate(
    identity: Option<&Identity>,
    resource_owner: &UserId,
    admin_override: bool,
) -> bool {
    match identity {
        None => false,
        Some(caller) => {
            caller.user_id == *resource_owner || (admin_override && caller.is_admin())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use souk_types::identity::Role;

    #[test]
    fn test_anonymous_never_mutates() {
        let owner = UserId::new();
        assert!(!can_mutate(None, &owner, false));
        assert!(!can_mutate(None, &owner, true));
    }

    #[test]
    fn test_owner_mutates_own_resource() {
        let owner = UserId::new();
        let caller = Identity::new(owner.clone(), Role::User);
        assert!(can_mutate(Some(&caller), &owner, false));
    }

    #[test]
    fn test_stranger_denied() {
        let owner = UserId::new();
        let caller = Identity::new(UserId::new(), Role::User);
        assert!(!can_mutate(Some(&caller), &owner, false));
        assert!(!can_mutate(Some(&caller), &owner, true));
    }

    #[test]
    fn test_admin_only_where_permitted() {
        let owner = UserId::new();
        let admin = Identity::new(UserId::new(), Role::Admin);
        assert!(!can_mutate(Some(&admin), &owner, false));
        assert!(can_mutate(Some(&admin), &owner, true));
    }
}
