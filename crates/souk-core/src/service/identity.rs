//! Identity graph: registration, authentication, profile updates, and
//! the following relation.
//!
//! All mutations validate before they persist, and ownership is checked
//! through the authorization gate. Authentication failures are opaque:
//! a wrong password and an unknown email produce the same error.

use souk_types::error::{CredentialError, DomainError};
use souk_types::event::MarketEvent;
use souk_types::identity::{Identity, Role};
use souk_types::user::{
    Profile, RegisterRequest, UpdateProfileRequest, User, UserId, validate_email,
    validate_password, validate_username,
};

use crate::event::EventBus;
use crate::repository::user::UserRepository;
use crate::service::credential::CredentialStore;
use crate::service::gate::can_mutate;
use crate::service::storage_err;

/// Service owning the user lifecycle and the following relation.
pub struct IdentityService<U: UserRepository, C: CredentialStore> {
    users: U,
    credentials: C,
    events: EventBus,
}

fn cred_err(_: CredentialError) -> DomainError {
    DomainError::Storage("credential derivation failed".to_string())
}

impl<U: UserRepository, C: CredentialStore> IdentityService<U, C> {
    pub fn new(users: U, credentials: C, events: EventBus) -> Self {
        Self {
            users,
            credentials,
            events,
        }
    }

    /// Register a new user.
    ///
    /// Fails with `Conflict` when the username or email is taken and
    /// `Validation` when format constraints are violated. On success a
    /// `user_created` notification is published, fire-and-forget.
    pub async fn register(&self, request: RegisterRequest) -> Result<User, DomainError> {
        validate_username(&request.username)
            .map_err(|m| DomainError::validation("username", m))?;
        validate_email(&request.email).map_err(|m| DomainError::validation("email", m))?;
        validate_password(&request.password)
            .map_err(|m| DomainError::validation("password", m))?;

        // Friendly pre-checks; the UNIQUE constraints remain the
        // authority under concurrent registration.
        if self
            .users
            .get_by_username(&request.username)
            .await
            .map_err(storage_err)?
            .is_some()
        {
            return Err(DomainError::Conflict("username".to_string()));
        }
        if self
            .users
            .get_by_email(&request.email)
            .await
            .map_err(storage_err)?
            .is_some()
        {
            return Err(DomainError::Conflict("email".to_string()));
        }

        let credential = self
            .credentials
            .set_credential(&request.password)
            .map_err(cred_err)?;

        let now = chrono::Utc::now();
        let user = User {
            id: UserId::new(),
            username: request.username,
            email: request.email,
            password_hash: credential.hash,
            password_salt: credential.salt,
            bio: None,
            image: None,
            role: Role::User,
            created_at: now,
            updated_at: now,
        };

        let user = self.users.create(&user).await.map_err(storage_err)?;
        tracing::info!(username = %user.username, "user registered");

        self.events.publish(MarketEvent::UserCreated {
            username: user.username.clone(),
        });

        Ok(user)
    }

    /// Authenticate by email and password.
    ///
    /// Unknown email and wrong password are indistinguishable to the
    /// caller: both are `Unauthorized`.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .users
            .get_by_email(email)
            .await
            .map_err(storage_err)?
            .ok_or(DomainError::Unauthorized)?;

        let ok = self
            .credentials
            .verify_credential(password, &user.password_hash, &user.password_salt)
            .map_err(cred_err)?;

        if !ok {
            return Err(DomainError::Unauthorized);
        }
        Ok(user)
    }

    /// Partial profile update. Only the user themself may do this; the
    /// admin override is deliberately not honored here.
    pub async fn update_profile(
        &self,
        identity: &Identity,
        user_id: &UserId,
        request: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        if !can_mutate(Some(identity), user_id, false) {
            return Err(DomainError::Forbidden);
        }

        let mut user = self
            .users
            .get_by_id(user_id)
            .await
            .map_err(storage_err)?
            .ok_or(DomainError::NotFound("user"))?;

        if let Some(username) = request.username {
            validate_username(&username).map_err(|m| DomainError::validation("username", m))?;
            if username != user.username
                && self
                    .users
                    .get_by_username(&username)
                    .await
                    .map_err(storage_err)?
                    .is_some()
            {
                return Err(DomainError::Conflict("username".to_string()));
            }
            user.username = username;
        }
        if let Some(email) = request.email {
            validate_email(&email).map_err(|m| DomainError::validation("email", m))?;
            if email != user.email
                && self
                    .users
                    .get_by_email(&email)
                    .await
                    .map_err(storage_err)?
                    .is_some()
            {
                return Err(DomainError::Conflict("email".to_string()));
            }
            user.email = email;
        }
        if let Some(password) = request.password {
            validate_password(&password).map_err(|m| DomainError::validation("password", m))?;
            let credential = self.credentials.set_credential(&password).map_err(cred_err)?;
            user.password_hash = credential.hash;
            user.password_salt = credential.salt;
        }
        if let Some(bio) = request.bio {
            user.bio = Some(bio);
        }
        if let Some(image) = request.image {
            user.image = Some(image);
        }

        user.updated_at = chrono::Utc::now();
        self.users.update(&user).await.map_err(storage_err)
    }

    pub async fn get_user(&self, id: &UserId) -> Result<User, DomainError> {
        self.users
            .get_by_id(id)
            .await
            .map_err(storage_err)?
            .ok_or(DomainError::NotFound("user"))
    }

    /// Look up a user's public profile, projected for the viewer.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<&Identity>,
    ) -> Result<Profile, DomainError> {
        let user = self
            .users
            .get_by_username(username)
            .await
            .map_err(storage_err)?
            .ok_or(DomainError::NotFound("profile"))?;

        let following = match viewer {
            Some(viewer) => self
                .users
                .is_following(&viewer.user_id, &user.id)
                .await
                .map_err(storage_err)?,
            None => false,
        };

        Ok(Profile::project(&user, following))
    }

    /// Follow a user by username. Idempotent: re-following is a no-op
    /// success. Self-follow is rejected.
    pub async fn follow(
        &self,
        identity: &Identity,
        username: &str,
    ) -> Result<Profile, DomainError> {
        let target = self
            .users
            .get_by_username(username)
            .await
            .map_err(storage_err)?
            .ok_or(DomainError::NotFound("profile"))?;

        if target.id == identity.user_id {
            return Err(DomainError::validation("username", "cannot follow yourself"));
        }

        self.users
            .follow(&identity.user_id, &target.id)
            .await
            .map_err(storage_err)?;

        Ok(Profile::project(&target, true))
    }

    /// Unfollow a user by username. Idempotent: unfollowing someone not
    /// followed is a no-op success.
    pub async fn unfollow(
        &self,
        identity: &Identity,
        username: &str,
    ) -> Result<Profile, DomainError> {
        let target = self
            .users
            .get_by_username(username)
            .await
            .map_err(storage_err)?
            .ok_or(DomainError::NotFound("profile"))?;

        if target.id == identity.user_id {
            return Err(DomainError::validation("username", "cannot follow yourself"));
        }

        self.users
            .unfollow(&identity.user_id, &target.id)
            .await
            .map_err(storage_err)?;

        Ok(Profile::project(&target, false))
    }

    pub async fn is_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<bool, DomainError> {
        self.users
            .is_following(follower, target)
            .await
            .map_err(storage_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testutil::{MemStore, PlainCredentials};

    fn service() -> IdentityService<MemStore, PlainCredentials> {
        IdentityService::new(MemStore::new(), PlainCredentials, EventBus::new(16))
    }

    fn register_req(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
        }
    }

    #[tokio::test]
    async fn register_and_authenticate() {
        let svc = service();
        let user = svc
            .register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.role, Role::User);

        let authed = svc
            .authenticate("alice@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[tokio::test]
    async fn register_publishes_user_created() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let svc = IdentityService::new(MemStore::new(), PlainCredentials, bus);

        svc.register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();

        let event = rx.try_recv().unwrap();
        assert!(matches!(event, MarketEvent::UserCreated { username } if username == "alice"));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts_and_leaves_original() {
        let svc = service();
        svc.register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();

        let err = svc
            .register(register_req("alice", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(f) if f == "username"));

        // Original record unchanged.
        let original = svc
            .authenticate("alice@example.com", "correct horse")
            .await
            .unwrap();
        assert_eq!(original.username, "alice");
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let svc = service();
        svc.register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();

        let err = svc
            .register(register_req("bob", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(f) if f == "email"));
    }

    #[tokio::test]
    async fn invalid_formats_rejected() {
        let svc = service();

        let err = svc
            .register(register_req("al ice", "alice@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "username", .. }));

        let err = svc
            .register(register_req("alice", "not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "email", .. }));

        let mut req = register_req("alice", "alice@example.com");
        req.password = "short".to_string();
        let err = svc.register(req).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "password", .. }));
    }

    #[tokio::test]
    async fn wrong_password_is_opaque_and_stateless() {
        let svc = service();
        svc.register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();

        // Three consecutive attempts produce the same opaque error.
        for _ in 0..3 {
            let err = svc
                .authenticate("alice@example.com", "wrong password")
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Unauthorized));
        }
        // Unknown email looks identical.
        let err = svc
            .authenticate("nobody@example.com", "correct horse")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));

        // No lockout: the right password still works.
        assert!(svc.authenticate("alice@example.com", "correct horse").await.is_ok());
    }

    #[tokio::test]
    async fn update_profile_requires_self() {
        let svc = service();
        let alice = svc
            .register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();
        let bob = svc
            .register(register_req("bob", "bob@example.com"))
            .await
            .unwrap();

        let as_bob = Identity::new(bob.id.clone(), Role::User);
        let err = svc
            .update_profile(&as_bob, &alice.id, UpdateProfileRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        // Admin override is not honored for profile updates.
        let as_admin = Identity::new(bob.id.clone(), Role::Admin);
        let err = svc
            .update_profile(&as_admin, &alice.id, UpdateProfileRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn update_profile_changes_fields_and_password() {
        let svc = service();
        let alice = svc
            .register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();
        let as_alice = Identity::new(alice.id.clone(), Role::User);

        let updated = svc
            .update_profile(
                &as_alice,
                &alice.id,
                UpdateProfileRequest {
                    bio: Some("lamp dealer".to_string()),
                    password: Some("new password".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.bio.as_deref(), Some("lamp dealer"));

        assert!(svc.authenticate("alice@example.com", "new password").await.is_ok());
        let err = svc
            .authenticate("alice@example.com", "correct horse")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized));
    }

    #[tokio::test]
    async fn update_profile_rechecks_uniqueness() {
        let svc = service();
        let alice = svc
            .register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();
        svc.register(register_req("bob", "bob@example.com"))
            .await
            .unwrap();

        let as_alice = Identity::new(alice.id.clone(), Role::User);
        let err = svc
            .update_profile(
                &as_alice,
                &alice.id,
                UpdateProfileRequest {
                    username: Some("bob".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(f) if f == "username"));
    }

    #[tokio::test]
    async fn follow_unfollow_round_trip() {
        let svc = service();
        let alice = svc
            .register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();
        let bob = svc
            .register(register_req("bob", "bob@example.com"))
            .await
            .unwrap();
        let as_alice = Identity::new(alice.id.clone(), Role::User);

        assert!(!svc.is_following(&alice.id, &bob.id).await.unwrap());

        let profile = svc.follow(&as_alice, "bob").await.unwrap();
        assert!(profile.following);
        assert!(svc.is_following(&alice.id, &bob.id).await.unwrap());

        // Idempotent: following again is a no-op success.
        svc.follow(&as_alice, "bob").await.unwrap();

        let profile = svc.unfollow(&as_alice, "bob").await.unwrap();
        assert!(!profile.following);
        assert!(!svc.is_following(&alice.id, &bob.id).await.unwrap());

        // Idempotent: unfollowing again is a no-op success.
        svc.unfollow(&as_alice, "bob").await.unwrap();
    }

    #[tokio::test]
    async fn self_follow_rejected() {
        let svc = service();
        let alice = svc
            .register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();
        let as_alice = Identity::new(alice.id.clone(), Role::User);

        let err = svc.follow(&as_alice, "alice").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn profile_projection_tracks_viewer() {
        let svc = service();
        let alice = svc
            .register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();
        svc.register(register_req("bob", "bob@example.com"))
            .await
            .unwrap();
        let as_alice = Identity::new(alice.id.clone(), Role::User);

        svc.follow(&as_alice, "bob").await.unwrap();

        let seen_by_alice = svc.profile("bob", Some(&as_alice)).await.unwrap();
        assert!(seen_by_alice.following);

        let seen_anonymously = svc.profile("bob", None).await.unwrap();
        assert!(!seen_anonymously.following);

        let err = svc.profile("nobody", None).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
