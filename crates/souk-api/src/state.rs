//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the REST API
//! and the maintenance CLI. Services are generic over the repository
//! and crypto traits; AppState pins them to the infra implementations.

use std::sync::Arc;

use souk_core::event::EventBus;
use souk_core::service::catalog::CatalogService;
use souk_core::service::discussion::DiscussionService;
use souk_core::service::identity::IdentityService;
use souk_infra::config::{load_config, resolve_data_dir};
use souk_infra::crypto::password::Argon2CredentialStore;
use souk_infra::crypto::token::HmacTokenService;
use souk_infra::sqlite::comment::SqliteCommentRepository;
use souk_infra::sqlite::item::SqliteItemRepository;
use souk_infra::sqlite::pool::DatabasePool;
use souk_infra::sqlite::user::SqliteUserRepository;

/// Concrete type aliases for the service generics pinned to infra
/// implementations.
pub type ConcreteIdentityService = IdentityService<SqliteUserRepository, Argon2CredentialStore>;

pub type ConcreteCatalogService = CatalogService<SqliteItemRepository, SqliteUserRepository>;

pub type ConcreteDiscussionService =
    DiscussionService<SqliteCommentRepository, SqliteItemRepository, SqliteUserRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<ConcreteIdentityService>,
    pub catalog: Arc<ConcreteCatalogService>,
    pub discussion: Arc<ConcreteDiscussionService>,
    pub tokens: Arc<HmacTokenService>,
    pub events: EventBus,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: load config, connect to the
    /// database, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;

        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("souk.db").display());
        let db_pool = DatabasePool::new(&db_url).await?;

        let events = EventBus::new(256);

        let identity = IdentityService::new(
            SqliteUserRepository::new(db_pool.clone()),
            Argon2CredentialStore::new(&config),
            events.clone(),
        );

        let catalog = CatalogService::new(
            SqliteItemRepository::new(db_pool.clone()),
            SqliteUserRepository::new(db_pool.clone()),
            events.clone(),
        );

        let discussion = DiscussionService::new(
            SqliteCommentRepository::new(db_pool.clone()),
            SqliteItemRepository::new(db_pool.clone()),
            SqliteUserRepository::new(db_pool.clone()),
        );

        let tokens = HmacTokenService::new(&config.token_secret, config.token_ttl_days);

        Ok(Self {
            identity: Arc::new(identity),
            catalog: Arc::new(catalog),
            discussion: Arc::new(discussion),
            tokens: Arc::new(tokens),
            events,
            db_pool,
        })
    }
}
