use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use std::sync::Arc;

use crate::errors::ServiceError;
use crate::models::EntityRef;

pub mod article_repository;
pub mod link_store;
pub mod local_repository;
pub mod order_header_store;
#[macro_use]
mod order_tables;
pub mod external_order_repository;
pub mod internal_order_repository;
pub mod party_repository;
pub mod stock_repository;

pub use article_repository::ArticleRepository;
pub use external_order_repository::{
    ExternalArticleLinkRepository, ExternalLocalLinkRepository, ExternalOrderRepository,
};
pub use internal_order_repository::{
    InternalArticleLinkRepository, InternalLocalLinkRepository, InternalOrderRepository,
};
pub use link_store::LinkStore;
pub use local_repository::LocalRepository;
pub use order_header_store::OrderHeaderStore;
pub use party_repository::{ConsommateurRepository, FournisseurRepository, MagasinierRepository};
pub use stock_repository::{StockLedger, StockRepository};

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Read-by-id access an entity store offers to the order engine.
///
/// Lookups run on a caller-supplied handle so they observe the writes of an
/// open transaction.
#[async_trait]
pub trait ReferenceLookup: Send + Sync {
    /// Entity name used in referential errors
    const ENTITY: &'static str;

    async fn exists_by_id<C>(&self, db: &C, id: i32) -> Result<bool, ServiceError>
    where
        C: ConnectionTrait;

    /// Name shown for the entity, `None` if it does not exist
    async fn display_name<C>(&self, db: &C, id: i32) -> Result<Option<String>, ServiceError>
    where
        C: ConnectionTrait;
}

/// Fails with a referential error unless `id` resolves in `lookup`
pub async fn ensure_exists<L, C>(lookup: &L, db: &C, id: i32) -> Result<(), ServiceError>
where
    L: ReferenceLookup,
    C: ConnectionTrait,
{
    if lookup.exists_by_id(db, id).await? {
        Ok(())
    } else {
        Err(ServiceError::referential(L::ENTITY, id))
    }
}

/// Copy of `reference` carrying the entity's current display name
pub async fn resolve_ref<L, C>(lookup: &L, db: &C, reference: &EntityRef) -> Result<EntityRef, ServiceError>
where
    L: ReferenceLookup,
    C: ConnectionTrait,
{
    let name = lookup.display_name(db, reference.id).await?;
    Ok(EntityRef {
        id: reference.id,
        name,
    })
}
