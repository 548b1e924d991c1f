use async_trait::async_trait;
use sea_orm::ConnectionTrait;

use crate::errors::ServiceError;
use crate::models::{ArticleLink, Link};

/// Persistence for one association table owned by an order aggregate.
///
/// Every operation takes the connection to run on, so the order store can
/// route all of them through its open transaction.
#[async_trait]
pub trait LinkStore: Send + Sync {
    type Link: Link;

    /// Entity name of the referenced side, used in referential errors
    const FOREIGN: &'static str;

    /// Drops fields the table has no column for, so desired and stored
    /// links compare equal once persisted
    fn normalize(&self, link: Self::Link) -> Self::Link;

    /// Links of one order, ascending by row id, with display names filled in
    async fn list_by_order<C>(&self, db: &C, order_id: i32) -> Result<Vec<Self::Link>, ServiceError>
    where
        C: ConnectionTrait;

    /// Links of several orders, each paired with the id of its owner
    async fn list_by_orders<C>(
        &self,
        db: &C,
        order_ids: &[i32],
    ) -> Result<Vec<(i32, Self::Link)>, ServiceError>
    where
        C: ConnectionTrait;

    /// Whether the article or location a link would point to exists
    async fn foreign_exists<C>(&self, db: &C, key: i32) -> Result<bool, ServiceError>
    where
        C: ConnectionTrait;

    /// Insert a new row under `order_id`.
    ///
    /// Fails with a referential error when the referenced entity is missing.
    async fn insert<C>(&self, db: &C, link: &Self::Link, order_id: i32) -> Result<Self::Link, ServiceError>
    where
        C: ConnectionTrait;

    /// Overwrite the editable fields of the row identified by `link.id`
    async fn update<C>(&self, db: &C, link: &Self::Link) -> Result<Self::Link, ServiceError>
    where
        C: ConnectionTrait;

    /// Remove one row; unknown ids are ignored
    async fn delete<C>(&self, db: &C, link_id: i32) -> Result<(), ServiceError>
    where
        C: ConnectionTrait;

    /// Remove every row of an order, returning how many went
    async fn delete_by_order<C>(&self, db: &C, order_id: i32) -> Result<u64, ServiceError>
    where
        C: ConnectionTrait;
}

/// Article links must move a strictly positive quantity
pub(crate) fn ensure_positive(link: &ArticleLink) -> Result<(), ServiceError> {
    if link.quantite <= 0 {
        return Err(ServiceError::ValidationError(format!(
            "Quantity for article {} must be positive, got {}",
            link.article.id, link.quantite
        )));
    }
    Ok(())
}
