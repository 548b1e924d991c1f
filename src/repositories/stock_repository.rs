use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{BaseRepository, Repository};
use crate::common::{format_timestamp, now};
use crate::entities::stock;
use crate::errors::ServiceError;

/// Receives the stock movement of a confirmed external order.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Adds `quantite` of an article at a location inside the caller's
    /// transaction and returns the new on-hand level.
    async fn credit(
        &self,
        txn: &DatabaseTransaction,
        article_id: i32,
        local_id: i32,
        quantite: i64,
    ) -> Result<i64, ServiceError>;
}

/// On-hand quantities per article and location
#[derive(Debug, Clone)]
pub struct StockRepository {
    base: BaseRepository,
}

impl StockRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Current level, zero when nothing was ever recorded
    pub async fn level(&self, article_id: i32, local_id: i32) -> Result<i64, ServiceError> {
        Ok(find_row(self.get_db(), article_id, local_id)
            .await?
            .map(|row| row.quantite)
            .unwrap_or(0))
    }

    /// Stock rows held at one location, ascending by article
    pub async fn list_for_local(&self, local_id: i32) -> Result<Vec<stock::Model>, ServiceError> {
        Ok(stock::Entity::find()
            .filter(stock::Column::LocalId.eq(local_id))
            .order_by_asc(stock::Column::ArticleId)
            .all(self.get_db())
            .await?)
    }
}

impl Repository for StockRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

async fn find_row<C>(db: &C, article_id: i32, local_id: i32) -> Result<Option<stock::Model>, ServiceError>
where
    C: ConnectionTrait,
{
    Ok(stock::Entity::find()
        .filter(stock::Column::ArticleId.eq(article_id))
        .filter(stock::Column::LocalId.eq(local_id))
        .one(db)
        .await?)
}

#[async_trait]
impl StockLedger for StockRepository {
    #[instrument(skip(self, txn))]
    async fn credit(
        &self,
        txn: &DatabaseTransaction,
        article_id: i32,
        local_id: i32,
        quantite: i64,
    ) -> Result<i64, ServiceError> {
        let stamp = format_timestamp(&now());
        let level = match find_row(txn, article_id, local_id).await? {
            Some(row) => {
                let level = row.quantite + quantite;
                let mut active: stock::ActiveModel = row.into();
                active.quantite = Set(level);
                active.updated_at = Set(stamp);
                active.update(txn).await?;
                level
            }
            None => {
                stock::ActiveModel {
                    article_id: Set(article_id),
                    local_id: Set(local_id),
                    quantite: Set(quantite),
                    updated_at: Set(stamp),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
                quantite
            }
        };

        info!(article_id, local_id, level, "Stock credited");
        Ok(level)
    }
}
