/*!
 * Transaction Helper Utilities
 *
 * A write unit opens a transaction with [`begin`], runs its steps against the
 * returned handle and hands the outcome to [`finish`], which commits on `Ok`
 * and rolls back on `Err`.
 */

use metrics::{counter, histogram};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use std::time::Instant;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::errors::ServiceError;

/// An open transaction together with the data used to log its outcome
pub struct Scope {
    txn: DatabaseTransaction,
    id: Uuid,
    operation: &'static str,
    started: Instant,
}

impl Scope {
    /// Handle to run statements inside the transaction
    pub fn txn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Opens a transaction for `operation`
pub async fn begin(db: &DatabaseConnection, operation: &'static str) -> Result<Scope, ServiceError> {
    let id = Uuid::new_v4();
    let txn = db.begin().await.map_err(|e| {
        error!(transaction_id = %id, operation, "Failed to begin transaction: {}", e);
        ServiceError::DatabaseError(e)
    })?;

    debug!(transaction_id = %id, operation, "Starting database transaction");
    counter!("magasin_db.transaction.started", 1);

    Ok(Scope {
        txn,
        id,
        operation,
        started: Instant::now(),
    })
}

/// Commits the transaction if `result` is `Ok`, rolls it back otherwise.
///
/// The original error is returned after a rollback; a failing rollback is
/// only logged since the connection discards the transaction anyway.
pub async fn finish<T>(scope: Scope, result: Result<T, ServiceError>) -> Result<T, ServiceError> {
    let Scope {
        txn,
        id,
        operation,
        started,
    } = scope;

    match result {
        Ok(value) => {
            txn.commit().await.map_err(|e| {
                error!(transaction_id = %id, operation, "Failed to commit transaction: {}", e);
                counter!("magasin_db.transaction.rolled_back", 1);
                ServiceError::DatabaseError(e)
            })?;

            let elapsed = started.elapsed();
            histogram!("magasin_db.transaction.duration", elapsed);
            counter!("magasin_db.transaction.committed", 1);
            debug!(transaction_id = %id, operation, "Transaction committed successfully in {:?}", elapsed);
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                error!(transaction_id = %id, operation, "Rollback failed: {}", rollback_err);
            }

            let elapsed = started.elapsed();
            histogram!("magasin_db.transaction.duration", elapsed);
            counter!("magasin_db.transaction.rolled_back", 1);
            warn!(transaction_id = %id, operation, error = %err, "Transaction rolled back after {:?}", elapsed);
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection_with_config, run_migrations, DbConfig};
    use crate::entities::magasinier;
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

    async fn pool() -> DatabaseConnection {
        let pool = establish_connection_with_config(&DbConfig::in_memory())
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn row(nom: &str) -> magasinier::ActiveModel {
        magasinier::ActiveModel {
            nom: Set(nom.to_string()),
            created_at: Set("2024-01-01 00:00:00".into()),
            updated_at: Set("2024-01-01 00:00:00".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn ok_result_commits() {
        let db = pool().await;
        let scope = begin(&db, "test").await.unwrap();
        let result = row("Amine").insert(scope.txn()).await.map_err(ServiceError::from);
        finish(scope, result).await.unwrap();

        assert_eq!(magasinier::Entity::find().count(&db).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn err_result_rolls_back() {
        let db = pool().await;
        let scope = begin(&db, "test").await.unwrap();
        row("Amine").insert(scope.txn()).await.unwrap();
        let result: Result<(), ServiceError> = Err(ServiceError::NotFound("boom".into()));
        let err = finish(scope, result).await.unwrap_err();

        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(magasinier::Entity::find().count(&db).await.unwrap(), 0);
    }
}
