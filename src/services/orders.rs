use metrics::counter;
use sea_orm::{ConnectionTrait, DatabaseTransaction};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::{
    common::now,
    db::{self, DbPool},
    errors::ServiceError,
    models::{ArticleLink, EntityRef, LocalLink, Order, OrderHeader, OrderKind, OrderStatus},
    repositories::{
        ensure_exists, resolve_ref, ExternalArticleLinkRepository, ExternalLocalLinkRepository,
        ExternalOrderRepository, InternalArticleLinkRepository, InternalLocalLinkRepository,
        InternalOrderRepository, LinkStore, LocalRepository, MagasinierRepository,
        OrderHeaderStore, StockLedger, StockRepository,
    },
    services::reconciler::{ReconcileOutcome, Reconciler},
};

/// Transactional persistence of one order aggregate kind: the header row and
/// the article and location links it owns.
pub struct OrderAggregateStore<H, A, L> {
    db_pool: Arc<DbPool>,
    headers: H,
    articles: A,
    locations: L,
    magasiniers: MagasinierRepository,
    locals: LocalRepository,
    stock: Arc<dyn StockLedger>,
}

/// Orders handing stock to consumers
pub type InternalOrderStore = OrderAggregateStore<
    InternalOrderRepository,
    InternalArticleLinkRepository,
    InternalLocalLinkRepository,
>;

/// Orders placed with suppliers
pub type ExternalOrderStore = OrderAggregateStore<
    ExternalOrderRepository,
    ExternalArticleLinkRepository,
    ExternalLocalLinkRepository,
>;

impl InternalOrderStore {
    pub fn internal(db_pool: Arc<DbPool>) -> Self {
        Self::new(
            db_pool.clone(),
            InternalOrderRepository::new(db_pool.clone()),
            InternalArticleLinkRepository::new(db_pool.clone()),
            InternalLocalLinkRepository::new(db_pool),
        )
    }
}

impl ExternalOrderStore {
    pub fn external(db_pool: Arc<DbPool>) -> Self {
        Self::new(
            db_pool.clone(),
            ExternalOrderRepository::new(db_pool.clone()),
            ExternalArticleLinkRepository::new(db_pool.clone()),
            ExternalLocalLinkRepository::new(db_pool),
        )
    }
}

impl<H, A, L> OrderAggregateStore<H, A, L>
where
    H: OrderHeaderStore,
    A: LinkStore<Link = ArticleLink>,
    L: LinkStore<Link = LocalLink>,
{
    pub fn new(db_pool: Arc<DbPool>, headers: H, articles: A, locations: L) -> Self {
        Self {
            magasiniers: MagasinierRepository::new(db_pool.clone()),
            locals: LocalRepository::new(db_pool.clone()),
            stock: Arc::new(StockRepository::new(db_pool.clone())),
            db_pool,
            headers,
            articles,
            locations,
        }
    }

    /// Replaces the ledger credited when an external order is confirmed
    pub fn with_stock_ledger(mut self, stock: Arc<dyn StockLedger>) -> Self {
        self.stock = stock;
        self
    }

    pub fn kind(&self) -> OrderKind {
        H::KIND
    }

    fn entity_label() -> String {
        format!("{} order", H::KIND)
    }

    /// Creates (no id) or updates an order together with its links.
    ///
    /// Everything happens in one transaction: on any error the header and
    /// both link collections are left exactly as they were.
    #[instrument(skip(self, order), fields(kind = %H::KIND, order_id = ?order.id, statut = %order.statut))]
    pub async fn save(&self, order: &Order) -> Result<Order, ServiceError> {
        let scope = db::begin(&self.db_pool, "order.save").await?;
        let result = self.save_in(scope.txn(), order).await;
        let (order_id, articles, locals) = db::finish(scope, result).await?;

        counter!("magasin_orders.saved", 1, "kind" => H::KIND.to_string());
        info!(
            order_id,
            articles_inserted = articles.inserted,
            articles_updated = articles.updated,
            articles_deleted = articles.deleted,
            locals_inserted = locals.inserted,
            locals_updated = locals.updated,
            locals_deleted = locals.deleted,
            "Order saved"
        );

        self.get_by_id(order_id).await
    }

    async fn save_in(
        &self,
        txn: &DatabaseTransaction,
        order: &Order,
    ) -> Result<(i32, ReconcileOutcome, ReconcileOutcome), ServiceError> {
        ensure_exists(&self.magasiniers, txn, order.actor.id).await?;
        if let Some(counterparty) = &order.counterparty {
            if !self.headers.counterparty_exists(txn, counterparty.id).await? {
                return Err(ServiceError::referential(
                    H::KIND.counterparty_entity(),
                    counterparty.id,
                ));
            }
        }
        if let Some(local) = &order.local {
            ensure_exists(&self.locals, txn, local.id).await?;
        }

        let stamp = now();
        let (header, previous) = match order.id {
            None => {
                if order.statut != OrderStatus::EnAttente {
                    return Err(ServiceError::ValidationError(format!(
                        "New orders start in {}, got {}",
                        OrderStatus::EnAttente,
                        order.statut
                    )));
                }
                let header = OrderHeader {
                    id: None,
                    statut: order.statut,
                    created_at: order.creer_a.unwrap_or(stamp),
                    confirmed_at: None,
                    updated_at: stamp,
                    actor_id: order.actor.id,
                    counterparty_id: order.counterparty.as_ref().map(|c| c.id),
                    local_id: order.local.as_ref().map(|l| l.id),
                };
                (self.headers.insert(txn, &header).await?, None)
            }
            Some(id) => {
                let current = self
                    .headers
                    .find(txn, id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found(&Self::entity_label(), id))?;
                current.statut.ensure_transition(order.statut)?;

                let entering_confirmation = order.statut == OrderStatus::Confirmee
                    && current.statut != OrderStatus::Confirmee;
                let header = OrderHeader {
                    id: Some(id),
                    statut: order.statut,
                    created_at: current.created_at,
                    confirmed_at: if entering_confirmation {
                        Some(stamp)
                    } else {
                        current.confirmed_at
                    },
                    updated_at: stamp,
                    actor_id: order.actor.id,
                    counterparty_id: order.counterparty.as_ref().map(|c| c.id),
                    local_id: order.local.as_ref().map(|l| l.id),
                };
                (self.headers.update(txn, &header).await?, Some(current.statut))
            }
        };

        let order_id = header
            .id
            .ok_or_else(|| ServiceError::InternalError("Order header stored without id".into()))?;

        let articles = Reconciler::sync(&self.articles, txn, order_id, &order.articles).await?;
        let locals = Reconciler::sync(&self.locations, txn, order_id, &order.locals).await?;
        debug!(order_id, ?articles, ?locals, "Links reconciled");

        if H::KIND == OrderKind::External
            && header.statut == OrderStatus::Confirmee
            && previous != Some(OrderStatus::Confirmee)
        {
            self.apply_stock(txn, &header, order_id).await?;
        }

        Ok((order_id, articles, locals))
    }

    /// Credits the reconciled article quantities to the order's direct location
    async fn apply_stock(
        &self,
        txn: &DatabaseTransaction,
        header: &OrderHeader,
        order_id: i32,
    ) -> Result<(), ServiceError> {
        let Some(local_id) = header.local_id else {
            warn!(order_id, "Confirmed order has no direct local, stock left unchanged");
            return Ok(());
        };

        for link in self.articles.list_by_order(txn, order_id).await? {
            self.stock
                .credit(txn, link.article.id, local_id, i64::from(link.quantite))
                .await?;
        }
        Ok(())
    }

    /// Moves an order to `statut` through the same validated save path
    #[instrument(skip(self), fields(kind = %H::KIND))]
    pub async fn transition(&self, id: i32, statut: OrderStatus) -> Result<Order, ServiceError> {
        let mut order = self.get_by_id(id).await?;
        order.statut = statut;
        self.save(&order).await
    }

    /// Deletes an order's links and then its header in one transaction
    #[instrument(skip(self), fields(kind = %H::KIND))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let scope = db::begin(&self.db_pool, "order.delete").await?;
        let result = self.delete_in(scope.txn(), id).await;
        let (articles, locals) = db::finish(scope, result).await?;

        counter!("magasin_orders.deleted", 1, "kind" => H::KIND.to_string());
        info!(order_id = id, articles, locals, "Order deleted");
        Ok(())
    }

    async fn delete_in(&self, txn: &DatabaseTransaction, id: i32) -> Result<(u64, u64), ServiceError> {
        if self.headers.find(txn, id).await?.is_none() {
            return Err(ServiceError::not_found(&Self::entity_label(), id));
        }
        let articles = self.articles.delete_by_order(txn, id).await?;
        let locals = self.locations.delete_by_order(txn, id).await?;
        self.headers.delete(txn, id).await?;
        Ok((articles, locals))
    }

    /// Every order with both link collections loaded, ascending by id
    #[instrument(skip(self), fields(kind = %H::KIND))]
    pub async fn get_all(&self) -> Result<Vec<Order>, ServiceError> {
        let db = &*self.db_pool;
        let headers = self.headers.find_all(db).await?;
        let mut orders = Vec::with_capacity(headers.len());
        for header in headers {
            orders.push(self.hydrate(db, header).await?);
        }
        Ok(orders)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Order>, ServiceError> {
        let db = &*self.db_pool;
        match self.headers.find(db, id).await? {
            Some(header) => Ok(Some(self.hydrate(db, header).await?)),
            None => Ok(None),
        }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Order, ServiceError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(&Self::entity_label(), id))
    }

    async fn hydrate<C>(&self, db: &C, header: OrderHeader) -> Result<Order, ServiceError>
    where
        C: ConnectionTrait,
    {
        let id = header
            .id
            .ok_or_else(|| ServiceError::InternalError("Order header without id".into()))?;

        let actor = resolve_ref(&self.magasiniers, db, &EntityRef::new(header.actor_id)).await?;
        let counterparty = match header.counterparty_id {
            Some(cid) => Some(EntityRef {
                id: cid,
                name: self.headers.counterparty_name(db, cid).await?,
            }),
            None => None,
        };
        let local = match header.local_id {
            Some(lid) => Some(resolve_ref(&self.locals, db, &EntityRef::new(lid)).await?),
            None => None,
        };

        Ok(Order {
            id: Some(id),
            statut: header.statut,
            creer_a: Some(header.created_at),
            confirmer_a: header.confirmed_at,
            mise_a_jour_a: Some(header.updated_at),
            actor,
            counterparty,
            local,
            articles: self.articles.list_by_order(db, id).await?,
            locals: self.locations.list_by_order(db, id).await?,
        })
    }
}
