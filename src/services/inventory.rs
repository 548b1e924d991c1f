use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use strum::IntoEnumIterator;
use tracing::{info, instrument};

use crate::{
    db::DbPool,
    errors::ServiceError,
    models::{Article, ArticleLink, EntityRef, InventoryRow, LocalLink, OrderStatus},
    repositories::{
        ArticleRepository, ExternalArticleLinkRepository, ExternalLocalLinkRepository,
        ExternalOrderRepository, InternalArticleLinkRepository, InternalLocalLinkRepository,
        InternalOrderRepository, LinkStore, OrderHeaderStore,
    },
};

/// Links of the counted orders of one kind, each tagged with its order id
#[derive(Debug, Default, Clone)]
pub struct Movements {
    pub articles: Vec<(i32, ArticleLink)>,
    pub locals: Vec<(i32, LocalLink)>,
}

/// Read-only per-article summary of what external orders brought in and
/// internal orders handed out.
#[derive(Clone)]
pub struct InventoryAggregator {
    db_pool: Arc<DbPool>,
    catalog: ArticleRepository,
    internal_orders: InternalOrderRepository,
    internal_articles: InternalArticleLinkRepository,
    internal_locals: InternalLocalLinkRepository,
    external_orders: ExternalOrderRepository,
    external_articles: ExternalArticleLinkRepository,
    external_locals: ExternalLocalLinkRepository,
}

impl InventoryAggregator {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            catalog: ArticleRepository::new(db_pool.clone()),
            internal_orders: InternalOrderRepository::new(db_pool.clone()),
            internal_articles: InternalArticleLinkRepository::new(db_pool.clone()),
            internal_locals: InternalLocalLinkRepository::new(db_pool.clone()),
            external_orders: ExternalOrderRepository::new(db_pool.clone()),
            external_articles: ExternalArticleLinkRepository::new(db_pool.clone()),
            external_locals: ExternalLocalLinkRepository::new(db_pool.clone()),
            db_pool,
        }
    }

    /// One row per article moved by a confirmed or delivered order
    #[instrument(skip(self))]
    pub async fn compute(&self) -> Result<Vec<InventoryRow>, ServiceError> {
        let db = &*self.db_pool;
        let counted: Vec<OrderStatus> = OrderStatus::iter()
            .filter(|s| s.counts_toward_inventory())
            .collect();

        let external_ids = self.external_orders.find_ids_by_status(db, &counted).await?;
        let internal_ids = self.internal_orders.find_ids_by_status(db, &counted).await?;

        let external = Movements {
            articles: self.external_articles.list_by_orders(db, &external_ids).await?,
            locals: self.external_locals.list_by_orders(db, &external_ids).await?,
        };
        let internal = Movements {
            articles: self.internal_articles.list_by_orders(db, &internal_ids).await?,
            locals: self.internal_locals.list_by_orders(db, &internal_ids).await?,
        };

        let catalog: HashMap<i32, Article> = self
            .catalog
            .get_all()
            .await?
            .into_iter()
            .filter_map(|a| a.id.map(|id| (id, a)))
            .collect();

        let rows = fold_movements(&external, &internal, &catalog);
        info!(
            rows = rows.len(),
            external_orders = external_ids.len(),
            internal_orders = internal_ids.len(),
            "Inventory computed"
        );
        Ok(rows)
    }
}

#[derive(Default)]
struct Tally {
    article: Option<EntityRef>,
    net: i64,
    locals: BTreeSet<String>,
}

fn names_by_order(locals: &[(i32, LocalLink)]) -> HashMap<i32, Vec<String>> {
    let mut names: HashMap<i32, Vec<String>> = HashMap::new();
    for (order_id, link) in locals {
        names.entry(*order_id).or_default().push(link.local.label());
    }
    names
}

/// Nets external against internal quantities per article.
///
/// The locations of an article are those linked to any order that moves it.
/// Rows with zero net and no location are dropped; negative nets are kept.
/// Output is sorted by article name, then id.
pub fn fold_movements(
    external: &Movements,
    internal: &Movements,
    catalog: &HashMap<i32, Article>,
) -> Vec<InventoryRow> {
    let mut tallies: HashMap<i32, Tally> = HashMap::new();

    for (movements, sign) in [(external, 1i64), (internal, -1i64)] {
        let names = names_by_order(&movements.locals);
        for (order_id, link) in &movements.articles {
            let tally = tallies.entry(link.article.id).or_default();
            if tally.article.as_ref().and_then(|a| a.name.as_ref()).is_none() {
                tally.article = Some(link.article.clone());
            }
            tally.net += sign * i64::from(link.quantite);
            if let Some(names) = names.get(order_id) {
                tally.locals.extend(names.iter().cloned());
            }
        }
    }

    let mut rows: Vec<InventoryRow> = tallies
        .into_iter()
        .filter(|(_, tally)| tally.net != 0 || !tally.locals.is_empty())
        .map(|(id, tally)| {
            let known = catalog.get(&id);
            let mut article = tally.article.unwrap_or_else(|| EntityRef::new(id));
            if article.name.is_none() {
                article.name = known.map(|a| a.nom.clone());
            }
            InventoryRow {
                article,
                reference: known.map(|a| a.reference.clone()),
                net_quantite: tally.net,
                locals: tally.locals,
                stock_minimal: known.map(|a| a.stock_minimal),
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        a.article_name()
            .cmp(&b.article_name())
            .then(a.article.id.cmp(&b.article.id))
    });
    rows
}
