//! Brings the stored link rows of one order in line with a desired set.
//!
//! Links are matched on their foreign key. A matched row keeps its id and is
//! only written when one of its editable fields differs.

use sea_orm::ConnectionTrait;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

use crate::errors::ServiceError;
use crate::models::Link;
use crate::repositories::LinkStore;

/// Storage action for one link
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkOp<L> {
    /// Desired link with no stored counterpart
    Insert(L),
    /// Stored link carrying the desired field values
    Update(L),
    /// Stored link already equal to the desired one
    Unchanged(L),
    /// Stored row no longer wanted
    Delete { id: i32, key: i32 },
}

/// Counts of what a reconciliation did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub deleted: usize,
}

impl ReconcileOutcome {
    /// Whether any row was written
    pub fn touched(&self) -> bool {
        self.inserted + self.updated + self.deleted > 0
    }
}

/// Storage-free diff between existing and desired links
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcilePlan<L> {
    pub ops: Vec<LinkOp<L>>,
}

impl<L: Link> ReconcilePlan<L> {
    /// Classifies every link.
    ///
    /// Deletes come first, then one op per distinct desired key in order of
    /// first appearance. For repeated desired keys the last entry wins. When
    /// storage already holds several rows for a key, the first is reconciled
    /// and the rest are deleted.
    pub fn compute(existing: Vec<L>, desired: Vec<L>) -> Self {
        let mut ops = Vec::new();

        let mut stored: HashMap<i32, L> = HashMap::new();
        for link in existing {
            let key = link.key();
            if stored.contains_key(&key) {
                if let Some(id) = link.id() {
                    ops.push(LinkOp::Delete { id, key });
                }
            } else {
                stored.insert(key, link);
            }
        }

        let mut order = Vec::new();
        let mut wanted: HashMap<i32, L> = HashMap::new();
        for link in desired {
            let key = link.key();
            if wanted.insert(key, link).is_none() {
                order.push(key);
            }
        }

        let mut leftovers: Vec<(i32, i32)> = stored
            .iter()
            .filter(|(key, _)| !wanted.contains_key(key))
            .filter_map(|(key, link)| link.id().map(|id| (id, *key)))
            .collect();
        leftovers.sort_unstable();
        ops.extend(
            leftovers
                .into_iter()
                .map(|(id, key)| LinkOp::Delete { id, key }),
        );

        for key in order {
            let Some(want) = wanted.remove(&key) else {
                continue;
            };
            match stored.remove(&key) {
                Some(current) if current.same_content(&want) => ops.push(LinkOp::Unchanged(current)),
                Some(mut current) => {
                    current.absorb(&want);
                    ops.push(LinkOp::Update(current));
                }
                None => ops.push(LinkOp::Insert(want)),
            }
        }

        Self { ops }
    }

    pub fn outcome(&self) -> ReconcileOutcome {
        self.ops
            .iter()
            .fold(ReconcileOutcome::default(), |mut acc, op| {
                match op {
                    LinkOp::Insert(_) => acc.inserted += 1,
                    LinkOp::Update(_) => acc.updated += 1,
                    LinkOp::Unchanged(_) => acc.unchanged += 1,
                    LinkOp::Delete { .. } => acc.deleted += 1,
                }
                acc
            })
    }
}

/// Applies reconciliation plans through a [`LinkStore`]
pub struct Reconciler;

impl Reconciler {
    /// Makes the links stored under `order_id` match `desired`.
    ///
    /// Every referenced article or location is checked before the first
    /// write; the first missing one fails the call with a referential error.
    #[instrument(skip(store, db, desired), fields(foreign = S::FOREIGN, desired = desired.len()))]
    pub async fn sync<S, C>(
        store: &S,
        db: &C,
        order_id: i32,
        desired: &[S::Link],
    ) -> Result<ReconcileOutcome, ServiceError>
    where
        S: LinkStore,
        C: ConnectionTrait,
    {
        let mut checked = HashSet::new();
        for link in desired {
            let key = link.key();
            if checked.insert(key) && !store.foreign_exists(db, key).await? {
                return Err(ServiceError::referential(S::FOREIGN, key));
            }
        }

        let desired: Vec<S::Link> = desired.iter().cloned().map(|l| store.normalize(l)).collect();
        let existing = store.list_by_order(db, order_id).await?;
        let plan = ReconcilePlan::compute(existing, desired);

        for op in &plan.ops {
            match op {
                LinkOp::Insert(link) => {
                    store.insert(db, link, order_id).await?;
                    debug!(order_id, key = link.key(), "Link inserted");
                }
                LinkOp::Update(link) => {
                    store.update(db, link).await?;
                    debug!(order_id, key = link.key(), "Link updated");
                }
                LinkOp::Unchanged(_) => {}
                LinkOp::Delete { id, key } => {
                    store.delete(db, *id).await?;
                    debug!(order_id, key, link_id = id, "Link deleted");
                }
            }
        }

        Ok(plan.outcome())
    }
}
