// Order aggregates and the link reconciliation they run on every save
pub mod orders;
pub mod reconciler;

// Read-side summaries
pub mod inventory;

pub use inventory::InventoryAggregator;
pub use orders::{ExternalOrderStore, InternalOrderStore, OrderAggregateStore};
pub use reconciler::{LinkOp, ReconcileOutcome, ReconcilePlan, Reconciler};
