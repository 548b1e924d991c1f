pub mod catalog;
pub mod inventory;
pub mod link;
pub mod order;
pub mod reference;

pub use catalog::{Article, Consommateur, Fournisseur, Local, Magasinier, Person};
pub use inventory::InventoryRow;
pub use link::{ArticleLink, Link, LocalLink};
pub use order::{Order, OrderHeader, OrderKind, OrderStatus};
pub use reference::EntityRef;
