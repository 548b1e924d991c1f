// Reference entities
pub mod article;
pub mod consommateur;
pub mod fournisseur;
pub mod local;
pub mod magasinier;

// Order aggregates and their owned association rows
pub mod external_order;
pub mod external_order_article;
pub mod external_order_local;
pub mod internal_order;
pub mod internal_order_article;
pub mod internal_order_local;

pub mod stock;
