use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "internal_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub created_at: String,
    pub confirmed_at: Option<String>,
    pub updated_at: String,
    pub statut: String,
    pub actor_id: i32,
    pub counterparty_id: Option<i32>,
    pub local_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::internal_order_article::Entity")]
    Articles,
    #[sea_orm(has_many = "super::internal_order_local::Entity")]
    Locals,
}

impl Related<super::internal_order_article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Articles.def()
    }
}

impl Related<super::internal_order_local::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Locals.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
