use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "internal_order_articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub internal_order_id: i32,
    pub article_id: i32,
    pub quantite: i32,
    pub etat: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::internal_order::Entity",
        from = "Column::InternalOrderId",
        to = "super::internal_order::Column::Id"
    )]
    InternalOrder,
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id"
    )]
    Article,
}

impl Related<super::internal_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InternalOrder.def()
    }
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
