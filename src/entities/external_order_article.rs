use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "external_order_articles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub external_order_id: i32,
    pub article_id: i32,
    pub quantite: i32,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::external_order::Entity",
        from = "Column::ExternalOrderId",
        to = "super::external_order::Column::Id"
    )]
    ExternalOrder,
    #[sea_orm(
        belongs_to = "super::article::Entity",
        from = "Column::ArticleId",
        to = "super::article::Column::Id"
    )]
    Article,
}

impl Related<super::external_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ExternalOrder.def()
    }
}

impl Related<super::article::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Article.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
