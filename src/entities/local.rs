use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locals")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nom: String,
    pub emplacement: String,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub consommateur_id: Option<i32>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::consommateur::Entity",
        from = "Column::ConsommateurId",
        to = "super::consommateur::Column::Id"
    )]
    Consommateur,
}

impl Related<super::consommateur::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Consommateur.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
