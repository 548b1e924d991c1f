use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use super::{ensure_exists, BaseRepository, ConsommateurRepository, ReferenceLookup, Repository};
use crate::common::{format_timestamp, now, parse_timestamp};
use crate::entities::{consommateur, local};
use crate::errors::ServiceError;
use crate::models::{EntityRef, Local};

/// Repository for storage locations
#[derive(Debug, Clone)]
pub struct LocalRepository {
    base: BaseRepository,
    consommateurs: ConsommateurRepository,
}

impl LocalRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            consommateurs: ConsommateurRepository::new(db.clone()),
            base: BaseRepository::new(db),
        }
    }

    /// Create a location; its consumer, when set, must exist
    #[instrument(skip(self, local), fields(nom = %local.nom))]
    pub async fn insert(&self, local: &Local) -> Result<Local, ServiceError> {
        local.validate()?;
        if let Some(consommateur) = &local.consommateur {
            ensure_exists(&self.consommateurs, self.get_db(), consommateur.id).await?;
        }

        let stamp = now();
        let model = local::ActiveModel {
            nom: Set(local.nom.clone()),
            emplacement: Set(local.emplacement.clone()),
            kind: Set(local.kind.clone()),
            consommateur_id: Set(local.consommateur.as_ref().map(|c| c.id)),
            created_at: Set(format_timestamp(&local.created_at.unwrap_or(stamp))),
            updated_at: Set(format_timestamp(&local.updated_at.unwrap_or(stamp))),
            ..Default::default()
        }
        .insert(self.get_db())
        .await?;

        info!(local_id = model.id, "Local created");
        to_domain(model, None)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Local>, ServiceError> {
        let found = local::Entity::find_by_id(id)
            .find_also_related(consommateur::Entity)
            .one(self.get_db())
            .await?;

        match found {
            Some((model, owner)) => Ok(Some(to_domain(model, owner)?)),
            None => Ok(None),
        }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Local, ServiceError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Local", id))
    }

    pub async fn get_all(&self) -> Result<Vec<Local>, ServiceError> {
        local::Entity::find()
            .order_by_asc(local::Column::Nom)
            .find_also_related(consommateur::Entity)
            .all(self.get_db())
            .await?
            .into_iter()
            .map(|(model, owner)| to_domain(model, owner))
            .collect()
    }

    /// Locations assigned to a consumer
    pub async fn find_by_consommateur(&self, consommateur_id: i32) -> Result<Vec<Local>, ServiceError> {
        local::Entity::find()
            .filter(local::Column::ConsommateurId.eq(consommateur_id))
            .order_by_asc(local::Column::Nom)
            .find_also_related(consommateur::Entity)
            .all(self.get_db())
            .await?
            .into_iter()
            .map(|(model, owner)| to_domain(model, owner))
            .collect()
    }

    #[instrument(skip(self, local), fields(local_id = ?local.id))]
    pub async fn update(&self, local: &Local) -> Result<Local, ServiceError> {
        local.validate()?;
        let id = local
            .id
            .ok_or_else(|| ServiceError::NotFound("Local without id".to_string()))?;
        if let Some(consommateur) = &local.consommateur {
            ensure_exists(&self.consommateurs, self.get_db(), consommateur.id).await?;
        }

        let existing = local::Entity::find_by_id(id)
            .one(self.get_db())
            .await?
            .ok_or_else(|| ServiceError::not_found("Local", id))?;

        let mut active: local::ActiveModel = existing.into();
        active.nom = Set(local.nom.clone());
        active.emplacement = Set(local.emplacement.clone());
        active.kind = Set(local.kind.clone());
        active.consommateur_id = Set(local.consommateur.as_ref().map(|c| c.id));
        active.updated_at = Set(format_timestamp(&now()));

        to_domain(active.update(self.get_db()).await?, None)
    }

    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        local::Entity::delete_by_id(id).exec(self.get_db()).await?;
        Ok(())
    }
}

impl Repository for LocalRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

#[async_trait]
impl ReferenceLookup for LocalRepository {
    const ENTITY: &'static str = "Local";

    async fn exists_by_id<C>(&self, db: &C, id: i32) -> Result<bool, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(local::Entity::find_by_id(id).one(db).await?.is_some())
    }

    async fn display_name<C>(&self, db: &C, id: i32) -> Result<Option<String>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(local::Entity::find_by_id(id).one(db).await?.map(|l| l.nom))
    }
}

fn to_domain(model: local::Model, owner: Option<consommateur::Model>) -> Result<Local, ServiceError> {
    let consommateur = model.consommateur_id.map(|id| EntityRef {
        id,
        name: owner.as_ref().map(|c| c.nom.clone()),
    });

    Ok(Local {
        id: Some(model.id),
        created_at: Some(parse_timestamp(&model.created_at)?),
        updated_at: Some(parse_timestamp(&model.updated_at)?),
        nom: model.nom,
        emplacement: model.emplacement,
        kind: model.kind,
        consommateur,
    })
}
