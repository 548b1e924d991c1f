use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::Validate;

use super::{BaseRepository, ReferenceLookup, Repository};
use crate::common::{format_timestamp, now, parse_optional_timestamp, parse_timestamp};
use crate::entities::article::{self, Entity as ArticleEntity};
use crate::errors::ServiceError;
use crate::models::Article;

/// Repository for article operations
#[derive(Debug, Clone)]
pub struct ArticleRepository {
    base: BaseRepository,
}

impl ArticleRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Create a new article; `reference` must not be in use
    #[instrument(skip(self, article), fields(reference = %article.reference))]
    pub async fn insert(&self, article: &Article) -> Result<Article, ServiceError> {
        article.validate()?;
        if self.find_by_reference(&article.reference).await?.is_some() {
            return Err(ServiceError::ValidationError(format!(
                "Article reference '{}' already exists",
                article.reference
            )));
        }

        let stamp = now();
        let model = article::ActiveModel {
            reference: Set(article.reference.clone()),
            nom: Set(article.nom.clone()),
            categorie: Set(article.categorie.clone()),
            stock_minimal: Set(article.stock_minimal),
            date_peremption: Set(article.date_peremption.as_ref().map(format_timestamp)),
            est_critique: Set(article.est_critique),
            est_consommable: Set(article.est_consommable),
            created_at: Set(format_timestamp(&article.created_at.unwrap_or(stamp))),
            updated_at: Set(format_timestamp(&article.updated_at.unwrap_or(stamp))),
            ..Default::default()
        }
        .insert(self.get_db())
        .await
        .map_err(|e| {
            error!("Failed to create article: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        info!(article_id = model.id, "Article created");
        to_domain(model)
    }

    /// Find an article by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Article>, ServiceError> {
        ArticleEntity::find_by_id(id)
            .one(self.get_db())
            .await?
            .map(to_domain)
            .transpose()
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Article, ServiceError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Article", id))
    }

    pub async fn find_by_reference(&self, reference: &str) -> Result<Option<Article>, ServiceError> {
        ArticleEntity::find()
            .filter(article::Column::Reference.eq(reference))
            .one(self.get_db())
            .await?
            .map(to_domain)
            .transpose()
    }

    pub async fn get_all(&self) -> Result<Vec<Article>, ServiceError> {
        ArticleEntity::find()
            .order_by_asc(article::Column::Nom)
            .all(self.get_db())
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    /// Update an article
    #[instrument(skip(self, article), fields(article_id = ?article.id))]
    pub async fn update(&self, article: &Article) -> Result<Article, ServiceError> {
        article.validate()?;
        let id = article
            .id
            .ok_or_else(|| ServiceError::NotFound("Article without id".to_string()))?;

        let existing = ArticleEntity::find_by_id(id)
            .one(self.get_db())
            .await?
            .ok_or_else(|| ServiceError::not_found("Article", id))?;

        if existing.reference != article.reference {
            if let Some(other) = self.find_by_reference(&article.reference).await? {
                if other.id != Some(id) {
                    return Err(ServiceError::ValidationError(format!(
                        "Article reference '{}' already exists",
                        article.reference
                    )));
                }
            }
        }

        let mut active: article::ActiveModel = existing.into();
        active.reference = Set(article.reference.clone());
        active.nom = Set(article.nom.clone());
        active.categorie = Set(article.categorie.clone());
        active.stock_minimal = Set(article.stock_minimal);
        active.date_peremption = Set(article.date_peremption.as_ref().map(format_timestamp));
        active.est_critique = Set(article.est_critique);
        active.est_consommable = Set(article.est_consommable);
        active.updated_at = Set(format_timestamp(&now()));

        let model = active.update(self.get_db()).await?;
        to_domain(model)
    }

    /// Delete an article; deleting an unknown id is not an error
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        ArticleEntity::delete_by_id(id).exec(self.get_db()).await?;
        Ok(())
    }
}

impl Repository for ArticleRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

#[async_trait]
impl ReferenceLookup for ArticleRepository {
    const ENTITY: &'static str = "Article";

    async fn exists_by_id<C>(&self, db: &C, id: i32) -> Result<bool, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(ArticleEntity::find_by_id(id).one(db).await?.is_some())
    }

    async fn display_name<C>(&self, db: &C, id: i32) -> Result<Option<String>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(ArticleEntity::find_by_id(id).one(db).await?.map(|a| a.nom))
    }
}

fn to_domain(model: article::Model) -> Result<Article, ServiceError> {
    Ok(Article {
        id: Some(model.id),
        date_peremption: parse_optional_timestamp(model.date_peremption.as_deref())?,
        created_at: Some(parse_timestamp(&model.created_at)?),
        updated_at: Some(parse_timestamp(&model.updated_at)?),
        reference: model.reference,
        nom: model.nom,
        categorie: model.categorie,
        stock_minimal: model.stock_minimal,
        est_critique: model.est_critique,
        est_consommable: model.est_consommable,
    })
}
