//! Stores for the parties an order names: suppliers, consumers and
//! storekeepers.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use super::{BaseRepository, ReferenceLookup, Repository};
use crate::common::{format_timestamp, now, parse_timestamp};
use crate::entities::{consommateur, fournisseur, magasinier};
use crate::errors::ServiceError;
use crate::models::{Fournisseur, Person};

#[derive(Debug, Clone)]
pub struct FournisseurRepository {
    base: BaseRepository,
}

impl FournisseurRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    #[instrument(skip(self, fournisseur), fields(nom = %fournisseur.nom))]
    pub async fn insert(&self, fournisseur: &Fournisseur) -> Result<Fournisseur, ServiceError> {
        fournisseur.validate()?;
        let stamp = now();
        let model = fournisseur::ActiveModel {
            nom: Set(fournisseur.nom.clone()),
            adresse: Set(fournisseur.adresse.clone()),
            email: Set(fournisseur.email.clone()),
            telephone: Set(fournisseur.telephone.clone()),
            created_at: Set(format_timestamp(&fournisseur.created_at.unwrap_or(stamp))),
            updated_at: Set(format_timestamp(&fournisseur.updated_at.unwrap_or(stamp))),
            ..Default::default()
        }
        .insert(self.get_db())
        .await?;

        info!(fournisseur_id = model.id, "Fournisseur created");
        fournisseur_to_domain(model)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<Fournisseur>, ServiceError> {
        fournisseur::Entity::find_by_id(id)
            .one(self.get_db())
            .await?
            .map(fournisseur_to_domain)
            .transpose()
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Fournisseur, ServiceError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Fournisseur", id))
    }

    pub async fn get_all(&self) -> Result<Vec<Fournisseur>, ServiceError> {
        fournisseur::Entity::find()
            .order_by_asc(fournisseur::Column::Nom)
            .all(self.get_db())
            .await?
            .into_iter()
            .map(fournisseur_to_domain)
            .collect()
    }

    pub async fn update(&self, fournisseur: &Fournisseur) -> Result<Fournisseur, ServiceError> {
        fournisseur.validate()?;
        let id = fournisseur
            .id
            .ok_or_else(|| ServiceError::NotFound("Fournisseur without id".to_string()))?;
        let existing = fournisseur::Entity::find_by_id(id)
            .one(self.get_db())
            .await?
            .ok_or_else(|| ServiceError::not_found("Fournisseur", id))?;

        let mut active: fournisseur::ActiveModel = existing.into();
        active.nom = Set(fournisseur.nom.clone());
        active.adresse = Set(fournisseur.adresse.clone());
        active.email = Set(fournisseur.email.clone());
        active.telephone = Set(fournisseur.telephone.clone());
        active.updated_at = Set(format_timestamp(&now()));

        fournisseur_to_domain(active.update(self.get_db()).await?)
    }

    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        fournisseur::Entity::delete_by_id(id)
            .exec(self.get_db())
            .await?;
        Ok(())
    }
}

impl Repository for FournisseurRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

#[async_trait]
impl ReferenceLookup for FournisseurRepository {
    const ENTITY: &'static str = "Fournisseur";

    async fn exists_by_id<C>(&self, db: &C, id: i32) -> Result<bool, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(fournisseur::Entity::find_by_id(id).one(db).await?.is_some())
    }

    async fn display_name<C>(&self, db: &C, id: i32) -> Result<Option<String>, ServiceError>
    where
        C: ConnectionTrait,
    {
        Ok(fournisseur::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(|f| f.nom))
    }
}

fn fournisseur_to_domain(model: fournisseur::Model) -> Result<Fournisseur, ServiceError> {
    Ok(Fournisseur {
        id: Some(model.id),
        created_at: Some(parse_timestamp(&model.created_at)?),
        updated_at: Some(parse_timestamp(&model.updated_at)?),
        nom: model.nom,
        adresse: model.adresse,
        email: model.email,
        telephone: model.telephone,
    })
}

/// Consumers and storekeepers share the `Person` shape and table layout.
macro_rules! person_repository {
    ($repo:ident, $entity:ident, $label:literal) => {
        #[derive(Debug, Clone)]
        pub struct $repo {
            base: BaseRepository,
        }

        impl $repo {
            pub fn new(db: Arc<DatabaseConnection>) -> Self {
                Self {
                    base: BaseRepository::new(db),
                }
            }

            #[instrument(skip(self, person), fields(nom = %person.nom))]
            pub async fn insert(&self, person: &Person) -> Result<Person, ServiceError> {
                person.validate()?;
                let stamp = now();
                let model = $entity::ActiveModel {
                    nom: Set(person.nom.clone()),
                    prenom: Set(person.prenom.clone()),
                    email: Set(person.email.clone()),
                    telephone: Set(person.telephone.clone()),
                    created_at: Set(format_timestamp(&person.created_at.unwrap_or(stamp))),
                    updated_at: Set(format_timestamp(&person.updated_at.unwrap_or(stamp))),
                    ..Default::default()
                }
                .insert(self.get_db())
                .await?;

                info!(id = model.id, "{} created", $label);
                Self::to_domain(model)
            }

            pub async fn find_by_id(&self, id: i32) -> Result<Option<Person>, ServiceError> {
                match $entity::Entity::find_by_id(id).one(self.get_db()).await? {
                    Some(model) => Ok(Some(Self::to_domain(model)?)),
                    None => Ok(None),
                }
            }

            pub async fn get_by_id(&self, id: i32) -> Result<Person, ServiceError> {
                self.find_by_id(id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found($label, id))
            }

            pub async fn get_all(&self) -> Result<Vec<Person>, ServiceError> {
                $entity::Entity::find()
                    .order_by_asc($entity::Column::Nom)
                    .all(self.get_db())
                    .await?
                    .into_iter()
                    .map(Self::to_domain)
                    .collect()
            }

            pub async fn update(&self, person: &Person) -> Result<Person, ServiceError> {
                person.validate()?;
                let id = person.id.ok_or_else(|| {
                    ServiceError::NotFound(concat!($label, " without id").to_string())
                })?;
                let existing = $entity::Entity::find_by_id(id)
                    .one(self.get_db())
                    .await?
                    .ok_or_else(|| ServiceError::not_found($label, id))?;

                let mut active: $entity::ActiveModel = existing.into();
                active.nom = Set(person.nom.clone());
                active.prenom = Set(person.prenom.clone());
                active.email = Set(person.email.clone());
                active.telephone = Set(person.telephone.clone());
                active.updated_at = Set(format_timestamp(&now()));

                Self::to_domain(active.update(self.get_db()).await?)
            }

            pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
                $entity::Entity::delete_by_id(id).exec(self.get_db()).await?;
                Ok(())
            }

            fn to_domain(model: $entity::Model) -> Result<Person, ServiceError> {
                Ok(Person {
                    id: Some(model.id),
                    created_at: Some(parse_timestamp(&model.created_at)?),
                    updated_at: Some(parse_timestamp(&model.updated_at)?),
                    nom: model.nom,
                    prenom: model.prenom,
                    email: model.email,
                    telephone: model.telephone,
                })
            }
        }

        impl Repository for $repo {
            fn get_db(&self) -> &DatabaseConnection {
                self.base.get_db()
            }
        }

        #[async_trait]
        impl ReferenceLookup for $repo {
            const ENTITY: &'static str = $label;

            async fn exists_by_id<C>(&self, db: &C, id: i32) -> Result<bool, ServiceError>
            where
                C: ConnectionTrait,
            {
                Ok($entity::Entity::find_by_id(id).one(db).await?.is_some())
            }

            async fn display_name<C>(
                &self,
                db: &C,
                id: i32,
            ) -> Result<Option<String>, ServiceError>
            where
                C: ConnectionTrait,
            {
                Ok($entity::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .map(|p| match p.prenom {
                        Some(prenom) if !prenom.trim().is_empty() => {
                            format!("{} {}", prenom, p.nom)
                        }
                        _ => p.nom,
                    }))
            }
        }
    };
}

person_repository!(ConsommateurRepository, consommateur, "Consommateur");
person_repository!(MagasinierRepository, magasinier, "Magasinier");
