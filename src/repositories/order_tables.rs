//! Generators for the three tables each order kind owns: the header, its
//! article links and its location links.
//!
//! Both kinds share one row layout and differ only in table names, the
//! counterparty they point to and which free-text columns their link tables
//! carry. Invoking modules bring the sea-orm query traits into scope.

/// Header repository over one order table.
///
/// `counterparty` names the field and the entity store the counterparty id
/// resolves against.
macro_rules! order_header_repository {
    (
        $(#[$meta:meta])*
        $repo:ident {
            kind: $kind:expr,
            table: $table:ident,
            label: $label:literal,
            counterparty: $field:ident: $lookup:ty $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $repo {
            $field: $lookup,
        }

        impl $repo {
            pub fn new(db: std::sync::Arc<sea_orm::DatabaseConnection>) -> Self {
                Self {
                    $field: <$lookup>::new(db),
                }
            }

            fn header_from_model(
                model: $table::Model,
            ) -> Result<$crate::models::OrderHeader, $crate::errors::ServiceError> {
                $crate::repositories::order_header_store::HeaderColumns {
                    id: model.id,
                    created_at: &model.created_at,
                    confirmed_at: model.confirmed_at.as_deref(),
                    updated_at: &model.updated_at,
                    statut: &model.statut,
                    actor_id: model.actor_id,
                    counterparty_id: model.counterparty_id,
                    local_id: model.local_id,
                }
                .into_header()
            }
        }

        #[async_trait::async_trait]
        impl $crate::repositories::OrderHeaderStore for $repo {
            const KIND: $crate::models::OrderKind = $kind;

            async fn find<C>(
                &self,
                db: &C,
                id: i32,
            ) -> Result<Option<$crate::models::OrderHeader>, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                $table::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .map(Self::header_from_model)
                    .transpose()
            }

            async fn find_all<C>(
                &self,
                db: &C,
            ) -> Result<Vec<$crate::models::OrderHeader>, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                $table::Entity::find()
                    .order_by_asc($table::Column::Id)
                    .all(db)
                    .await?
                    .into_iter()
                    .map(Self::header_from_model)
                    .collect()
            }

            async fn find_ids_by_status<C>(
                &self,
                db: &C,
                statuses: &[$crate::models::OrderStatus],
            ) -> Result<Vec<i32>, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                if statuses.is_empty() {
                    return Ok(Vec::new());
                }
                let values: Vec<&str> = statuses
                    .iter()
                    .flat_map(|s| s.stored_forms().iter().copied())
                    .collect();
                let ids = $table::Entity::find()
                    .select_only()
                    .column($table::Column::Id)
                    .filter($table::Column::Statut.is_in(values))
                    .order_by_asc($table::Column::Id)
                    .into_tuple::<i32>()
                    .all(db)
                    .await?;
                Ok(ids)
            }

            async fn insert<C>(
                &self,
                db: &C,
                header: &$crate::models::OrderHeader,
            ) -> Result<$crate::models::OrderHeader, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                let model = $table::ActiveModel {
                    created_at: Set(format_timestamp(&header.created_at)),
                    confirmed_at: Set(header.confirmed_at.as_ref().map(format_timestamp)),
                    updated_at: Set(format_timestamp(&header.updated_at)),
                    statut: Set(header.statut.to_string()),
                    actor_id: Set(header.actor_id),
                    counterparty_id: Set(header.counterparty_id),
                    local_id: Set(header.local_id),
                    ..Default::default()
                }
                .insert(db)
                .await?;
                Self::header_from_model(model)
            }

            async fn update<C>(
                &self,
                db: &C,
                header: &$crate::models::OrderHeader,
            ) -> Result<$crate::models::OrderHeader, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                let id = header.id.ok_or_else(|| {
                    $crate::errors::ServiceError::NotFound(concat!($label, " without id").to_string())
                })?;
                let existing = $table::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .ok_or_else(|| $crate::errors::ServiceError::not_found($label, id))?;

                let mut active: $table::ActiveModel = existing.into();
                active.confirmed_at = Set(header.confirmed_at.as_ref().map(format_timestamp));
                active.updated_at = Set(format_timestamp(&header.updated_at));
                active.statut = Set(header.statut.to_string());
                active.actor_id = Set(header.actor_id);
                active.counterparty_id = Set(header.counterparty_id);
                active.local_id = Set(header.local_id);

                Self::header_from_model(active.update(db).await?)
            }

            async fn delete<C>(&self, db: &C, id: i32) -> Result<bool, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                let result = $table::Entity::delete_by_id(id).exec(db).await?;
                Ok(result.rows_affected > 0)
            }

            async fn counterparty_exists<C>(
                &self,
                db: &C,
                id: i32,
            ) -> Result<bool, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                self.$field.exists_by_id(db, id).await
            }

            async fn counterparty_name<C>(
                &self,
                db: &C,
                id: i32,
            ) -> Result<Option<String>, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                self.$field.display_name(db, id).await
            }
        }
    };
}

/// Article link repository over one association table.
///
/// `columns` lists the free-text fields of `ArticleLink` the table stores.
/// The same list drives reads, inserts, updates and `normalize`, so a column
/// is either round-tripped everywhere or dropped everywhere.
macro_rules! article_link_repository {
    (
        $(#[$meta:meta])*
        $repo:ident {
            table: $table:ident,
            owner: $owner_field:ident / $owner_col:ident,
            label: $label:literal,
            columns: [$($col:ident),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $repo {
            articles: $crate::repositories::ArticleRepository,
        }

        impl $repo {
            pub fn new(db: std::sync::Arc<sea_orm::DatabaseConnection>) -> Self {
                Self {
                    articles: $crate::repositories::ArticleRepository::new(db),
                }
            }

            fn link_from_model(
                model: $table::Model,
                article: Option<$crate::entities::article::Model>,
            ) -> Result<$crate::models::ArticleLink, $crate::errors::ServiceError> {
                Ok($crate::models::ArticleLink {
                    id: Some(model.id),
                    article: $crate::models::EntityRef {
                        id: model.article_id,
                        name: article.map(|a| a.nom),
                    },
                    created_at: parse_optional_timestamp(Some(&model.created_at))?,
                    updated_at: parse_optional_timestamp(Some(&model.updated_at))?,
                    $($col: model.$col,)*
                    ..$crate::models::ArticleLink::new(model.article_id, model.quantite)
                })
            }
        }

        #[async_trait::async_trait]
        impl $crate::repositories::LinkStore for $repo {
            type Link = $crate::models::ArticleLink;
            const FOREIGN: &'static str = "Article";

            fn normalize(&self, link: $crate::models::ArticleLink) -> $crate::models::ArticleLink {
                $crate::models::ArticleLink {
                    $($col: link.$col.clone(),)*
                    ..$crate::models::ArticleLink {
                        etat: None,
                        notes: None,
                        ..link
                    }
                }
            }

            async fn list_by_order<C>(
                &self,
                db: &C,
                order_id: i32,
            ) -> Result<Vec<$crate::models::ArticleLink>, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                $table::Entity::find()
                    .filter($table::Column::$owner_col.eq(order_id))
                    .order_by_asc($table::Column::Id)
                    .find_also_related($crate::entities::article::Entity)
                    .all(db)
                    .await?
                    .into_iter()
                    .map(|(model, article)| Self::link_from_model(model, article))
                    .collect()
            }

            async fn list_by_orders<C>(
                &self,
                db: &C,
                order_ids: &[i32],
            ) -> Result<Vec<(i32, $crate::models::ArticleLink)>, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                if order_ids.is_empty() {
                    return Ok(Vec::new());
                }
                $table::Entity::find()
                    .filter($table::Column::$owner_col.is_in(order_ids.to_vec()))
                    .order_by_asc($table::Column::Id)
                    .find_also_related($crate::entities::article::Entity)
                    .all(db)
                    .await?
                    .into_iter()
                    .map(|(model, article)| {
                        let order_id = model.$owner_field;
                        Self::link_from_model(model, article).map(|link| (order_id, link))
                    })
                    .collect()
            }

            async fn foreign_exists<C>(
                &self,
                db: &C,
                key: i32,
            ) -> Result<bool, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                self.articles.exists_by_id(db, key).await
            }

            async fn insert<C>(
                &self,
                db: &C,
                link: &$crate::models::ArticleLink,
                order_id: i32,
            ) -> Result<$crate::models::ArticleLink, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                if !self.foreign_exists(db, link.article.id).await? {
                    return Err($crate::errors::ServiceError::referential(
                        Self::FOREIGN,
                        link.article.id,
                    ));
                }
                $crate::repositories::link_store::ensure_positive(link)?;

                let stamp = now();
                let model = $table::ActiveModel {
                    $owner_field: Set(order_id),
                    article_id: Set(link.article.id),
                    quantite: Set(link.quantite),
                    $($col: Set(link.$col.clone()),)*
                    created_at: Set(format_timestamp(&link.created_at.unwrap_or(stamp))),
                    updated_at: Set(format_timestamp(&link.updated_at.unwrap_or(stamp))),
                    ..Default::default()
                }
                .insert(db)
                .await?;

                debug!(order_id, link_id = model.id, "{} inserted", $label);
                let mut stored = Self::link_from_model(model, None)?;
                stored.article.name = link.article.name.clone();
                Ok(stored)
            }

            async fn update<C>(
                &self,
                db: &C,
                link: &$crate::models::ArticleLink,
            ) -> Result<$crate::models::ArticleLink, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                $crate::repositories::link_store::ensure_positive(link)?;
                let id = link.id.ok_or_else(|| {
                    $crate::errors::ServiceError::NotFound(concat!($label, " without id").to_string())
                })?;
                let existing = $table::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .ok_or_else(|| $crate::errors::ServiceError::not_found($label, id))?;

                let mut active: $table::ActiveModel = existing.into();
                active.quantite = Set(link.quantite);
                $(active.$col = Set(link.$col.clone());)*
                active.updated_at = Set(format_timestamp(&now()));

                let mut stored = Self::link_from_model(active.update(db).await?, None)?;
                stored.article.name = link.article.name.clone();
                Ok(stored)
            }

            async fn delete<C>(&self, db: &C, link_id: i32) -> Result<(), $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                $table::Entity::delete_by_id(link_id).exec(db).await?;
                Ok(())
            }

            async fn delete_by_order<C>(
                &self,
                db: &C,
                order_id: i32,
            ) -> Result<u64, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                let result = $table::Entity::delete_many()
                    .filter($table::Column::$owner_col.eq(order_id))
                    .exec(db)
                    .await?;
                Ok(result.rows_affected)
            }
        }
    };
}

/// Location link repository over one association table; `columns` works as
/// for `article_link_repository!`.
macro_rules! local_link_repository {
    (
        $(#[$meta:meta])*
        $repo:ident {
            table: $table:ident,
            owner: $owner_field:ident / $owner_col:ident,
            label: $label:literal,
            columns: [$($col:ident),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $repo {
            locals: $crate::repositories::LocalRepository,
        }

        impl $repo {
            pub fn new(db: std::sync::Arc<sea_orm::DatabaseConnection>) -> Self {
                Self {
                    locals: $crate::repositories::LocalRepository::new(db),
                }
            }

            fn link_from_model(
                model: $table::Model,
                local: Option<$crate::entities::local::Model>,
            ) -> Result<$crate::models::LocalLink, $crate::errors::ServiceError> {
                Ok($crate::models::LocalLink {
                    id: Some(model.id),
                    local: $crate::models::EntityRef {
                        id: model.local_id,
                        name: local.map(|l| l.nom),
                    },
                    created_at: parse_optional_timestamp(Some(&model.created_at))?,
                    updated_at: parse_optional_timestamp(Some(&model.updated_at))?,
                    $($col: model.$col,)*
                    ..$crate::models::LocalLink::new(model.local_id)
                })
            }
        }

        #[async_trait::async_trait]
        impl $crate::repositories::LinkStore for $repo {
            type Link = $crate::models::LocalLink;
            const FOREIGN: &'static str = "Local";

            fn normalize(&self, link: $crate::models::LocalLink) -> $crate::models::LocalLink {
                $crate::models::LocalLink {
                    $($col: link.$col.clone(),)*
                    ..$crate::models::LocalLink { notes: None, ..link }
                }
            }

            async fn list_by_order<C>(
                &self,
                db: &C,
                order_id: i32,
            ) -> Result<Vec<$crate::models::LocalLink>, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                $table::Entity::find()
                    .filter($table::Column::$owner_col.eq(order_id))
                    .order_by_asc($table::Column::Id)
                    .find_also_related($crate::entities::local::Entity)
                    .all(db)
                    .await?
                    .into_iter()
                    .map(|(model, local)| Self::link_from_model(model, local))
                    .collect()
            }

            async fn list_by_orders<C>(
                &self,
                db: &C,
                order_ids: &[i32],
            ) -> Result<Vec<(i32, $crate::models::LocalLink)>, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                if order_ids.is_empty() {
                    return Ok(Vec::new());
                }
                $table::Entity::find()
                    .filter($table::Column::$owner_col.is_in(order_ids.to_vec()))
                    .order_by_asc($table::Column::Id)
                    .find_also_related($crate::entities::local::Entity)
                    .all(db)
                    .await?
                    .into_iter()
                    .map(|(model, local)| {
                        let order_id = model.$owner_field;
                        Self::link_from_model(model, local).map(|link| (order_id, link))
                    })
                    .collect()
            }

            async fn foreign_exists<C>(
                &self,
                db: &C,
                key: i32,
            ) -> Result<bool, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                self.locals.exists_by_id(db, key).await
            }

            async fn insert<C>(
                &self,
                db: &C,
                link: &$crate::models::LocalLink,
                order_id: i32,
            ) -> Result<$crate::models::LocalLink, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                if !self.foreign_exists(db, link.local.id).await? {
                    return Err($crate::errors::ServiceError::referential(
                        Self::FOREIGN,
                        link.local.id,
                    ));
                }

                let stamp = now();
                let model = $table::ActiveModel {
                    $owner_field: Set(order_id),
                    local_id: Set(link.local.id),
                    $($col: Set(link.$col.clone()),)*
                    created_at: Set(format_timestamp(&link.created_at.unwrap_or(stamp))),
                    updated_at: Set(format_timestamp(&link.updated_at.unwrap_or(stamp))),
                    ..Default::default()
                }
                .insert(db)
                .await?;

                debug!(order_id, link_id = model.id, "{} inserted", $label);
                let mut stored = Self::link_from_model(model, None)?;
                stored.local.name = link.local.name.clone();
                Ok(stored)
            }

            async fn update<C>(
                &self,
                db: &C,
                link: &$crate::models::LocalLink,
            ) -> Result<$crate::models::LocalLink, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                let id = link.id.ok_or_else(|| {
                    $crate::errors::ServiceError::NotFound(concat!($label, " without id").to_string())
                })?;
                let existing = $table::Entity::find_by_id(id)
                    .one(db)
                    .await?
                    .ok_or_else(|| $crate::errors::ServiceError::not_found($label, id))?;

                let mut active: $table::ActiveModel = existing.into();
                $(active.$col = Set(link.$col.clone());)*
                active.updated_at = Set(format_timestamp(&now()));

                let mut stored = Self::link_from_model(active.update(db).await?, None)?;
                stored.local.name = link.local.name.clone();
                Ok(stored)
            }

            async fn delete<C>(&self, db: &C, link_id: i32) -> Result<(), $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                $table::Entity::delete_by_id(link_id).exec(db).await?;
                Ok(())
            }

            async fn delete_by_order<C>(
                &self,
                db: &C,
                order_id: i32,
            ) -> Result<u64, $crate::errors::ServiceError>
            where
                C: sea_orm::ConnectionTrait,
            {
                let result = $table::Entity::delete_many()
                    .filter($table::Column::$owner_col.eq(order_id))
                    .exec(db)
                    .await?;
                Ok(result.rows_affected)
            }
        }
    };
}
