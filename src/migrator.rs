use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_reference_tables::Migration),
            Box::new(m20240101_000002_create_internal_order_tables::Migration),
            Box::new(m20240101_000003_create_external_order_tables::Migration),
            Box::new(m20240101_000004_create_stocks_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_reference_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Articles::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Articles::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Articles::Reference).string().not_null())
                        .col(ColumnDef::new(Articles::Nom).string().not_null())
                        .col(ColumnDef::new(Articles::Categorie).string().not_null())
                        .col(
                            ColumnDef::new(Articles::StockMinimal)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Articles::DatePeremption).string().null())
                        .col(
                            ColumnDef::new(Articles::EstCritique)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Articles::EstConsommable)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(ColumnDef::new(Articles::CreatedAt).string().not_null())
                        .col(ColumnDef::new(Articles::UpdatedAt).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_articles_reference")
                        .table(Articles::Table)
                        .col(Articles::Reference)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Locals::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Locals::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Locals::Nom).string().not_null())
                        .col(ColumnDef::new(Locals::Emplacement).string().not_null())
                        .col(ColumnDef::new(Locals::Type).string().not_null())
                        .col(ColumnDef::new(Locals::ConsommateurId).integer().null())
                        .col(ColumnDef::new(Locals::CreatedAt).string().not_null())
                        .col(ColumnDef::new(Locals::UpdatedAt).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_locals_consommateur_id")
                        .table(Locals::Table)
                        .col(Locals::ConsommateurId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Fournisseurs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Fournisseurs::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Fournisseurs::Nom).string().not_null())
                        .col(ColumnDef::new(Fournisseurs::Adresse).string().null())
                        .col(ColumnDef::new(Fournisseurs::Email).string().null())
                        .col(ColumnDef::new(Fournisseurs::Telephone).string().null())
                        .col(ColumnDef::new(Fournisseurs::CreatedAt).string().not_null())
                        .col(ColumnDef::new(Fournisseurs::UpdatedAt).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Consommateurs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Consommateurs::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Consommateurs::Nom).string().not_null())
                        .col(ColumnDef::new(Consommateurs::Prenom).string().null())
                        .col(ColumnDef::new(Consommateurs::Email).string().null())
                        .col(ColumnDef::new(Consommateurs::Telephone).string().null())
                        .col(ColumnDef::new(Consommateurs::CreatedAt).string().not_null())
                        .col(ColumnDef::new(Consommateurs::UpdatedAt).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Magasiniers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Magasiniers::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Magasiniers::Nom).string().not_null())
                        .col(ColumnDef::new(Magasiniers::Prenom).string().null())
                        .col(ColumnDef::new(Magasiniers::Email).string().null())
                        .col(ColumnDef::new(Magasiniers::Telephone).string().null())
                        .col(ColumnDef::new(Magasiniers::CreatedAt).string().not_null())
                        .col(ColumnDef::new(Magasiniers::UpdatedAt).string().not_null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Magasiniers::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Consommateurs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Fournisseurs::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Locals::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Articles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Articles {
        Table,
        Id,
        Reference,
        Nom,
        Categorie,
        StockMinimal,
        DatePeremption,
        EstCritique,
        EstConsommable,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum Locals {
        Table,
        Id,
        Nom,
        Emplacement,
        Type,
        ConsommateurId,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Fournisseurs {
        Table,
        Id,
        Nom,
        Adresse,
        Email,
        Telephone,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Consommateurs {
        Table,
        Id,
        Nom,
        Prenom,
        Email,
        Telephone,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Magasiniers {
        Table,
        Id,
        Nom,
        Prenom,
        Email,
        Telephone,
        CreatedAt,
        UpdatedAt,
    }
}

/// Internal and external orders share one table layout; only the table
/// prefix and the optional text columns of the link tables differ.
mod order_tables {

    use sea_orm_migration::prelude::*;

    pub struct Layout {
        pub prefix: &'static str,
        pub article_etat: bool,
        pub local_notes: bool,
    }

    impl Layout {
        fn headers(&self) -> Alias {
            Alias::new(format!("{}_orders", self.prefix))
        }

        fn articles(&self) -> Alias {
            Alias::new(format!("{}_order_articles", self.prefix))
        }

        fn locals(&self) -> Alias {
            Alias::new(format!("{}_order_locals", self.prefix))
        }

        fn parent_column(&self) -> Alias {
            Alias::new(format!("{}_order_id", self.prefix))
        }
    }

    fn id_column() -> ColumnDef {
        ColumnDef::new(Alias::new("id"))
            .integer()
            .not_null()
            .auto_increment()
            .primary_key()
            .to_owned()
    }

    fn text(name: &str, nullable: bool) -> ColumnDef {
        let mut col = ColumnDef::new(Alias::new(name));
        col.string();
        if nullable {
            col.null();
        } else {
            col.not_null();
        }
        col.to_owned()
    }

    fn integer(name: &str, nullable: bool) -> ColumnDef {
        let mut col = ColumnDef::new(Alias::new(name));
        col.integer();
        if nullable {
            col.null();
        } else {
            col.not_null();
        }
        col.to_owned()
    }

    pub async fn create(manager: &SchemaManager<'_>, layout: &Layout) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(layout.headers())
                    .if_not_exists()
                    .col(&mut id_column())
                    .col(&mut text("created_at", false))
                    .col(&mut text("confirmed_at", true))
                    .col(&mut text("updated_at", false))
                    .col(&mut text("statut", false))
                    .col(&mut integer("actor_id", false))
                    .col(&mut integer("counterparty_id", true))
                    .col(&mut integer("local_id", true))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(format!("idx_{}_orders_statut", layout.prefix))
                    .table(layout.headers())
                    .col(Alias::new("statut"))
                    .to_owned(),
            )
            .await?;

        let mut articles = Table::create();
        articles
            .table(layout.articles())
            .if_not_exists()
            .col(&mut id_column())
            .col(&mut integer(&format!("{}_order_id", layout.prefix), false))
            .col(&mut integer("article_id", false))
            .col(&mut integer("quantite", false));
        if layout.article_etat {
            articles.col(&mut text("etat", true));
        }
        articles
            .col(&mut text("notes", true))
            .col(&mut text("created_at", false))
            .col(&mut text("updated_at", false));
        manager.create_table(articles.to_owned()).await?;

        // At most one link per (order, article)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(format!("uq_{}_order_articles_order_article", layout.prefix))
                    .table(layout.articles())
                    .col(layout.parent_column())
                    .col(Alias::new("article_id"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        let mut locals = Table::create();
        locals
            .table(layout.locals())
            .if_not_exists()
            .col(&mut id_column())
            .col(&mut integer(&format!("{}_order_id", layout.prefix), false))
            .col(&mut integer("local_id", false));
        if layout.local_notes {
            locals.col(&mut text("notes", true));
        }
        locals
            .col(&mut text("created_at", false))
            .col(&mut text("updated_at", false));
        manager.create_table(locals.to_owned()).await?;

        // At most one link per (order, local)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(format!("uq_{}_order_locals_order_local", layout.prefix))
                    .table(layout.locals())
                    .col(layout.parent_column())
                    .col(Alias::new("local_id"))
                    .unique()
                    .to_owned(),
            )
            .await
    }

    pub async fn drop(manager: &SchemaManager<'_>, layout: &Layout) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(layout.locals()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(layout.articles()).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(layout.headers()).to_owned())
            .await
    }
}

mod m20240101_000002_create_internal_order_tables {

    use super::order_tables::{self, Layout};
    use sea_orm_migration::prelude::*;

    const LAYOUT: Layout = Layout {
        prefix: "internal",
        article_etat: true,
        local_notes: true,
    };

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_internal_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            order_tables::create(manager, &LAYOUT).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            order_tables::drop(manager, &LAYOUT).await
        }
    }
}

mod m20240101_000003_create_external_order_tables {

    use super::order_tables::{self, Layout};
    use sea_orm_migration::prelude::*;

    const LAYOUT: Layout = Layout {
        prefix: "external",
        article_etat: false,
        local_notes: false,
    };

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_external_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            order_tables::create(manager, &LAYOUT).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            order_tables::drop(manager, &LAYOUT).await
        }
    }
}

mod m20240101_000004_create_stocks_table {

    use super::m20240101_000001_create_reference_tables::{Articles, Locals};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_stocks_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Stocks::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Stocks::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Stocks::ArticleId).integer().not_null())
                        .col(ColumnDef::new(Stocks::LocalId).integer().not_null())
                        .col(
                            ColumnDef::new(Stocks::Quantite)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Stocks::UpdatedAt).string().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stocks_article_id")
                                .from(Stocks::Table, Stocks::ArticleId)
                                .to(Articles::Table, Articles::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stocks_local_id")
                                .from(Stocks::Table, Stocks::LocalId)
                                .to(Locals::Table, Locals::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("uq_stocks_article_local")
                        .table(Stocks::Table)
                        .col(Stocks::ArticleId)
                        .col(Stocks::LocalId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Stocks::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Stocks {
        Table,
        Id,
        ArticleId,
        LocalId,
        Quantite,
        UpdatedAt,
    }
}
