#![allow(dead_code)]

use std::sync::Arc;

use magasin::{
    db::{self, DbConfig, DbPool},
    models::{Article, Fournisseur, Local, Person},
    repositories::{
        ArticleRepository, ConsommateurRepository, FournisseurRepository, LocalRepository,
        MagasinierRepository,
    },
};

/// In-memory database with one of each party plus a few articles and locations.
pub struct TestStore {
    pub db: Arc<DbPool>,
    pub magasinier: i32,
    pub consommateur: i32,
    pub fournisseur: i32,
    /// Gants, Masques, Savon
    pub articles: Vec<i32>,
    /// Reserve A, Reserve B
    pub locals: Vec<i32>,
}

impl TestStore {
    pub async fn new() -> Self {
        let pool = db::establish_connection_with_config(&DbConfig::in_memory())
            .await
            .expect("in-memory sqlite");
        db::run_migrations(&pool).await.expect("migrations");
        let db = Arc::new(pool);

        let mut magasinier = Person::new("Haddad");
        magasinier.prenom = Some("Karim".into());
        let magasinier = MagasinierRepository::new(db.clone())
            .insert(&magasinier)
            .await
            .expect("magasinier");
        let consommateur = ConsommateurRepository::new(db.clone())
            .insert(&Person::new("Service Pediatrie"))
            .await
            .expect("consommateur");
        let fournisseur = FournisseurRepository::new(db.clone())
            .insert(&Fournisseur::new("MedSupply"))
            .await
            .expect("fournisseur");

        let article_repo = ArticleRepository::new(db.clone());
        let mut articles = Vec::new();
        for (reference, nom) in [("GN-01", "Gants"), ("MS-01", "Masques"), ("SV-01", "Savon")] {
            let article = article_repo
                .insert(&Article::new(reference, nom))
                .await
                .expect("article");
            articles.push(article.id.expect("article id"));
        }

        let local_repo = LocalRepository::new(db.clone());
        let mut locals = Vec::new();
        for nom in ["Reserve A", "Reserve B"] {
            let local = local_repo
                .insert(&Local::new(nom, "Batiment 1"))
                .await
                .expect("local");
            locals.push(local.id.expect("local id"));
        }

        Self {
            db,
            magasinier: magasinier.id.expect("magasinier id"),
            consommateur: consommateur.id.expect("consommateur id"),
            fournisseur: fournisseur.id.expect("fournisseur id"),
            articles,
            locals,
        }
    }
}
