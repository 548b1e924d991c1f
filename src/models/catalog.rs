//! Reference entities the order aggregates point to.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::reference::EntityRef;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Article {
    pub id: Option<i32>,
    /// Unique business code
    #[validate(length(min = 1, max = 64))]
    pub reference: String,
    #[validate(length(min = 1))]
    pub nom: String,
    pub categorie: String,
    #[validate(range(min = 0))]
    pub stock_minimal: i32,
    pub date_peremption: Option<NaiveDateTime>,
    pub est_critique: bool,
    pub est_consommable: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Article {
    pub fn new(reference: impl Into<String>, nom: impl Into<String>) -> Self {
        Self {
            id: None,
            reference: reference.into(),
            nom: nom.into(),
            categorie: String::new(),
            stock_minimal: 0,
            date_peremption: None,
            est_critique: false,
            est_consommable: false,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_expired_at(&self, at: NaiveDateTime) -> bool {
        self.date_peremption.map(|d| d <= at).unwrap_or(false)
    }
}

/// Storage location
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Local {
    pub id: Option<i32>,
    #[validate(length(min = 1))]
    pub nom: String,
    pub emplacement: String,
    pub kind: String,
    /// Weak reference: a location may exist without a consumer
    pub consommateur: Option<EntityRef>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Local {
    pub fn new(nom: impl Into<String>, emplacement: impl Into<String>) -> Self {
        Self {
            id: None,
            nom: nom.into(),
            emplacement: emplacement.into(),
            kind: String::new(),
            consommateur: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Supplier
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Fournisseur {
    pub id: Option<i32>,
    #[validate(length(min = 1))]
    pub nom: String,
    pub adresse: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Person, shared shape of consumers and storekeepers
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Person {
    pub id: Option<i32>,
    #[validate(length(min = 1))]
    pub nom: String,
    pub prenom: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub telephone: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Person {
    pub fn new(nom: impl Into<String>) -> Self {
        Self {
            id: None,
            nom: nom.into(),
            prenom: None,
            email: None,
            telephone: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn full_name(&self) -> String {
        match &self.prenom {
            Some(prenom) if !prenom.trim().is_empty() => format!("{} {}", prenom, self.nom),
            _ => self.nom.clone(),
        }
    }
}

/// Internal consumer receiving stock
pub type Consommateur = Person;

/// Storekeeper recorded as the actor of an order
pub type Magasinier = Person;

impl Fournisseur {
    pub fn new(nom: impl Into<String>) -> Self {
        Self {
            id: None,
            nom: nom.into(),
            adresse: None,
            email: None,
            telephone: None,
            created_at: None,
            updated_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn negative_minimal_stock_is_invalid() {
        let mut article = Article::new("VIS-M6", "Vis M6");
        assert!(article.validate().is_ok());
        article.stock_minimal = -1;
        let errors = article.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("stock_minimal"));
    }

    #[test]
    fn malformed_email_is_invalid() {
        let mut fournisseur = Fournisseur::new("Acme");
        fournisseur.email = Some("not-an-email".into());
        assert!(fournisseur.validate().is_err());
        fournisseur.email = Some("ventes@acme.fr".into());
        assert!(fournisseur.validate().is_ok());
    }

    #[test]
    fn full_name_prefers_first_name() {
        let mut person = Person::new("Benali");
        assert_eq!(person.full_name(), "Benali");
        person.prenom = Some("Sara".into());
        assert_eq!(person.full_name(), "Sara Benali");
    }

    #[test]
    fn expiry_is_inclusive() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 31)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap();
        let mut article = Article::new("LAIT-1", "Lait");
        assert!(!article.is_expired_at(day));
        article.date_peremption = Some(day);
        assert!(article.is_expired_at(day));
    }
}
