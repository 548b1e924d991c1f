use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::reference::EntityRef;

/// Association row owned by an order, identified within that order by the id
/// of the foreign entity it points to.
pub trait Link: Clone + Send + Sync + 'static {
    /// Row id, `None` until persisted
    fn id(&self) -> Option<i32>;

    /// Id of the referenced article or location
    fn key(&self) -> i32;

    /// Copies the caller-editable fields of `desired` onto `self`
    fn absorb(&mut self, desired: &Self);

    /// Whether the caller-editable fields of both links are equal
    fn same_content(&self, other: &Self) -> bool;
}

/// "Order contains article X with quantity Q"
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleLink {
    pub id: Option<i32>,
    pub article: EntityRef,
    pub quantite: i32,
    /// Free-text condition, internal orders only
    pub etat: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl ArticleLink {
    pub fn new(article_id: i32, quantite: i32) -> Self {
        Self {
            id: None,
            article: EntityRef::new(article_id),
            quantite,
            etat: None,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_etat(mut self, etat: impl Into<String>) -> Self {
        self.etat = Some(etat.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Link for ArticleLink {
    fn id(&self) -> Option<i32> {
        self.id
    }

    fn key(&self) -> i32 {
        self.article.id
    }

    fn absorb(&mut self, desired: &Self) {
        self.quantite = desired.quantite;
        self.etat = desired.etat.clone();
        self.notes = desired.notes.clone();
    }

    fn same_content(&self, other: &Self) -> bool {
        self.quantite == other.quantite && self.etat == other.etat && self.notes == other.notes
    }
}

/// "Order touches location L"
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalLink {
    pub id: Option<i32>,
    pub local: EntityRef,
    /// Internal orders only
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl LocalLink {
    pub fn new(local_id: i32) -> Self {
        Self {
            id: None,
            local: EntityRef::new(local_id),
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Link for LocalLink {
    fn id(&self) -> Option<i32> {
        self.id
    }

    fn key(&self) -> i32 {
        self.local.id
    }

    fn absorb(&mut self, desired: &Self) {
        self.notes = desired.notes.clone();
    }

    fn same_content(&self, other: &Self) -> bool {
        self.notes == other.notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absorb_keeps_identity_and_takes_editable_fields() {
        let mut stored = ArticleLink::new(7, 2);
        stored.id = Some(31);
        let desired = ArticleLink::new(7, 9).with_etat("abime").with_notes("carton ouvert");

        assert!(!stored.same_content(&desired));
        stored.absorb(&desired);

        assert_eq!(stored.id, Some(31));
        assert_eq!(stored.key(), 7);
        assert!(stored.same_content(&desired));
    }

    #[test]
    fn local_link_content_is_its_notes() {
        let a = LocalLink::new(3).with_notes("quai B");
        let b = LocalLink::new(3);
        assert!(!a.same_content(&b));
        assert!(a.same_content(&a.clone()));
    }
}
