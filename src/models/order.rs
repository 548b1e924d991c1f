use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::link::{ArticleLink, LocalLink};
use super::reference::EntityRef;
use crate::errors::ServiceError;

/// Lifecycle status of an order.
///
/// `EnAttente` is the initial state. `Annulee` and `Livree` are terminal.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
pub enum OrderStatus {
    #[default]
    EnAttente,
    /// Stored as `Confirmee`; internal orders historically wrote `Validee`.
    #[strum(to_string = "Confirmee", serialize = "Validee")]
    #[serde(alias = "Validee")]
    Confirmee,
    Annulee,
    Livree,
}

impl OrderStatus {
    /// Whether an order currently in `self` may be saved with status `next`.
    /// Keeping the same status is always allowed.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        match (self, next) {
            (from, to) if from == to => true,
            (EnAttente, Confirmee) | (EnAttente, Annulee) => true,
            (Confirmee, Livree) => true,
            _ => false,
        }
    }

    pub fn ensure_transition(self, next: OrderStatus) -> Result<(), ServiceError> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(ServiceError::InvalidState {
                from: self,
                to: next,
            })
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Annulee | OrderStatus::Livree)
    }

    /// Orders whose links count as actual stock movement
    pub fn counts_toward_inventory(self) -> bool {
        matches!(self, OrderStatus::Confirmee | OrderStatus::Livree)
    }

    /// Every `statut` spelling stored for this status
    pub fn stored_forms(self) -> &'static [&'static str] {
        match self {
            OrderStatus::EnAttente => &["EnAttente"],
            OrderStatus::Confirmee => &["Confirmee", "Validee"],
            OrderStatus::Annulee => &["Annulee"],
            OrderStatus::Livree => &["Livree"],
        }
    }

    /// Parses a persisted `statut` column value
    pub fn from_column(value: &str) -> Result<Self, ServiceError> {
        OrderStatus::from_str(value.trim())
            .map_err(|_| ServiceError::InternalError(format!("Unknown order status '{}'", value)))
    }
}

/// Which of the two order aggregates a value belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum OrderKind {
    /// Stock movement to an internal consumer
    Internal,
    /// Procurement from a supplier
    External,
}

impl OrderKind {
    /// Entity name of the counterparty this kind references
    pub fn counterparty_entity(self) -> &'static str {
        match self {
            OrderKind::Internal => "Consommateur",
            OrderKind::External => "Fournisseur",
        }
    }
}

/// Persisted header row of an order, without its link collections
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderHeader {
    pub id: Option<i32>,
    pub statut: OrderStatus,
    pub created_at: NaiveDateTime,
    pub confirmed_at: Option<NaiveDateTime>,
    pub updated_at: NaiveDateTime,
    pub actor_id: i32,
    pub counterparty_id: Option<i32>,
    pub local_id: Option<i32>,
}

/// Order aggregate: header plus the article and location links it owns.
///
/// The same shape serves internal orders (counterparty is a Consommateur,
/// article links carry `etat`, location links carry `notes`) and external
/// orders (counterparty is a Fournisseur).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<i32>,
    pub statut: OrderStatus,
    pub creer_a: Option<NaiveDateTime>,
    pub confirmer_a: Option<NaiveDateTime>,
    pub mise_a_jour_a: Option<NaiveDateTime>,
    /// Magasinier who performed the order
    pub actor: EntityRef,
    pub counterparty: Option<EntityRef>,
    pub local: Option<EntityRef>,
    pub articles: Vec<ArticleLink>,
    pub locals: Vec<LocalLink>,
}

impl Order {
    /// New, not yet persisted order in `EnAttente`
    pub fn new(actor_id: i32) -> Self {
        Self {
            id: None,
            statut: OrderStatus::EnAttente,
            creer_a: None,
            confirmer_a: None,
            mise_a_jour_a: None,
            actor: EntityRef::new(actor_id),
            counterparty: None,
            local: None,
            articles: Vec::new(),
            locals: Vec::new(),
        }
    }

    pub fn with_counterparty(mut self, id: i32) -> Self {
        self.counterparty = Some(EntityRef::new(id));
        self
    }

    pub fn with_local(mut self, id: i32) -> Self {
        self.local = Some(EntityRef::new(id));
        self
    }

    pub fn with_article(mut self, link: ArticleLink) -> Self {
        self.articles.push(link);
        self
    }

    pub fn with_location(mut self, link: LocalLink) -> Self {
        self.locals.push(link);
        self
    }

    /// Sum of the quantities over all article links
    pub fn total_quantite(&self) -> i64 {
        self.articles.iter().map(|l| i64::from(l.quantite)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;
    use OrderStatus::*;

    #[test]
    fn pending_order_can_be_confirmed_or_cancelled() {
        assert!(EnAttente.can_transition_to(Confirmee));
        assert!(EnAttente.can_transition_to(Annulee));
    }

    #[test]
    fn cancelled_order_cannot_be_confirmed() {
        let err = Annulee.ensure_transition(Confirmee).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidState {
                from: Annulee,
                to: Confirmee
            }
        ));
    }

    #[test]
    fn confirmed_order_cannot_go_back_to_pending() {
        assert!(!Confirmee.can_transition_to(EnAttente));
        assert!(Confirmee.can_transition_to(Livree));
        assert!(!Confirmee.can_transition_to(Annulee));
    }

    #[test]
    fn terminal_states_only_allow_themselves() {
        for terminal in OrderStatus::iter().filter(|s| s.is_terminal()) {
            for next in OrderStatus::iter() {
                assert_eq!(terminal.can_transition_to(next), terminal == next);
            }
        }
    }

    #[test]
    fn status_column_round_trip_and_alias() {
        for status in OrderStatus::iter() {
            assert_eq!(OrderStatus::from_column(status.as_ref()).unwrap(), status);
        }
        assert_eq!(OrderStatus::from_column("Validee").unwrap(), Confirmee);
        assert!(OrderStatus::from_column("Shipped").is_err());
        for status in OrderStatus::iter() {
            for form in status.stored_forms() {
                assert_eq!(OrderStatus::from_column(form).unwrap(), status);
            }
        }
    }

    #[test]
    fn only_confirmed_or_delivered_count_toward_inventory() {
        let counted: Vec<_> = OrderStatus::iter()
            .filter(|s| s.counts_toward_inventory())
            .collect();
        assert_eq!(counted, vec![Confirmee, Livree]);
    }

    #[test]
    fn builder_collects_links() {
        let order = Order::new(1)
            .with_counterparty(2)
            .with_article(ArticleLink::new(10, 4))
            .with_article(ArticleLink::new(11, 6));
        assert_eq!(order.statut, EnAttente);
        assert_eq!(order.total_quantite(), 10);
        assert_eq!(order.counterparty.as_ref().map(|c| c.id), Some(2));
    }
}
