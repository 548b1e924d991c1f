//! Save/delete/read paths of the order aggregate stores against SQLite.

mod common;

use assert_matches::assert_matches;
use common::TestStore;
use magasin::{
    errors::ServiceError,
    models::{ArticleLink, LocalLink, Order, OrderStatus},
    repositories::{
        ExternalArticleLinkRepository, InternalArticleLinkRepository, InternalLocalLinkRepository,
        LinkStore, StockLedger, StockRepository,
    },
    services::{ExternalOrderStore, InternalOrderStore, Reconciler},
};
use rstest::rstest;
use sea_orm::DatabaseTransaction;
use std::sync::Arc;

fn quantities(order: &Order) -> Vec<(i32, i32)> {
    order
        .articles
        .iter()
        .map(|l| (l.article.id, l.quantite))
        .collect()
}

#[tokio::test]
async fn create_returns_hydrated_aggregate() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let order = Order::new(t.magasinier)
        .with_counterparty(t.consommateur)
        .with_article(ArticleLink::new(t.articles[0], 2).with_etat("neuf"))
        .with_location(LocalLink::new(t.locals[0]).with_notes("etagere 3"));

    let saved = store.save(&order).await.unwrap();

    assert!(saved.id.is_some());
    assert_eq!(saved.statut, OrderStatus::EnAttente);
    assert!(saved.creer_a.is_some());
    assert!(saved.confirmer_a.is_none());
    assert_eq!(saved.actor.name.as_deref(), Some("Karim Haddad"));
    assert_eq!(
        saved.counterparty.as_ref().and_then(|c| c.name.as_deref()),
        Some("Service Pediatrie")
    );
    assert_eq!(saved.articles.len(), 1);
    assert_eq!(saved.articles[0].article.name.as_deref(), Some("Gants"));
    assert_eq!(saved.articles[0].etat.as_deref(), Some("neuf"));
    assert_eq!(saved.locals[0].local.name.as_deref(), Some("Reserve A"));
    assert_eq!(saved.locals[0].notes.as_deref(), Some("etagere 3"));

    let all = store.get_all().await.unwrap();
    assert_eq!(all, vec![saved]);
}

#[tokio::test]
async fn saving_same_state_twice_touches_nothing() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let order = Order::new(t.magasinier)
        .with_article(ArticleLink::new(t.articles[0], 2))
        .with_article(ArticleLink::new(t.articles[1], 5))
        .with_location(LocalLink::new(t.locals[0]));
    let first = store.save(&order).await.unwrap();
    let second = store.save(&first).await.unwrap();

    assert_eq!(first.articles, second.articles);
    assert_eq!(first.locals, second.locals);
}

#[tokio::test]
async fn reconciliation_updates_in_place_and_removes_dropped_links() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());
    let (a, b, c) = (t.articles[0], t.articles[1], t.articles[2]);

    let saved = store
        .save(
            &Order::new(t.magasinier)
                .with_article(ArticleLink::new(a, 2))
                .with_article(ArticleLink::new(b, 5)),
        )
        .await
        .unwrap();
    let a_row = saved.articles.iter().find(|l| l.article.id == a).unwrap().id;
    let b_row = saved.articles.iter().find(|l| l.article.id == b).unwrap().id;

    let mut edited = saved.clone();
    edited.articles = vec![ArticleLink::new(b, 5), ArticleLink::new(c, 1)];
    let after = store.save(&edited).await.unwrap();

    assert_eq!(quantities(&after), vec![(b, 5), (c, 1)]);
    let b_after = after.articles.iter().find(|l| l.article.id == b).unwrap();
    assert_eq!(b_after.id, b_row);
    assert!(after.articles.iter().all(|l| l.id != a_row));
}

#[tokio::test]
async fn changed_quantity_keeps_row_identity() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let saved = store
        .save(&Order::new(t.magasinier).with_article(ArticleLink::new(t.articles[0], 2)))
        .await
        .unwrap();
    let mut edited = saved.clone();
    edited.articles[0].quantite = 8;
    let after = store.save(&edited).await.unwrap();

    assert_eq!(after.articles[0].id, saved.articles[0].id);
    assert_eq!(after.articles[0].created_at, saved.articles[0].created_at);
    assert_eq!(after.articles[0].quantite, 8);
}

#[tokio::test]
async fn unknown_article_rolls_back_the_whole_save() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let saved = store
        .save(&Order::new(t.magasinier).with_article(ArticleLink::new(t.articles[0], 2)))
        .await
        .unwrap();

    let mut edited = saved.clone();
    edited.statut = OrderStatus::Confirmee;
    edited.articles = vec![ArticleLink::new(t.articles[1], 1), ArticleLink::new(999, 4)];
    let err = store.save(&edited).await.unwrap_err();

    assert_matches!(err, ServiceError::ReferentialError { entity: "Article", id: 999 });
    let reloaded = store.get_by_id(saved.id.unwrap()).await.unwrap();
    assert_eq!(reloaded, saved);
}

#[tokio::test]
async fn unknown_location_rolls_back_a_create() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let order = Order::new(t.magasinier)
        .with_article(ArticleLink::new(t.articles[0], 2))
        .with_location(LocalLink::new(404));
    let err = store.save(&order).await.unwrap_err();

    assert_matches!(err, ServiceError::ReferentialError { entity: "Local", id: 404 });
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_actor_or_counterparty_is_rejected() {
    let t = TestStore::new().await;
    let internal = InternalOrderStore::internal(t.db.clone());
    let external = ExternalOrderStore::external(t.db.clone());

    let err = internal.save(&Order::new(77)).await.unwrap_err();
    assert_matches!(err, ServiceError::ReferentialError { entity: "Magasinier", id: 77 });

    let err = external
        .save(&Order::new(t.magasinier).with_counterparty(t.fournisseur + 100))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ReferentialError { entity: "Fournisseur", .. });

    assert!(internal.get_all().await.unwrap().is_empty());
    assert!(external.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_article_is_stored_once_with_last_quantity() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let order = Order::new(t.magasinier)
        .with_article(ArticleLink::new(t.articles[0], 1))
        .with_article(ArticleLink::new(t.articles[0], 6));
    let saved = store.save(&order).await.unwrap();

    assert_eq!(quantities(&saved), vec![(t.articles[0], 6)]);
}

#[tokio::test]
async fn non_positive_quantity_is_rejected() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let err = store
        .save(&Order::new(t.magasinier).with_article(ArticleLink::new(t.articles[0], 0)))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
    assert!(store.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_cascades_to_links() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());
    let articles = InternalArticleLinkRepository::new(t.db.clone());
    let locals = InternalLocalLinkRepository::new(t.db.clone());

    let saved = store
        .save(
            &Order::new(t.magasinier)
                .with_article(ArticleLink::new(t.articles[0], 2))
                .with_location(LocalLink::new(t.locals[1])),
        )
        .await
        .unwrap();
    let id = saved.id.unwrap();

    store.delete(id).await.unwrap();

    assert!(articles.list_by_order(&*t.db, id).await.unwrap().is_empty());
    assert!(locals.list_by_order(&*t.db, id).await.unwrap().is_empty());
    assert_matches!(store.get_by_id(id).await, Err(ServiceError::NotFound(_)));
    assert_matches!(store.delete(id).await, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn updating_a_missing_order_is_not_found() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let mut order = Order::new(t.magasinier);
    order.id = Some(321);
    assert_matches!(store.save(&order).await, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn orders_are_created_pending() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let mut order = Order::new(t.magasinier);
    order.statut = OrderStatus::Confirmee;
    assert_matches!(store.save(&order).await, Err(ServiceError::ValidationError(_)));
}

#[rstest]
#[case::confirm(OrderStatus::EnAttente, OrderStatus::Confirmee, true)]
#[case::cancel(OrderStatus::EnAttente, OrderStatus::Annulee, true)]
#[case::deliver(OrderStatus::Confirmee, OrderStatus::Livree, true)]
#[case::keep(OrderStatus::Annulee, OrderStatus::Annulee, true)]
#[case::revive_cancelled(OrderStatus::Annulee, OrderStatus::Confirmee, false)]
#[case::back_to_pending(OrderStatus::Confirmee, OrderStatus::EnAttente, false)]
#[case::cancel_confirmed(OrderStatus::Confirmee, OrderStatus::Annulee, false)]
#[case::skip_confirmation(OrderStatus::EnAttente, OrderStatus::Livree, false)]
#[tokio::test]
async fn status_transitions(
    #[case] from: OrderStatus,
    #[case] to: OrderStatus,
    #[case] allowed: bool,
) {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let saved = store.save(&Order::new(t.magasinier)).await.unwrap();
    let id = saved.id.unwrap();
    if from != OrderStatus::EnAttente {
        if from == OrderStatus::Livree || from == OrderStatus::Confirmee {
            store.transition(id, OrderStatus::Confirmee).await.unwrap();
        }
        if from != OrderStatus::Confirmee {
            store.transition(id, from).await.unwrap();
        }
    }

    let result = store.transition(id, to).await;
    if allowed {
        assert_eq!(result.unwrap().statut, to);
    } else {
        assert_matches!(
            result,
            Err(ServiceError::InvalidState { from: got_from, to: got_to }) if got_from == from && got_to == to
        );
        assert_eq!(store.get_by_id(id).await.unwrap().statut, from);
    }
}

#[tokio::test]
async fn confirmation_stamps_date_once() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let saved = store.save(&Order::new(t.magasinier)).await.unwrap();
    let confirmed = store
        .transition(saved.id.unwrap(), OrderStatus::Confirmee)
        .await
        .unwrap();
    assert!(confirmed.confirmer_a.is_some());

    let delivered = store
        .transition(saved.id.unwrap(), OrderStatus::Livree)
        .await
        .unwrap();
    assert_eq!(delivered.confirmer_a, confirmed.confirmer_a);
}

#[tokio::test]
async fn confirming_external_order_credits_its_local() {
    let t = TestStore::new().await;
    let store = ExternalOrderStore::external(t.db.clone());
    let stock = StockRepository::new(t.db.clone());
    let (gants, reserve) = (t.articles[0], t.locals[0]);

    let saved = store
        .save(
            &Order::new(t.magasinier)
                .with_counterparty(t.fournisseur)
                .with_local(reserve)
                .with_article(ArticleLink::new(gants, 10)),
        )
        .await
        .unwrap();
    assert_eq!(stock.level(gants, reserve).await.unwrap(), 0);

    let id = saved.id.unwrap();
    store.transition(id, OrderStatus::Confirmee).await.unwrap();
    assert_eq!(stock.level(gants, reserve).await.unwrap(), 10);

    // staying confirmed or moving on does not credit again
    store.transition(id, OrderStatus::Confirmee).await.unwrap();
    store.transition(id, OrderStatus::Livree).await.unwrap();
    assert_eq!(stock.level(gants, reserve).await.unwrap(), 10);
    assert_eq!(stock.list_for_local(reserve).await.unwrap().len(), 1);
}

#[tokio::test]
async fn external_links_ignore_internal_only_fields() {
    let t = TestStore::new().await;
    let store = ExternalOrderStore::external(t.db.clone());

    let order = Order::new(t.magasinier)
        .with_article(ArticleLink::new(t.articles[0], 3).with_etat("abime"))
        .with_location(LocalLink::new(t.locals[0]).with_notes("quai"));
    let first = store.save(&order).await.unwrap();
    assert_eq!(first.articles[0].etat, None);
    assert_eq!(first.locals[0].notes, None);

    let mut again = order.clone();
    again.id = first.id;
    let second = store.save(&again).await.unwrap();
    assert_eq!(second.articles, first.articles);
}

#[tokio::test]
async fn external_article_notes_are_editable() {
    let t = TestStore::new().await;
    let store = ExternalOrderStore::external(t.db.clone());

    let saved = store
        .save(
            &Order::new(t.magasinier)
                .with_counterparty(t.fournisseur)
                .with_article(ArticleLink::new(t.articles[0], 3).with_notes("first")),
        )
        .await
        .unwrap();
    assert_eq!(saved.articles[0].notes.as_deref(), Some("first"));

    let mut edited = saved.clone();
    edited.articles[0].notes = Some("second".into());
    let after = store.save(&edited).await.unwrap();

    assert_eq!(after.articles[0].id, saved.articles[0].id);
    assert_eq!(after.articles[0].notes.as_deref(), Some("second"));
    assert_eq!(after.articles[0].quantite, 3);

    let outcome = Reconciler::sync(
        &ExternalArticleLinkRepository::new(t.db.clone()),
        &*t.db,
        after.id.unwrap(),
        &after.articles,
    )
    .await
    .unwrap();
    assert!(!outcome.touched(), "{outcome:?}");
}

#[tokio::test]
async fn internal_article_condition_and_notes_edit_in_place() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let saved = store
        .save(&Order::new(t.magasinier).with_article(ArticleLink::new(t.articles[1], 4)))
        .await
        .unwrap();

    let mut edited = saved.clone();
    edited.articles[0].etat = Some("abime".into());
    edited.articles[0].notes = Some("carton ouvert".into());
    let after = store.save(&edited).await.unwrap();

    let link = &after.articles[0];
    assert_eq!(link.id, saved.articles[0].id);
    assert_eq!(link.etat.as_deref(), Some("abime"));
    assert_eq!(link.notes.as_deref(), Some("carton ouvert"));
    assert_eq!(link.quantite, 4);

    let outcome = Reconciler::sync(
        &InternalArticleLinkRepository::new(t.db.clone()),
        &*t.db,
        after.id.unwrap(),
        &after.articles,
    )
    .await
    .unwrap();
    assert!(!outcome.touched(), "{outcome:?}");
}

#[tokio::test]
async fn internal_location_notes_edit_in_place() {
    let t = TestStore::new().await;
    let store = InternalOrderStore::internal(t.db.clone());

    let saved = store
        .save(
            &Order::new(t.magasinier)
                .with_location(LocalLink::new(t.locals[1]).with_notes("quai")),
        )
        .await
        .unwrap();

    let mut edited = saved.clone();
    edited.locals[0].notes = Some("etagere 5".into());
    let after = store.save(&edited).await.unwrap();

    assert_eq!(after.locals[0].id, saved.locals[0].id);
    assert_eq!(after.locals[0].notes.as_deref(), Some("etagere 5"));

    let outcome = Reconciler::sync(
        &InternalLocalLinkRepository::new(t.db.clone()),
        &*t.db,
        after.id.unwrap(),
        &after.locals,
    )
    .await
    .unwrap();
    assert!(!outcome.touched(), "{outcome:?}");
}

struct RefusingLedger;

#[async_trait::async_trait]
impl StockLedger for RefusingLedger {
    async fn credit(
        &self,
        _txn: &DatabaseTransaction,
        _article_id: i32,
        _local_id: i32,
        _quantite: i64,
    ) -> Result<i64, ServiceError> {
        Err(ServiceError::InternalError("ledger offline".into()))
    }
}

#[tokio::test]
async fn failed_stock_credit_keeps_order_pending() {
    let t = TestStore::new().await;
    let store =
        ExternalOrderStore::external(t.db.clone()).with_stock_ledger(Arc::new(RefusingLedger));

    let saved = store
        .save(
            &Order::new(t.magasinier)
                .with_local(t.locals[0])
                .with_article(ArticleLink::new(t.articles[0], 5)),
        )
        .await
        .unwrap();
    let id = saved.id.unwrap();

    assert_matches!(
        store.transition(id, OrderStatus::Confirmee).await,
        Err(ServiceError::InternalError(_))
    );
    let reloaded = store.get_by_id(id).await.unwrap();
    assert_eq!(reloaded.statut, OrderStatus::EnAttente);
    assert!(reloaded.confirmer_a.is_none());
}
