mod common;

use common::TestStore;
use magasin::{
    models::{ArticleLink, LocalLink, Order, OrderStatus},
    services::{ExternalOrderStore, InternalOrderStore, InventoryAggregator},
};

async fn saved_id<F>(save: F) -> i32
where
    F: std::future::Future<Output = Result<Order, magasin::ServiceError>>,
{
    save.await.unwrap().id.unwrap()
}

#[tokio::test]
async fn net_is_external_minus_internal() {
    let t = TestStore::new().await;
    let internal = InternalOrderStore::internal(t.db.clone());
    let external = ExternalOrderStore::external(t.db.clone());
    let gants = t.articles[0];

    let ext = saved_id(external.save(
        &Order::new(t.magasinier)
            .with_counterparty(t.fournisseur)
            .with_article(ArticleLink::new(gants, 10))
            .with_location(LocalLink::new(t.locals[0])),
    ))
    .await;
    external.transition(ext, OrderStatus::Confirmee).await.unwrap();

    let int = saved_id(internal.save(
        &Order::new(t.magasinier)
            .with_counterparty(t.consommateur)
            .with_article(ArticleLink::new(gants, 3))
            .with_location(LocalLink::new(t.locals[1])),
    ))
    .await;
    internal.transition(int, OrderStatus::Confirmee).await.unwrap();

    let rows = InventoryAggregator::new(t.db.clone()).compute().await.unwrap();

    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.article.id, gants);
    assert_eq!(row.article_name(), "Gants");
    assert_eq!(row.reference.as_deref(), Some("GN-01"));
    assert_eq!(row.net_quantite, 7);
    assert_eq!(
        row.locals.iter().cloned().collect::<Vec<_>>(),
        vec!["Reserve A".to_string(), "Reserve B".to_string()]
    );
}

#[tokio::test]
async fn pending_and_cancelled_orders_do_not_count() {
    let t = TestStore::new().await;
    let external = ExternalOrderStore::external(t.db.clone());

    external
        .save(&Order::new(t.magasinier).with_article(ArticleLink::new(t.articles[0], 4)))
        .await
        .unwrap();
    let cancelled = saved_id(
        external.save(&Order::new(t.magasinier).with_article(ArticleLink::new(t.articles[1], 9))),
    )
    .await;
    external
        .transition(cancelled, OrderStatus::Annulee)
        .await
        .unwrap();

    let rows = InventoryAggregator::new(t.db.clone()).compute().await.unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn delivered_orders_count_and_negative_net_is_reported() {
    let t = TestStore::new().await;
    let internal = InternalOrderStore::internal(t.db.clone());
    let savon = t.articles[2];

    let id = saved_id(
        internal.save(&Order::new(t.magasinier).with_article(ArticleLink::new(savon, 5))),
    )
    .await;
    internal.transition(id, OrderStatus::Confirmee).await.unwrap();
    internal.transition(id, OrderStatus::Livree).await.unwrap();

    let rows = InventoryAggregator::new(t.db.clone()).compute().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].article_name(), "Savon");
    assert_eq!(rows[0].net_quantite, -5);
    assert!(rows[0].locals.is_empty());
}

#[tokio::test]
async fn compute_does_not_write() {
    let t = TestStore::new().await;
    let external = ExternalOrderStore::external(t.db.clone());

    let id = saved_id(
        external.save(&Order::new(t.magasinier).with_article(ArticleLink::new(t.articles[0], 2))),
    )
    .await;
    external.transition(id, OrderStatus::Confirmee).await.unwrap();
    let before = external.get_all().await.unwrap();

    let aggregator = InventoryAggregator::new(t.db.clone());
    let first = aggregator.compute().await.unwrap();
    let second = aggregator.compute().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(external.get_all().await.unwrap(), before);
}
