use async_trait::async_trait;
use sea_orm::ConnectionTrait;

use crate::common::{parse_optional_timestamp, parse_timestamp};
use crate::errors::ServiceError;
use crate::models::{OrderHeader, OrderKind, OrderStatus};

/// Column values shared by both header tables
pub(crate) struct HeaderColumns<'a> {
    pub id: i32,
    pub created_at: &'a str,
    pub confirmed_at: Option<&'a str>,
    pub updated_at: &'a str,
    pub statut: &'a str,
    pub actor_id: i32,
    pub counterparty_id: Option<i32>,
    pub local_id: Option<i32>,
}

impl HeaderColumns<'_> {
    pub(crate) fn into_header(self) -> Result<OrderHeader, ServiceError> {
        Ok(OrderHeader {
            id: Some(self.id),
            statut: OrderStatus::from_column(self.statut)?,
            created_at: parse_timestamp(self.created_at)?,
            confirmed_at: parse_optional_timestamp(self.confirmed_at)?,
            updated_at: parse_timestamp(self.updated_at)?,
            actor_id: self.actor_id,
            counterparty_id: self.counterparty_id,
            local_id: self.local_id,
        })
    }
}

/// Persistence for the header row of one order kind
#[async_trait]
pub trait OrderHeaderStore: Send + Sync {
    const KIND: OrderKind;

    async fn find<C>(&self, db: &C, id: i32) -> Result<Option<OrderHeader>, ServiceError>
    where
        C: ConnectionTrait;

    /// All headers, ascending by id
    async fn find_all<C>(&self, db: &C) -> Result<Vec<OrderHeader>, ServiceError>
    where
        C: ConnectionTrait;

    /// Ids of the orders currently in one of `statuses`
    async fn find_ids_by_status<C>(
        &self,
        db: &C,
        statuses: &[OrderStatus],
    ) -> Result<Vec<i32>, ServiceError>
    where
        C: ConnectionTrait;

    /// Insert a header without id; the returned copy carries the new id
    async fn insert<C>(&self, db: &C, header: &OrderHeader) -> Result<OrderHeader, ServiceError>
    where
        C: ConnectionTrait;

    async fn update<C>(&self, db: &C, header: &OrderHeader) -> Result<OrderHeader, ServiceError>
    where
        C: ConnectionTrait;

    /// Returns whether a row was removed
    async fn delete<C>(&self, db: &C, id: i32) -> Result<bool, ServiceError>
    where
        C: ConnectionTrait;

    async fn counterparty_exists<C>(&self, db: &C, id: i32) -> Result<bool, ServiceError>
    where
        C: ConnectionTrait;

    async fn counterparty_name<C>(&self, db: &C, id: i32) -> Result<Option<String>, ServiceError>
    where
        C: ConnectionTrait;
}
