//! Tables of the internal order aggregate: stock handed to consumers.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use super::{ConsommateurRepository, ReferenceLookup};
use crate::common::{format_timestamp, now, parse_optional_timestamp};
use crate::entities::{internal_order, internal_order_article, internal_order_local};
use crate::models::OrderKind;

order_header_repository! {
    /// Header rows of internal orders
    InternalOrderRepository {
        kind: OrderKind::Internal,
        table: internal_order,
        label: "Internal order",
        counterparty: consommateurs: ConsommateurRepository,
    }
}

article_link_repository! {
    /// "Internal order contains article X with quantity Q", with condition
    /// and notes
    InternalArticleLinkRepository {
        table: internal_order_article,
        owner: internal_order_id / InternalOrderId,
        label: "Internal order article",
        columns: [etat, notes],
    }
}

local_link_repository! {
    /// "Internal order touches location L", with free-text notes
    InternalLocalLinkRepository {
        table: internal_order_local,
        owner: internal_order_id / InternalOrderId,
        label: "Internal order local",
        columns: [notes],
    }
}
