//! Tables of the external order aggregate: procurement from suppliers.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::debug;

use super::{FournisseurRepository, ReferenceLookup};
use crate::common::{format_timestamp, now, parse_optional_timestamp};
use crate::entities::{external_order, external_order_article, external_order_local};
use crate::models::OrderKind;

order_header_repository! {
    /// Header rows of external orders
    ExternalOrderRepository {
        kind: OrderKind::External,
        table: external_order,
        label: "External order",
        counterparty: fournisseurs: FournisseurRepository,
    }
}

article_link_repository! {
    /// "External order contains article X with quantity Q"; no condition column
    ExternalArticleLinkRepository {
        table: external_order_article,
        owner: external_order_id / ExternalOrderId,
        label: "External order article",
        columns: [notes],
    }
}

local_link_repository! {
    /// "External order touches location L"; no notes column
    ExternalLocalLinkRepository {
        table: external_order_local,
        owner: external_order_id / ExternalOrderId,
        label: "External order local",
        columns: [],
    }
}
