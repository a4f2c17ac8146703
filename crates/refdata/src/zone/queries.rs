use common::AggregateId;
use domain::ZoneSnapshot;
use pipeline::{CachePolicy, Request, RequestKind};
use serde::{Deserialize, Serialize};

use crate::keys::{ZONE_PREFIX, query_cache_ttl};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetZone {
    pub id: AggregateId,
}

impl Request for GetZone {
    type Response = ZoneSnapshot;
    const NAME: &'static str = "GetZone";
    const KIND: RequestKind = RequestKind::Query;

    fn cache_policy(&self) -> Option<CachePolicy> {
        Some(CachePolicy::new(
            format!("{ZONE_PREFIX}{}", self.id),
            query_cache_ttl(),
        ))
    }
}

/// Lists zones ordered by code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListZones {
    pub include_disabled: bool,
}

impl Request for ListZones {
    type Response = Vec<ZoneSnapshot>;
    const NAME: &'static str = "ListZones";
    const KIND: RequestKind = RequestKind::Query;

    fn cache_policy(&self) -> Option<CachePolicy> {
        let scope = if self.include_disabled { "all" } else { "enabled" };
        Some(CachePolicy::new(
            format!("{ZONE_PREFIX}list_{scope}"),
            query_cache_ttl(),
        ))
    }
}

/// Looks a zone up by id or by code. Exactly one must be given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindZone {
    pub id: Option<AggregateId>,
    pub code: Option<String>,
}

impl Request for FindZone {
    type Response = ZoneSnapshot;
    const NAME: &'static str = "FindZone";
    const KIND: RequestKind = RequestKind::Query;

    fn cache_policy(&self) -> Option<CachePolicy> {
        let key = match (&self.id, &self.code) {
            (Some(id), None) => format!("{ZONE_PREFIX}{id}"),
            (None, Some(code)) => format!("{ZONE_PREFIX}code_{}", code.trim().to_ascii_uppercase()),
            _ => return None,
        };
        Some(CachePolicy::new(key, query_cache_ttl()))
    }
}
