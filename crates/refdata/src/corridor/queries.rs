use common::AggregateId;
use domain::CorridorSnapshot;
use pipeline::{CachePolicy, Request, RequestKind};
use serde::{Deserialize, Serialize};

use crate::keys::{CORRIDOR_PREFIX, query_cache_ttl};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetCorridor {
    pub id: AggregateId,
}

impl Request for GetCorridor {
    type Response = CorridorSnapshot;
    const NAME: &'static str = "GetCorridor";
    const KIND: RequestKind = RequestKind::Query;

    fn cache_policy(&self) -> Option<CachePolicy> {
        Some(CachePolicy::new(
            format!("{CORRIDOR_PREFIX}{}", self.id),
            query_cache_ttl(),
        ))
    }
}

/// Lists corridors, optionally only those touching one zone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListCorridors {
    pub zone_id: Option<AggregateId>,
}

impl Request for ListCorridors {
    type Response = Vec<CorridorSnapshot>;
    const NAME: &'static str = "ListCorridors";
    const KIND: RequestKind = RequestKind::Query;

    fn cache_policy(&self) -> Option<CachePolicy> {
        let key = match self.zone_id {
            Some(zone_id) => format!("{CORRIDOR_PREFIX}list_zone_{zone_id}"),
            None => format!("{CORRIDOR_PREFIX}list_all"),
        };
        Some(CachePolicy::new(key, query_cache_ttl()))
    }
}
