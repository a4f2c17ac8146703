//! Unique natural keys, claimed atomically with the aggregate that owns them.

use common::{AggregateId, Version};
use serde::{Deserialize, Serialize};

use crate::store::StoredRecord;

/// Record type under which reservations are stored.
pub const RESERVATION_TYPE: &str = "Reservation";

/// Claim on a natural key (a zone code, a pair of linked zones) by one aggregate.
///
/// Committed with an expected version of [`Version::initial`], so a second
/// claim on the same key fails the whole commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub scope: String,
    pub key: String,
    pub owner: AggregateId,
}

impl Reservation {
    pub fn new(scope: impl Into<String>, key: impl Into<String>, owner: AggregateId) -> Self {
        Self {
            scope: scope.into(),
            key: key.into(),
            owner,
        }
    }

    /// Storage id of the reservation for `key` within `scope`.
    pub fn record_id(scope: &str, key: &str) -> AggregateId {
        AggregateId::from_name(&format!("{scope}/{key}"))
    }

    pub fn id(&self) -> AggregateId {
        Self::record_id(&self.scope, &self.key)
    }

    pub(crate) fn to_record(&self) -> serde_json::Result<StoredRecord> {
        Ok(StoredRecord {
            aggregate_type: RESERVATION_TYPE.to_string(),
            aggregate_id: self.id(),
            version: Version::first(),
            state: serde_json::to_value(self)?,
        })
    }

    pub(crate) fn from_record(record: StoredRecord) -> serde_json::Result<Self> {
        serde_json::from_value(record.state)
    }
}
