use chrono::{DateTime, Utc};
use common::AggregateId;
use domain::CorridorSnapshot;
use pipeline::{Request, RequestKind};
use serde::{Deserialize, Serialize};

use crate::keys::CORRIDOR_PREFIX;

/// Links two distinct zones. At most one corridor may link a pair of zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCorridor {
    pub source_zone_id: AggregateId,
    pub destination_zone_id: AggregateId,
    pub name: String,
    /// Defaults to now.
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
}

impl Request for CreateCorridor {
    type Response = CorridorSnapshot;
    const NAME: &'static str = "CreateCorridor";
    const KIND: RequestKind = RequestKind::Command;

    fn invalidates(&self) -> Option<&'static str> {
        Some(CORRIDOR_PREFIX)
    }
}

/// Replaces a corridor's name and validity window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCorridor {
    pub id: AggregateId,
    pub name: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
}

impl Request for UpdateCorridor {
    type Response = CorridorSnapshot;
    const NAME: &'static str = "UpdateCorridor";
    const KIND: RequestKind = RequestKind::Command;

    fn invalidates(&self) -> Option<&'static str> {
        Some(CORRIDOR_PREFIX)
    }
}

/// Changes only the supplied fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatchCorridor {
    pub id: AggregateId,
    pub name: Option<String>,
    pub is_enabled: Option<bool>,
    pub valid_to: Option<DateTime<Utc>>,
}

impl Request for PatchCorridor {
    type Response = CorridorSnapshot;
    const NAME: &'static str = "PatchCorridor";
    const KIND: RequestKind = RequestKind::Command;

    fn invalidates(&self) -> Option<&'static str> {
        Some(CORRIDOR_PREFIX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisableCorridor {
    pub id: AggregateId,
}

impl Request for DisableCorridor {
    type Response = CorridorSnapshot;
    const NAME: &'static str = "DisableCorridor";
    const KIND: RequestKind = RequestKind::Command;

    fn invalidates(&self) -> Option<&'static str> {
        Some(CORRIDOR_PREFIX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateCorridor {
    pub id: AggregateId,
}

impl Request for ActivateCorridor {
    type Response = CorridorSnapshot;
    const NAME: &'static str = "ActivateCorridor";
    const KIND: RequestKind = RequestKind::Command;

    fn invalidates(&self) -> Option<&'static str> {
        Some(CORRIDOR_PREFIX)
    }
}
