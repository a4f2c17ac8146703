use common::AggregateId;
use domain::ZoneSnapshot;
use pipeline::{Request, RequestKind};
use serde::{Deserialize, Serialize};

use crate::keys::ZONE_PREFIX;

/// Creates an enabled zone. The code must be unique ignoring case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateZone {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

impl Request for CreateZone {
    type Response = ZoneSnapshot;
    const NAME: &'static str = "CreateZone";
    const KIND: RequestKind = RequestKind::Command;

    fn invalidates(&self) -> Option<&'static str> {
        Some(ZONE_PREFIX)
    }
}

/// Replaces a zone's name and description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateZone {
    pub id: AggregateId,
    pub name: String,
    pub description: Option<String>,
}

impl Request for UpdateZone {
    type Response = ZoneSnapshot;
    const NAME: &'static str = "UpdateZone";
    const KIND: RequestKind = RequestKind::Command;

    fn invalidates(&self) -> Option<&'static str> {
        Some(ZONE_PREFIX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisableZone {
    pub id: AggregateId,
}

impl Request for DisableZone {
    type Response = ZoneSnapshot;
    const NAME: &'static str = "DisableZone";
    const KIND: RequestKind = RequestKind::Command;

    fn invalidates(&self) -> Option<&'static str> {
        Some(ZONE_PREFIX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateZone {
    pub id: AggregateId,
}

impl Request for ActivateZone {
    type Response = ZoneSnapshot;
    const NAME: &'static str = "ActivateZone";
    const KIND: RequestKind = RequestKind::Command;

    fn invalidates(&self) -> Option<&'static str> {
        Some(ZONE_PREFIX)
    }
}
