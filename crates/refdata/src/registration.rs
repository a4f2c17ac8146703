use persistence::{Database, Store};
use pipeline::{ConfigurationError, DispatcherBuilder};

use crate::corridor::{
    self, ActivateCorridor, CorridorHandlers, CreateCorridor, DisableCorridor, GetCorridor,
    ListCorridors, PatchCorridor, UpdateCorridor,
};
use crate::zone::{
    self, ActivateZone, CreateZone, DisableZone, FindZone, GetZone, ListZones, UpdateZone,
    ZoneHandlers,
};

/// Registers every zone and corridor handler and validator, and marks each
/// request type as required so a missing registration fails at build time.
pub fn register<S: Store + Clone + 'static>(
    builder: &mut DispatcherBuilder,
    db: Database<S>,
) -> Result<(), ConfigurationError> {
    let zones = ZoneHandlers::new(db.clone());
    builder
        .handler::<CreateZone, _>(zones.clone())?
        .handler::<UpdateZone, _>(zones.clone())?
        .handler::<DisableZone, _>(zones.clone())?
        .handler::<ActivateZone, _>(zones.clone())?
        .handler::<GetZone, _>(zones.clone())?
        .handler::<ListZones, _>(zones.clone())?
        .handler::<FindZone, _>(zones)?;
    builder
        .validator::<CreateZone>(zone::create_zone_rules())
        .validator::<UpdateZone>(zone::update_zone_rules())
        .validator::<FindZone>(zone::find_zone_rules());

    let corridors = CorridorHandlers::new(db);
    builder
        .handler::<CreateCorridor, _>(corridors.clone())?
        .handler::<UpdateCorridor, _>(corridors.clone())?
        .handler::<PatchCorridor, _>(corridors.clone())?
        .handler::<DisableCorridor, _>(corridors.clone())?
        .handler::<ActivateCorridor, _>(corridors.clone())?
        .handler::<GetCorridor, _>(corridors.clone())?
        .handler::<ListCorridors, _>(corridors)?;
    builder
        .validator::<CreateCorridor>(corridor::create_corridor_rules())
        .validator::<UpdateCorridor>(corridor::update_corridor_rules())
        .validator::<PatchCorridor>(corridor::patch_corridor_rules());

    builder
        .require::<CreateZone>()
        .require::<UpdateZone>()
        .require::<DisableZone>()
        .require::<ActivateZone>()
        .require::<GetZone>()
        .require::<ListZones>()
        .require::<FindZone>()
        .require::<CreateCorridor>()
        .require::<UpdateCorridor>()
        .require::<PatchCorridor>()
        .require::<DisableCorridor>()
        .require::<ActivateCorridor>()
        .require::<GetCorridor>()
        .require::<ListCorridors>();

    tracing::debug!("reference-data handlers registered");
    Ok(())
}
