use async_trait::async_trait;
use common::AggregateId;
use domain::{Aggregate, Zone, ZoneSnapshot};
use persistence::{Database, Repository, Reservation, Store};
use pipeline::{Handler, RequestContext, RequestError, Result};

use super::{ActivateZone, CreateZone, DisableZone, FindZone, GetZone, ListZones, UpdateZone};
use crate::error::{commit_context, domain_error, persistence_error};

/// Reservation scope keeping zone codes unique.
const CODE_SCOPE: &str = "ZoneCode";

/// Handles every zone command and query.
#[derive(Clone)]
pub struct ZoneHandlers<S> {
    db: Database<S>,
}

impl<S: Store + Clone + 'static> ZoneHandlers<S> {
    pub fn new(db: Database<S>) -> Self {
        Self { db }
    }

    fn zones(&self) -> Repository<S, Zone> {
        self.db.repository()
    }

    async fn load(&self, id: AggregateId) -> Result<Zone> {
        self.zones()
            .load(id)
            .await
            .map_err(persistence_error)?
            .ok_or_else(|| RequestError::not_found(Zone::aggregate_type(), id))
    }

    /// Id of the zone holding `code`, if any. `code` must be normalized.
    async fn code_owner(&self, code: &str) -> Result<Option<AggregateId>> {
        let reservation = self
            .db
            .reservation(CODE_SCOPE, code)
            .await
            .map_err(persistence_error)?;
        Ok(reservation.map(|reservation| reservation.owner))
    }

    /// Commits `zone` and returns its resulting state.
    async fn save(&self, zone: Zone, ctx: &RequestContext) -> Result<ZoneSnapshot> {
        self.commit(zone, None, ctx).await
    }

    async fn commit(
        &self,
        zone: Zone,
        reservation: Option<Reservation>,
        ctx: &RequestContext,
    ) -> Result<ZoneSnapshot> {
        let snapshot = zone.snapshot();
        let mut uow = self.db.begin();
        if let Some(reservation) = reservation {
            uow.reserve(reservation);
        }
        uow.track(zone);
        uow.commit(&commit_context(ctx))
            .await
            .map_err(persistence_error)?;
        Ok(snapshot)
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<CreateZone> for ZoneHandlers<S> {
    async fn handle(&self, request: CreateZone, ctx: &RequestContext) -> Result<ZoneSnapshot> {
        let zone = Zone::create(
            AggregateId::new(),
            &request.code,
            request.name,
            request.description,
        );
        if let Some(owner) = self.code_owner(zone.code()).await? {
            return Err(RequestError::conflict(format!(
                "zone code {} is already used by {owner}",
                zone.code()
            )));
        }

        // A concurrent create of the same code loses on the reservation.
        let reservation = Reservation::new(CODE_SCOPE, zone.code(), zone.id());
        tracing::debug!(zone_id = %zone.id(), code = zone.code(), "creating zone");
        self.commit(zone, Some(reservation), ctx).await
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<UpdateZone> for ZoneHandlers<S> {
    async fn handle(&self, request: UpdateZone, ctx: &RequestContext) -> Result<ZoneSnapshot> {
        let mut zone = self.load(request.id).await?;
        zone.update(request.name, request.description);
        self.save(zone, ctx).await
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<DisableZone> for ZoneHandlers<S> {
    async fn handle(&self, request: DisableZone, ctx: &RequestContext) -> Result<ZoneSnapshot> {
        let mut zone = self.load(request.id).await?;
        zone.disable().map_err(domain_error)?;
        self.save(zone, ctx).await
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<ActivateZone> for ZoneHandlers<S> {
    async fn handle(&self, request: ActivateZone, ctx: &RequestContext) -> Result<ZoneSnapshot> {
        let mut zone = self.load(request.id).await?;
        zone.activate().map_err(domain_error)?;
        self.save(zone, ctx).await
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<GetZone> for ZoneHandlers<S> {
    async fn handle(&self, request: GetZone, _ctx: &RequestContext) -> Result<ZoneSnapshot> {
        Ok(self.load(request.id).await?.snapshot())
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<ListZones> for ZoneHandlers<S> {
    async fn handle(&self, request: ListZones, _ctx: &RequestContext) -> Result<Vec<ZoneSnapshot>> {
        let mut zones: Vec<_> = self
            .zones()
            .load_all()
            .await
            .map_err(persistence_error)?
            .into_iter()
            .filter(|zone| request.include_disabled || zone.is_enabled())
            .map(|zone| zone.snapshot())
            .collect();
        zones.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(zones)
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<FindZone> for ZoneHandlers<S> {
    async fn handle(&self, request: FindZone, _ctx: &RequestContext) -> Result<ZoneSnapshot> {
        match (request.id, request.code) {
            (Some(id), None) => Ok(self.load(id).await?.snapshot()),
            (None, Some(code)) => {
                let code = Zone::normalize_code(&code);
                match self.code_owner(&code).await? {
                    Some(owner) => Ok(self.load(owner).await?.snapshot()),
                    None => Err(RequestError::not_found(Zone::aggregate_type(), code)),
                }
            }
            _ => Err(RequestError::Internal(
                "FindZone reached its handler without exactly one criterion".to_string(),
            )),
        }
    }
}
