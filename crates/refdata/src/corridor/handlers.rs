use async_trait::async_trait;
use chrono::Utc;
use common::AggregateId;
use domain::{Aggregate, Corridor, CorridorPatch, CorridorSnapshot, Zone};
use persistence::{Database, Repository, Reservation, Store};
use pipeline::{Handler, RequestContext, RequestError, Result};

use super::{
    ActivateCorridor, CreateCorridor, DisableCorridor, GetCorridor, ListCorridors, PatchCorridor,
    UpdateCorridor,
};
use crate::error::{commit_context, domain_error, persistence_error};

/// Reservation scope allowing one corridor per pair of zones.
const LINK_SCOPE: &str = "CorridorLink";

/// Handles every corridor command and query.
#[derive(Clone)]
pub struct CorridorHandlers<S> {
    db: Database<S>,
}

impl<S: Store + Clone + 'static> CorridorHandlers<S> {
    pub fn new(db: Database<S>) -> Self {
        Self { db }
    }

    fn corridors(&self) -> Repository<S, Corridor> {
        self.db.repository()
    }

    async fn load(&self, id: AggregateId) -> Result<Corridor> {
        self.corridors()
            .load(id)
            .await
            .map_err(persistence_error)?
            .ok_or_else(|| RequestError::not_found(Corridor::aggregate_type(), id))
    }

    async fn ensure_zone_exists(&self, id: AggregateId) -> Result<()> {
        let zone = self
            .db
            .repository::<Zone>()
            .load(id)
            .await
            .map_err(persistence_error)?;
        match zone {
            Some(_) => Ok(()),
            None => Err(RequestError::not_found(Zone::aggregate_type(), id)),
        }
    }

    async fn save(&self, corridor: Corridor, ctx: &RequestContext) -> Result<CorridorSnapshot> {
        self.commit(corridor, None, ctx).await
    }

    async fn commit(
        &self,
        corridor: Corridor,
        reservation: Option<Reservation>,
        ctx: &RequestContext,
    ) -> Result<CorridorSnapshot> {
        let snapshot = corridor.snapshot();
        let mut uow = self.db.begin();
        if let Some(reservation) = reservation {
            uow.reserve(reservation);
        }
        uow.track(corridor);
        uow.commit(&commit_context(ctx))
            .await
            .map_err(persistence_error)?;
        Ok(snapshot)
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<CreateCorridor> for CorridorHandlers<S> {
    async fn handle(
        &self,
        request: CreateCorridor,
        ctx: &RequestContext,
    ) -> Result<CorridorSnapshot> {
        self.ensure_zone_exists(request.source_zone_id).await?;
        self.ensure_zone_exists(request.destination_zone_id).await?;

        let (source, destination) = (request.source_zone_id, request.destination_zone_id);
        let link = Corridor::link_key(source, destination);
        let existing = self
            .db
            .reservation(LINK_SCOPE, &link)
            .await
            .map_err(persistence_error)?;
        if let Some(existing) = existing {
            return Err(RequestError::conflict(format!(
                "zones {source} and {destination} are already linked by corridor {}",
                existing.owner
            )));
        }

        let corridor = Corridor::create(
            AggregateId::new(),
            source,
            destination,
            request.name,
            request.valid_from.unwrap_or_else(Utc::now),
            request.valid_to,
        )
        .map_err(domain_error)?;
        let reservation = Reservation::new(LINK_SCOPE, link, corridor.id());
        self.commit(corridor, Some(reservation), ctx).await
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<UpdateCorridor> for CorridorHandlers<S> {
    async fn handle(
        &self,
        request: UpdateCorridor,
        ctx: &RequestContext,
    ) -> Result<CorridorSnapshot> {
        let mut corridor = self.load(request.id).await?;
        corridor
            .update(request.name, request.valid_from, request.valid_to)
            .map_err(domain_error)?;
        self.save(corridor, ctx).await
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<PatchCorridor> for CorridorHandlers<S> {
    async fn handle(
        &self,
        request: PatchCorridor,
        ctx: &RequestContext,
    ) -> Result<CorridorSnapshot> {
        let mut corridor = self.load(request.id).await?;
        corridor
            .patch(CorridorPatch {
                name: request.name,
                is_enabled: request.is_enabled,
                valid_to: request.valid_to,
            })
            .map_err(domain_error)?;
        self.save(corridor, ctx).await
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<DisableCorridor> for CorridorHandlers<S> {
    async fn handle(
        &self,
        request: DisableCorridor,
        ctx: &RequestContext,
    ) -> Result<CorridorSnapshot> {
        let mut corridor = self.load(request.id).await?;
        corridor.disable().map_err(domain_error)?;
        self.save(corridor, ctx).await
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<ActivateCorridor> for CorridorHandlers<S> {
    async fn handle(
        &self,
        request: ActivateCorridor,
        ctx: &RequestContext,
    ) -> Result<CorridorSnapshot> {
        let mut corridor = self.load(request.id).await?;
        corridor.activate().map_err(domain_error)?;
        self.save(corridor, ctx).await
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<GetCorridor> for CorridorHandlers<S> {
    async fn handle(&self, request: GetCorridor, _ctx: &RequestContext) -> Result<CorridorSnapshot> {
        Ok(self.load(request.id).await?.snapshot())
    }
}

#[async_trait]
impl<S: Store + Clone + 'static> Handler<ListCorridors> for CorridorHandlers<S> {
    async fn handle(
        &self,
        request: ListCorridors,
        _ctx: &RequestContext,
    ) -> Result<Vec<CorridorSnapshot>> {
        let corridors = self
            .corridors()
            .load_all()
            .await
            .map_err(persistence_error)?;
        Ok(corridors
            .into_iter()
            .filter(|corridor| {
                request.zone_id.is_none_or(|zone| {
                    corridor.source_zone_id() == zone || corridor.destination_zone_id() == zone
                })
            })
            .map(|corridor| corridor.snapshot())
            .collect())
    }
}
