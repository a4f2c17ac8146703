use std::sync::Arc;

use async_trait::async_trait;

use crate::context::CommitContext;
use crate::publisher::EventPublisher;
use crate::unit_of_work::TrackedAggregate;

/// Runs after a unit of work has been durably committed.
#[async_trait]
pub trait CommitHook: Send + Sync {
    /// Handles the committed aggregates and returns how many events were
    /// published.
    async fn after_commit(
        &self,
        committed: &mut [Box<dyn TrackedAggregate>],
        ctx: &CommitContext,
    ) -> usize;
}

/// Harvests buffered domain events from committed aggregates and publishes them.
///
/// Events go out in tracking order, FIFO within each aggregate. A publish
/// failure is logged and counted; it never undoes the commit. Buffers are
/// cleared once every event has been offered to the publisher.
pub struct CommitInterceptor {
    publisher: Arc<dyn EventPublisher>,
}

impl CommitInterceptor {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl CommitHook for CommitInterceptor {
    async fn after_commit(
        &self,
        committed: &mut [Box<dyn TrackedAggregate>],
        ctx: &CommitContext,
    ) -> usize {
        let mut envelopes = Vec::new();
        for aggregate in committed.iter() {
            match aggregate.harvest() {
                Ok(events) => envelopes.extend(events),
                Err(e) => {
                    metrics::counter!("event_publish_failures_total", "reason" => "serialization")
                        .increment(aggregate.pending_events() as u64);
                    tracing::error!(
                        aggregate_type = aggregate.type_name(),
                        aggregate_id = %aggregate.aggregate_id(),
                        error = %e,
                        "failed to harvest domain events"
                    );
                }
            }
        }

        let mut published = 0;
        for mut envelope in envelopes {
            envelope.annotate("actor", ctx.actor.as_str());
            if let Some(correlation_id) = &ctx.correlation_id {
                envelope.annotate("correlation_id", correlation_id.as_str());
            }

            match self.publisher.publish(&envelope).await {
                Ok(()) => {
                    published += 1;
                    metrics::counter!(
                        "events_published_total",
                        "event_type" => envelope.event_type.clone()
                    )
                    .increment(1);
                }
                Err(e) => {
                    metrics::counter!("event_publish_failures_total", "reason" => "publisher")
                        .increment(1);
                    tracing::warn!(
                        event_type = %envelope.event_type,
                        aggregate_id = %envelope.aggregate_id,
                        error = %e,
                        "domain event publish failed after commit"
                    );
                }
            }
        }

        for aggregate in committed.iter_mut() {
            aggregate.discard_events();
        }

        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::publisher::{InMemoryEventLog, SubscriberFanout};
    use common::{Actor, AggregateId, Version};
    use domain::Zone;

    #[tokio::test]
    async fn publishes_in_order_and_clears_buffers() {
        let log = InMemoryEventLog::new();
        let interceptor =
            CommitInterceptor::new(Arc::new(SubscriberFanout::new().with(log.clone())));

        let mut zone = Zone::create(AggregateId::new(), "eu", "Europe", None);
        zone.disable().unwrap();
        let mut committed: Vec<Box<dyn TrackedAggregate>> = vec![Box::new(zone)];
        committed[0].mark_committed(Version::first());

        let ctx = CommitContext::new(Actor::new("alice")).with_correlation_id("req-1");
        let published = interceptor.after_commit(&mut committed, &ctx).await;

        assert_eq!(published, 2);
        assert_eq!(committed[0].pending_events(), 0);
        assert_eq!(log.event_types().await, vec!["ZoneCreated", "ZoneDisabled"]);

        let events = log.events().await;
        let first = &events[0];
        assert_eq!(first.version, Version::first());
        assert_eq!(first.metadata["actor"], "alice");
        assert_eq!(first.metadata["correlation_id"], "req-1");
    }
}
