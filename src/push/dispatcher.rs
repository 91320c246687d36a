use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::error::DispatchError;
use crate::ports::{DeliveryOutcome, PushSender};
use crate::push::payload::PayloadBuilder;
use crate::push::registry::SubscriptionRegistry;
use crate::types::push::Subscription;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BroadcastTally {
    pub sent: usize,
    /// Includes the pruned subscriptions.
    pub failed: usize,
    pub pruned: usize,
}

#[derive(Clone)]
pub(crate) struct Dispatcher<S> {
    registry: Arc<SubscriptionRegistry>,
    payloads: Arc<PayloadBuilder>,
    sender: S,
}

impl<S: PushSender> Dispatcher<S> {
    pub(crate) fn new(
        registry: Arc<SubscriptionRegistry>,
        payloads: PayloadBuilder,
        sender: S,
    ) -> Self {
        Self {
            registry,
            payloads: Arc::new(payloads),
            sender,
        }
    }

    /// Sends one notification and prunes the subscription if the gateway says it is gone.
    pub(crate) async fn deliver(&self, subscription: &Subscription) -> Result<(), DispatchError> {
        let payload = self.payloads.build();
        let message = serde_json::to_string(&payload)?;

        match self.sender.send(subscription, &message).await {
            DeliveryOutcome::Delivered => {
                tracing::info!(endpoint = %subscription.endpoint, "notification delivered");
                Ok(())
            }
            DeliveryOutcome::Gone => {
                self.registry.remove(&subscription.endpoint);
                tracing::warn!(
                    endpoint = %subscription.endpoint,
                    remaining = self.registry.count(),
                    "removed subscription reported gone by push gateway"
                );
                Err(DispatchError::SubscriptionGone {
                    endpoint: subscription.endpoint.clone(),
                })
            }
            DeliveryOutcome::Failed {
                status_code,
                reason,
            } => Err(DispatchError::DeliveryFailure {
                status_code,
                reason,
            }),
        }
    }

    /// Delivers to every registered subscription concurrently.
    ///
    /// One failed delivery never stops the others; failures are tallied.
    pub(crate) async fn broadcast(&self) -> Result<BroadcastTally, DispatchError> {
        let subscriptions = self.registry.list();
        if subscriptions.is_empty() {
            return Err(DispatchError::NoSubscribers);
        }

        let mut deliveries = JoinSet::new();
        for subscription in subscriptions {
            let dispatcher = self.clone();
            deliveries.spawn(async move {
                let result = dispatcher.deliver(&subscription).await;
                (subscription.endpoint, result)
            });
        }

        let mut tally = BroadcastTally::default();
        while let Some(joined) = deliveries.join_next().await {
            match joined {
                Ok((_, Ok(()))) => tally.sent += 1,
                Ok((_, Err(DispatchError::SubscriptionGone { .. }))) => {
                    tally.failed += 1;
                    tally.pruned += 1;
                }
                Ok((endpoint, Err(err))) => {
                    tracing::warn!(%endpoint, error = %err, "broadcast delivery failed");
                    tally.failed += 1;
                }
                Err(err) => {
                    tracing::error!(error = %err, "broadcast delivery task aborted");
                    tally.failed += 1;
                }
            }
        }

        tracing::info!(
            sent = tally.sent,
            failed = tally.failed,
            pruned = tally.pruned,
            "broadcast finished"
        );
        Ok(tally)
    }
}
