use crate::types::push::Subscription;

/// Result of one call to the push gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DeliveryOutcome {
    Delivered,
    /// The gateway reported the subscription as permanently invalid.
    Gone,
    Failed {
        status_code: Option<u16>,
        reason: String,
    },
}

pub(crate) trait PushSender: Clone + Send + Sync + 'static {
    type Fut<'a>: Future<Output = DeliveryOutcome> + Send + 'a
    where
        Self: 'a;

    fn send<'a>(&'a self, subscription: &'a Subscription, message: &'a str) -> Self::Fut<'a>;
}
