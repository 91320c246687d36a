use crate::config::AppConfig;
use crate::ports::{PushSender, TimeProvider};
use crate::push;

use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState<S, T> {
    pub(crate) config: AppConfig,
    pub(crate) registry: Arc<push::SubscriptionRegistry>,
    pub(crate) dispatcher: push::Dispatcher<S>,
    pub(crate) scheduler: push::DeliveryScheduler<T, S>,
}

impl<S: PushSender, T: TimeProvider> AppState<S, T> {
    pub(crate) fn new(config: AppConfig, sender: S, time: T) -> Self {
        let registry = Arc::new(push::SubscriptionRegistry::new());
        let payloads = push::PayloadBuilder::from_config(&config);
        let dispatcher = push::Dispatcher::new(Arc::clone(&registry), payloads, sender);
        let scheduler =
            push::DeliveryScheduler::new(time, dispatcher.clone(), config.registration_delay);
        Self {
            config,
            registry,
            dispatcher,
            scheduler,
        }
    }
}
