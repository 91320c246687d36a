use crate::ports;
use crate::push::dispatcher::Dispatcher;
use crate::types::push::Subscription;

use std::sync::{Arc, Mutex};
use std::time::Duration;
use time::OffsetDateTime;
use tokio::task::JoinHandle;

pub(crate) struct ScheduledDeliveryHandle {
    pub(crate) endpoint: String,
    pub(crate) scheduled_at: OffsetDateTime,
    pub(crate) due_at: OffsetDateTime,
    handle: JoinHandle<()>,
}

impl ScheduledDeliveryHandle {
    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    #[cfg(test)]
    pub(crate) async fn join(self) -> Result<(), tokio::task::JoinError> {
        self.handle.await
    }
}

/// Fires a single delivery some time after a subscription registers, giving the
/// client time to activate its service worker.
#[derive(Clone)]
pub(crate) struct DeliveryScheduler<T, S> {
    time: T,
    dispatcher: Dispatcher<S>,
    delay: Duration,
    handles: Arc<Mutex<Vec<ScheduledDeliveryHandle>>>,
}

impl<T, S> DeliveryScheduler<T, S>
where
    T: ports::TimeProvider,
    S: ports::PushSender,
{
    pub(crate) fn new(time: T, dispatcher: Dispatcher<S>, delay: Duration) -> Self {
        Self {
            time,
            dispatcher,
            delay,
            handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn schedule(&self, subscription: Subscription) {
        let time = self.time.clone();
        let dispatcher = self.dispatcher.clone();
        let delay = self.delay;
        let scheduled_at = time.now();
        let due_at = scheduled_at + delay;
        let endpoint = subscription.endpoint.clone();

        let handle = tokio::spawn(async move {
            run_delivery(time, dispatcher, delay, subscription).await;
        });

        let mut handles = self.handles.lock().expect("scheduled deliveries lock");
        handles.retain(|handle| !handle.is_finished());
        handles.push(ScheduledDeliveryHandle {
            endpoint,
            scheduled_at,
            due_at,
            handle,
        });
    }

    pub(crate) fn with_handles<R>(&self, f: impl FnOnce(&[ScheduledDeliveryHandle]) -> R) -> R {
        let handles = self.handles.lock().expect("scheduled deliveries lock");
        f(&handles)
    }

    pub(crate) fn now(&self) -> OffsetDateTime {
        self.time.now()
    }

    #[cfg(test)]
    pub(crate) fn take_handles(&self) -> Vec<ScheduledDeliveryHandle> {
        std::mem::take(&mut *self.handles.lock().expect("scheduled deliveries lock"))
    }
}

async fn run_delivery<T, S>(
    time: T,
    dispatcher: Dispatcher<S>,
    delay: Duration,
    subscription: Subscription,
) where
    T: ports::TimeProvider,
    S: ports::PushSender,
{
    if !delay.is_zero() {
        time.sleep(delay).await;
    }

    if let Err(err) = dispatcher.deliver(&subscription).await {
        tracing::warn!(
            endpoint = %subscription.endpoint,
            error = %err,
            "scheduled delivery failed"
        );
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use crate::config::NotificationTemplate;
    use crate::crypto;
    use crate::ports::DeliveryOutcome;
    use crate::push::payload::PayloadBuilder;
    use crate::push::registry::SubscriptionRegistry;
    use crate::test_support::{TestSender, TestTime, fixed_now, subscription};

    fn scheduler(
        time: TestTime,
        sender: TestSender,
        registry: Arc<SubscriptionRegistry>,
        delay: Duration,
    ) -> DeliveryScheduler<TestTime, TestSender> {
        let payloads = PayloadBuilder::new(
            crypto::derive_key("scheduler-test"),
            "https://files.example/report.pdf",
            NotificationTemplate::default(),
        );
        DeliveryScheduler::new(time, Dispatcher::new(registry, payloads, sender), delay)
    }

    #[tokio::test]
    async fn schedule__should_wait_for_delay_then_send() {
        // Given
        let time = TestTime::new(fixed_now());
        let sender = TestSender::default();
        let registry = Arc::new(SubscriptionRegistry::new());
        let scheduler = scheduler(
            time.clone(),
            sender.clone(),
            Arc::clone(&registry),
            Duration::from_secs(2),
        );

        // When
        scheduler.schedule(subscription("https://push.example/1"));

        // Then
        tokio::task::yield_now().await;
        assert!(sender.sent.lock().expect("sent lock").is_empty());
        assert_eq!(time.sleep_durations(), vec![Duration::from_secs(2)]);
        scheduler.with_handles(|handles| {
            assert_eq!(handles.len(), 1);
            assert_eq!(handles[0].endpoint, "https://push.example/1");
            assert_eq!(handles[0].scheduled_at, fixed_now());
            assert_eq!(handles[0].due_at, fixed_now() + Duration::from_secs(2));
            assert!(!handles[0].is_finished());
        });

        time.trigger_all();
        for handle in scheduler.take_handles() {
            handle.join().await.expect("join handle");
        }

        assert_eq!(sender.sent_endpoints(), vec!["https://push.example/1"]);
    }

    #[tokio::test]
    async fn schedule__should_send_immediately_without_delay() {
        // Given
        let time = TestTime::new(fixed_now());
        let sender = TestSender::default();
        let scheduler = scheduler(
            time.clone(),
            sender.clone(),
            Arc::new(SubscriptionRegistry::new()),
            Duration::ZERO,
        );

        // When
        scheduler.schedule(subscription("https://push.example/1"));
        for handle in scheduler.take_handles() {
            handle.join().await.expect("join handle");
        }

        // Then
        assert!(time.sleep_durations().is_empty());
        assert_eq!(sender.sent_endpoints(), vec!["https://push.example/1"]);
    }

    #[tokio::test]
    async fn schedule__should_prune_gone_subscription_after_delay() {
        // Given
        let time = TestTime::new(fixed_now());
        let sender = TestSender::default();
        let registry = Arc::new(SubscriptionRegistry::new());
        registry.insert(subscription("https://push.example/gone"));
        sender.script("https://push.example/gone", DeliveryOutcome::Gone);
        let scheduler = scheduler(
            time.clone(),
            sender,
            Arc::clone(&registry),
            Duration::from_secs(2),
        );

        // When
        scheduler.schedule(subscription("https://push.example/gone"));
        tokio::task::yield_now().await;
        assert_eq!(registry.count(), 1);
        time.trigger_all();
        for handle in scheduler.take_handles() {
            handle.join().await.expect("join handle");
        }

        // Then
        assert_eq!(registry.count(), 0);
    }

    #[tokio::test]
    async fn schedule__should_drop_finished_handles() {
        // Given
        let time = TestTime::new(fixed_now());
        let scheduler = scheduler(
            time,
            TestSender::default(),
            Arc::new(SubscriptionRegistry::new()),
            Duration::ZERO,
        );
        scheduler.schedule(subscription("https://push.example/1"));
        for _ in 0..10 {
            tokio::task::yield_now().await;
            if scheduler.with_handles(|handles| handles.iter().all(|h| h.is_finished())) {
                break;
            }
        }

        // When
        scheduler.schedule(subscription("https://push.example/2"));

        // Then
        scheduler.with_handles(|handles| {
            assert_eq!(handles.len(), 1);
            assert_eq!(handles[0].endpoint, "https://push.example/2");
        });
    }
}
