//! Fakes for the delivery and clock ports.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::oneshot;

use crate::ports::{self, DeliveryOutcome};
use crate::types::push::Subscription;

pub(crate) fn subscription(endpoint: &str) -> Subscription {
    Subscription::from_json(json!({
        "endpoint": endpoint,
        "expirationTime": null,
        "keys": { "p256dh": "p256", "auth": "auth" }
    }))
    .expect("valid subscription")
}

pub(crate) fn fixed_now() -> OffsetDateTime {
    OffsetDateTime::parse("2025-01-12T09:30:00Z", &Rfc3339).expect("parse now")
}

/// Records every send and answers with a per-endpoint scripted outcome.
#[derive(Clone, Default)]
pub(crate) struct TestSender {
    pub(crate) sent: Arc<Mutex<Vec<(String, String)>>>,
    outcomes: Arc<Mutex<HashMap<String, DeliveryOutcome>>>,
}

impl TestSender {
    pub(crate) fn script(&self, endpoint: &str, outcome: DeliveryOutcome) {
        self.outcomes
            .lock()
            .expect("outcomes lock")
            .insert(endpoint.to_string(), outcome);
    }

    pub(crate) fn sent_endpoints(&self) -> Vec<String> {
        let mut endpoints: Vec<String> = self
            .sent
            .lock()
            .expect("sent lock")
            .iter()
            .map(|(endpoint, _)| endpoint.clone())
            .collect();
        endpoints.sort();
        endpoints
    }
}

impl ports::PushSender for TestSender {
    type Fut<'a>
        = std::future::Ready<DeliveryOutcome>
    where
        Self: 'a;

    fn send<'a>(&'a self, subscription: &'a Subscription, message: &'a str) -> Self::Fut<'a> {
        self.sent
            .lock()
            .expect("sent lock")
            .push((subscription.endpoint.clone(), message.to_string()));
        let outcome = self
            .outcomes
            .lock()
            .expect("outcomes lock")
            .get(&subscription.endpoint)
            .cloned()
            .unwrap_or(DeliveryOutcome::Delivered);
        std::future::ready(outcome)
    }
}

/// Clock whose sleeps only finish once the test calls [`TestTime::trigger_all`];
/// sleeps started after that finish immediately.
#[derive(Clone)]
pub(crate) struct TestTime {
    now: OffsetDateTime,
    sleeps: Arc<Mutex<Vec<oneshot::Sender<()>>>>,
    durations: Arc<Mutex<Vec<Duration>>>,
    released: Arc<AtomicBool>,
}

impl TestTime {
    pub(crate) fn new(now: OffsetDateTime) -> Self {
        Self {
            now,
            sleeps: Arc::new(Mutex::new(Vec::new())),
            durations: Arc::new(Mutex::new(Vec::new())),
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn sleep_durations(&self) -> Vec<Duration> {
        self.durations.lock().expect("durations lock").clone()
    }

    pub(crate) fn trigger_all(&self) {
        let mut sends = self.sleeps.lock().expect("sleeps lock");
        self.released.store(true, Ordering::SeqCst);
        for sender in sends.drain(..) {
            let _ = sender.send(());
        }
    }
}

pub(crate) struct ManualSleep {
    receiver: oneshot::Receiver<()>,
}

impl Future for ManualSleep {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(_) => Poll::Ready(()),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl ports::TimeProvider for TestTime {
    type Sleep<'a>
        = ManualSleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        self.now
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        let (sender, receiver) = oneshot::channel();
        self.durations
            .lock()
            .expect("durations lock")
            .push(duration);
        let mut sleeps = self.sleeps.lock().expect("sleeps lock");
        if self.released.load(Ordering::SeqCst) {
            let _ = sender.send(());
        } else {
            sleeps.push(sender);
        }
        ManualSleep { receiver }
    }
}
