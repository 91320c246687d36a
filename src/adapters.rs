use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use web_push::WebPushError;

use crate::ports::{self, DeliveryOutcome};
use crate::types::push::{Subscription, VapidConfig};

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimeProvider;

impl ports::TimeProvider for TokioTimeProvider {
    type Sleep<'a>
        = tokio::time::Sleep
    where
        Self: 'a;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn sleep<'a>(&'a self, duration: Duration) -> Self::Sleep<'a> {
        tokio::time::sleep(duration)
    }
}

#[derive(Clone)]
pub struct WebPushSender {
    vapid: VapidConfig,
    timeout: Duration,
    client: Arc<web_push::WebPushClient>,
}

impl WebPushSender {
    pub fn new(vapid: VapidConfig, timeout: Duration) -> Result<Self, WebPushError> {
        let client = web_push::WebPushClient::new()?;
        Ok(Self {
            vapid,
            timeout,
            client: Arc::new(client),
        })
    }

    async fn try_send(&self, subscription: &Subscription, message: &str) -> Result<(), SendError> {
        let (Some(p256dh), Some(auth)) = (subscription.key("p256dh"), subscription.key("auth"))
        else {
            return Err(SendError::MissingKeys);
        };
        let subscription_info = web_push::SubscriptionInfo::new(
            subscription.endpoint.clone(),
            p256dh.to_string(),
            auth.to_string(),
        );
        let mut builder = web_push::WebPushMessageBuilder::new(&subscription_info)?;
        builder.set_payload(web_push::ContentEncoding::Aes128Gcm, message.as_bytes());
        let mut signature_builder = web_push::VapidSignatureBuilder::from_base64(
            &self.vapid.private_key,
            web_push::URL_SAFE_NO_PAD,
            &subscription_info,
        )?;
        signature_builder.add_claim("sub", self.vapid.subject.as_str());
        builder.set_vapid_signature(signature_builder.build()?);

        with_timeout(self.timeout, self.client.send(builder.build()?)).await
    }
}

async fn with_timeout<F>(timeout: Duration, send: F) -> Result<(), SendError>
where
    F: Future<Output = Result<(), WebPushError>>,
{
    match tokio::time::timeout(timeout, send).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(SendError::TimedOut(timeout)),
    }
}

enum SendError {
    MissingKeys,
    TimedOut(Duration),
    Gateway(WebPushError),
}

impl From<WebPushError> for SendError {
    fn from(err: WebPushError) -> Self {
        SendError::Gateway(err)
    }
}

impl ports::PushSender for WebPushSender {
    type Fut<'a>
        = Pin<Box<dyn Future<Output = DeliveryOutcome> + Send + 'a>>
    where
        Self: 'a;

    fn send<'a>(&'a self, subscription: &'a Subscription, message: &'a str) -> Self::Fut<'a> {
        Box::pin(async move { delivery_outcome(self.try_send(subscription, message).await) })
    }
}

fn delivery_outcome(result: Result<(), SendError>) -> DeliveryOutcome {
    match result {
        Ok(()) => DeliveryOutcome::Delivered,
        Err(SendError::MissingKeys) => DeliveryOutcome::Failed {
            status_code: None,
            reason: "subscription is missing keys.p256dh or keys.auth".to_string(),
        },
        Err(SendError::TimedOut(timeout)) => DeliveryOutcome::Failed {
            status_code: None,
            reason: format!("push gateway did not answer within {timeout:?}"),
        },
        Err(SendError::Gateway(err)) => classify_gateway_error(err),
    }
}

/// Maps a web-push error to an outcome; only 410 Gone marks a subscription dead.
fn classify_gateway_error(err: WebPushError) -> DeliveryOutcome {
    let status_code = match &err {
        WebPushError::EndpointNotValid => return DeliveryOutcome::Gone,
        WebPushError::EndpointNotFound => Some(404),
        WebPushError::Unauthorized => Some(401),
        WebPushError::BadRequest(_) => Some(400),
        WebPushError::PayloadTooLarge => Some(413),
        WebPushError::ServerError(_) => Some(500),
        _ => None,
    };
    DeliveryOutcome::Failed {
        status_code,
        reason: err.to_string(),
    }
}
