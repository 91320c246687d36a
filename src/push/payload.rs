use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::config::{AppConfig, NotificationTemplate};
use crate::crypto::{self, EncryptionKey};
use crate::types::push::{NotificationData, NotificationPayload};

/// Builds the notification sent to every subscriber.
///
/// The resource URL is encrypted afresh for each payload.
#[derive(Debug, Clone)]
pub(crate) struct PayloadBuilder {
    key: EncryptionKey,
    resource_url: String,
    template: NotificationTemplate,
}

impl PayloadBuilder {
    pub(crate) fn new(
        key: EncryptionKey,
        resource_url: impl Into<String>,
        template: NotificationTemplate,
    ) -> Self {
        Self {
            key,
            resource_url: resource_url.into(),
            template,
        }
    }

    pub(crate) fn from_config(config: &AppConfig) -> Self {
        Self::new(
            crypto::derive_key(&config.encryption_key),
            config.resource_url.clone(),
            config.notification.clone(),
        )
    }

    pub(crate) fn build(&self) -> NotificationPayload {
        self.build_with_rng(&mut OsRng)
    }

    pub(crate) fn build_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> NotificationPayload {
        let encrypted = crypto::encrypt_with_rng(&self.key, self.resource_url.as_bytes(), rng);
        NotificationPayload {
            title: self.template.title.clone(),
            body: self.template.body.clone(),
            data: NotificationData {
                file_name: self.template.file_name.clone(),
                encrypted_payload: encrypted,
            },
        }
    }
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn builder() -> PayloadBuilder {
        PayloadBuilder::new(
            crypto::derive_key("payload-test"),
            "https://files.example/report.pdf",
            NotificationTemplate {
                title: "Report ready".to_string(),
                body: "Your report is ready.".to_string(),
                file_name: "report.pdf".to_string(),
            },
        )
    }

    #[test]
    fn build__should_fill_template_and_encrypt_resource_url() {
        // When
        let payload = builder().build();

        // Then
        assert_eq!(payload.title, "Report ready");
        assert_eq!(payload.body, "Your report is ready.");
        assert_eq!(payload.data.file_name, "report.pdf");
        let decrypted = crypto::decrypt(
            &crypto::derive_key("payload-test"),
            &payload.data.encrypted_payload,
        )
        .expect("decrypt");
        assert_eq!(decrypted, b"https://files.example/report.pdf");
    }

    #[test]
    fn build__should_not_repeat_iv_between_payloads() {
        let builder = builder();

        let first = builder.build();
        let second = builder.build();

        assert_ne!(
            first.data.encrypted_payload.iv,
            second.data.encrypted_payload.iv
        );
    }

    #[test]
    fn build_with_rng__should_be_reproducible_for_seeded_rng() {
        // Given
        let builder = builder();

        // When
        let first = builder.build_with_rng(&mut StdRng::from_seed([9u8; 32]));
        let second = builder.build_with_rng(&mut StdRng::from_seed([9u8; 32]));

        // Then
        assert_eq!(first.data.encrypted_payload, second.data.encrypted_payload);
    }

    #[test]
    fn from_config__should_use_configured_resource_and_key() {
        // Given
        let config = AppConfig {
            encryption_key: "configured".to_string(),
            resource_url: "https://files.example/configured".to_string(),
            ..Default::default()
        };

        // When
        let payload = PayloadBuilder::from_config(&config).build();

        // Then
        let decrypted = crypto::decrypt(
            &crypto::derive_key("configured"),
            &payload.data.encrypted_payload,
        )
        .expect("decrypt");
        assert_eq!(decrypted, b"https://files.example/configured");
        assert_eq!(payload.title, crate::config::DEFAULT_NOTIFICATION_TITLE);
    }
}
