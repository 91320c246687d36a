use std::time::Duration;

pub use crate::types::push::VapidConfig;

pub const DEFAULT_CONTACT: &str = "admin@example.com";
pub const DEFAULT_ENCRYPTION_KEY: &str = "pushcast-default-encryption-key";
pub const DEFAULT_RESOURCE_URL: &str = "https://files.example.com/downloads/latest";
pub const DEFAULT_NOTIFICATION_TITLE: &str = "New file available";
pub const DEFAULT_NOTIFICATION_BODY: &str = "A new file is ready for download. Tap to open it.";
pub const DEFAULT_FILE_NAME: &str = "latest";
pub const DEFAULT_REGISTRATION_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub vapid: VapidConfig,
    /// Key material run through [`crate::crypto::derive_key`].
    pub encryption_key: String,
    pub resource_url: String,
    pub notification: NotificationTemplate,
    pub registration_delay: Duration,
    pub delivery_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct NotificationTemplate {
    pub title: String,
    pub body: String,
    pub file_name: String,
}

impl Default for NotificationTemplate {
    fn default() -> Self {
        Self {
            title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            body: DEFAULT_NOTIFICATION_BODY.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
        }
    }
}

/// Turns a contact string into a VAPID `sub` claim.
pub fn vapid_subject(contact: &str) -> String {
    let contact = contact.trim();
    if contact.starts_with("mailto:") || contact.starts_with("https://") {
        contact.to_string()
    } else {
        format!("mailto:{contact}")
    }
}

#[cfg(test)]
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            vapid: VapidConfig {
                private_key: "test-private-key".to_string(),
                public_key: "test-public-key".to_string(),
                subject: vapid_subject(DEFAULT_CONTACT),
            },
            encryption_key: DEFAULT_ENCRYPTION_KEY.to_string(),
            resource_url: DEFAULT_RESOURCE_URL.to_string(),
            notification: NotificationTemplate::default(),
            registration_delay: DEFAULT_REGISTRATION_DELAY,
            delivery_timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }
}
