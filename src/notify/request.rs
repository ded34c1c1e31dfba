//! Outbound notification request.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::watcher::{Priority, Sound, WatcherConfig};

/// One alert as sent to the push provider.
///
/// Unset optional fields are left out of the form body entirely.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub title: Option<String>,
    pub message: String,
    pub priority: Priority,
    pub url: Option<String>,
    pub url_title: Option<String>,
    pub expire: Option<Duration>,
    pub retry: Option<Duration>,
    pub sound: Option<Sound>,
    pub device: Option<String>,
    /// Unix time the alert describes.
    pub timestamp: Option<u64>,
}

impl NotificationRequest {
    /// A bare request at normal priority.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: None,
            message: message.into(),
            priority: Priority::Normal,
            url: None,
            url_title: None,
            expire: None,
            retry: None,
            sound: None,
            device: None,
            timestamp: None,
        }
    }

    /// Build the alert for a failing watcher.
    ///
    /// Retry and expiry only mean something for emergency alerts, so they
    /// are carried only at that priority.
    pub fn for_watcher(config: &WatcherConfig, title: &str, message: String) -> Self {
        let emergency = config.priority.requires_ack();
        Self {
            title: Some(title.to_string()),
            message,
            priority: config.priority,
            url: config.url.clone(),
            url_title: config.url_title.clone(),
            expire: emergency.then_some(config.expire),
            retry: emergency.then_some(config.retry),
            sound: config.sound,
            device: None,
            timestamp: Some(unix_now()),
        }
    }

    pub fn with_device(mut self, device: Option<String>) -> Self {
        if self.device.is_none() {
            self.device = device;
        }
        self
    }

    /// Form fields for the provider's message endpoint, credentials excluded.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("message", self.message.clone())];

        if let Some(title) = &self.title {
            fields.push(("title", title.clone()));
        }
        fields.push(("priority", self.priority.as_i64().to_string()));
        if let Some(url) = &self.url {
            fields.push(("url", url.clone()));
        }
        if let Some(url_title) = &self.url_title {
            fields.push(("url_title", url_title.clone()));
        }
        if let Some(expire) = self.expire {
            fields.push(("expire", expire.as_secs().to_string()));
        }
        if let Some(retry) = self.retry {
            fields.push(("retry", retry.as_secs().to_string()));
        }
        if let Some(sound) = self.sound {
            fields.push(("sound", sound.as_str().to_string()));
        }
        if let Some(device) = &self.device {
            fields.push(("device", device.clone()));
        }
        if let Some(timestamp) = self.timestamp {
            fields.push(("timestamp", timestamp.to_string()));
        }

        fields
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field<'a>(fields: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        fields.iter().find(|(k, _)| *k == name).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_unset_fields_omitted() {
        let fields = NotificationRequest::new("hello").form_fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(field(&fields, "message"), Some("hello"));
        assert_eq!(field(&fields, "priority"), Some("0"));
        assert!(field(&fields, "url").is_none());
        assert!(field(&fields, "sound").is_none());
    }

    #[test]
    fn test_emergency_carries_retry_and_expire() {
        let config = WatcherConfig {
            priority: Priority::Emergency,
            retry: Duration::from_secs(300),
            expire: Duration::from_secs(3600),
            sound: Some(Sound::Siren),
            url: Some("http://example.org".into()),
            ..Default::default()
        };
        let request = NotificationRequest::for_watcher(&config, "HTTPWatch(example.org)", "down".into());
        let fields = request.form_fields();

        assert_eq!(field(&fields, "priority"), Some("2"));
        assert_eq!(field(&fields, "retry"), Some("300"));
        assert_eq!(field(&fields, "expire"), Some("3600"));
        assert_eq!(field(&fields, "sound"), Some("siren"));
        assert_eq!(field(&fields, "url"), Some("http://example.org"));
        assert_eq!(field(&fields, "title"), Some("HTTPWatch(example.org)"));
        assert!(field(&fields, "timestamp").is_some());
        assert!(field(&fields, "url_title").is_none());
    }

    #[test]
    fn test_normal_priority_drops_retry_and_expire() {
        let request = NotificationRequest::for_watcher(&WatcherConfig::default(), "t", "m".into());
        let fields = request.form_fields();
        assert!(field(&fields, "retry").is_none());
        assert!(field(&fields, "expire").is_none());
    }

    #[test]
    fn test_device_default_does_not_override() {
        let mut request = NotificationRequest::new("m");
        request.device = Some("pager".into());
        let request = request.with_device(Some("phone".into()));
        assert_eq!(request.device.as_deref(), Some("pager"));

        let request = NotificationRequest::new("m").with_device(Some("phone".into()));
        assert_eq!(request.device.as_deref(), Some("phone"));
    }
}
