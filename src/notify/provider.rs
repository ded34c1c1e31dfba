//! Push provider client.
//!
//! # Responsibilities
//! - Post alerts to the provider's message endpoint
//! - Query acknowledgment state for emergency receipts
//!
//! # Security Constraints
//! - Tokens are injected per request and never logged
//! - Transport errors are stripped of their URL (the receipt query
//!   carries the app token)

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::Credentials;
use crate::notify::receipt::ReceiptId;
use crate::notify::request::NotificationRequest;
use crate::notify::NotifyError;

/// Default provider endpoint.
pub const DEFAULT_API_URL: &str = "https://api.pushover.net";

/// Accepted message, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendResponse {
    pub request_id: Option<String>,
    /// Present for emergency-priority messages.
    pub receipt: Option<ReceiptId>,
}

/// Acknowledgment state of one receipt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceiptStatus {
    pub acknowledged: bool,
    /// The provider stopped retrying; the alert can no longer be acknowledged.
    pub expired: bool,
    pub acknowledged_by: Option<String>,
}

impl ReceiptStatus {
    /// Whether the receipt no longer needs tracking.
    pub fn is_settled(&self) -> bool {
        self.acknowledged || self.expired
    }
}

/// Outbound side of the notification pipeline.
#[async_trait]
pub trait PushProvider: Send + Sync {
    async fn send(&self, request: &NotificationRequest) -> Result<SendResponse, NotifyError>;

    async fn receipt_status(&self, receipt: &ReceiptId) -> Result<ReceiptStatus, NotifyError>;
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    status: i64,
    request: Option<String>,
    receipt: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReceiptBody {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    acknowledged: i64,
    #[serde(default)]
    expired: i64,
    acknowledged_by: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

/// HTTP client for the Pushover API.
pub struct PushoverApi {
    client: reqwest::Client,
    base: Url,
    credentials: Credentials,
}

impl PushoverApi {
    pub fn new(api_url: &str, credentials: Credentials, timeout: Duration) -> Result<Self, NotifyError> {
        let base = Url::parse(api_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pushwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        Ok(Self {
            client,
            base,
            credentials,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, NotifyError> {
        Ok(self.base.join(path)?)
    }
}

#[async_trait]
impl PushProvider for PushoverApi {
    async fn send(&self, request: &NotificationRequest) -> Result<SendResponse, NotifyError> {
        let url = self.endpoint("/1/messages.json")?;

        let mut form = vec![
            ("token", self.credentials.app_token().to_string()),
            ("user", self.credentials.user_token().to_string()),
        ];
        form.extend(request.form_fields());

        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;
        let body: Option<MessageBody> = serde_json::from_str(&text).ok();

        match body {
            Some(body) if status.is_success() && body.status == 1 => Ok(SendResponse {
                request_id: body.request,
                receipt: body.receipt.map(ReceiptId),
            }),
            Some(body) => Err(NotifyError::Rejected {
                status: status.as_u16(),
                detail: body.errors.join("; "),
            }),
            None if status.is_success() => Err(NotifyError::InvalidResponse(
                "message response is not valid JSON".to_string(),
            )),
            None => Err(NotifyError::Rejected {
                status: status.as_u16(),
                detail: String::new(),
            }),
        }
    }

    async fn receipt_status(&self, receipt: &ReceiptId) -> Result<ReceiptStatus, NotifyError> {
        let url = self.endpoint(&format!("/1/receipts/{}.json", receipt))?;

        let response = self
            .client
            .get(url)
            .query(&[("token", self.credentials.app_token())])
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ReceiptBody>()
                .await
                .map(|b| b.errors.join("; "))
                .unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let body: ReceiptBody = response
            .json()
            .await
            .map_err(|e| NotifyError::InvalidResponse(e.without_url().to_string()))?;

        if body.status != 1 {
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                detail: body.errors.join("; "),
            });
        }

        Ok(ReceiptStatus {
            acknowledged: body.acknowledged == 1,
            expired: body.expired == 1,
            acknowledged_by: body.acknowledged_by.filter(|s| !s.is_empty()),
        })
    }
}
