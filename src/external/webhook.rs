use crate::config::WebhookConfig;
use crate::error::{AppError, AppResult};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Outbound notifications to the URL configured in site settings.
#[derive(Clone)]
pub struct WebhookService {
    http: Client,
}

#[derive(Debug, Serialize)]
struct WebhookEnvelope<'a> {
    event: &'a str,
    sent_at: chrono::DateTime<Utc>,
    data: serde_json::Value,
}

impl WebhookService {
    pub fn new(cfg: &WebhookConfig) -> AppResult<Self> {
        let http = Client::builder()
            .user_agent("padel-backend/webhook")
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        Ok(Self { http })
    }

    pub async fn deliver(&self, url: &str, event: &str, data: serde_json::Value) -> AppResult<()> {
        let body = WebhookEnvelope {
            event,
            sent_at: Utc::now(),
            data,
        };

        let resp = self.http.post(url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Webhook {url} answered HTTP {}",
                status.as_u16()
            )));
        }
        Ok(())
    }

    /// Fire-and-forget delivery on a detached task. Failures are logged and
    /// never reach the caller.
    pub fn dispatch<T: Serialize>(&self, url: String, event: &'static str, payload: &T) {
        let data = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                log::error!("Failed to encode {event} webhook payload: {e:?}");
                return;
            }
        };

        let svc = self.clone();
        tokio::spawn(async move {
            match svc.deliver(&url, event, data).await {
                Ok(()) => log::info!("Delivered {event} webhook to {url}"),
                Err(e) => log::warn!("Webhook {event} to {url} failed: {e:?}"),
            }
        });
    }
}
