use std::time::Duration;

use reqwest::Client;
use serde_json::json;
use tracing::warn;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

/// Webhook notifier with a Slack-style `{"text": ...}` payload.
/// Fire-and-forget, and a no-op when no URL is configured.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: Client,
    url: Option<String>,
}

impl Notifier {
    pub fn new(webhook_url: &str) -> Self {
        let url = (!webhook_url.is_empty()).then(|| webhook_url.to_string());
        Self {
            client: Client::new(),
            url,
        }
    }

    pub async fn notify(&self, message: &str) {
        let Some(url) = &self.url else {
            return;
        };
        let payload = json!({ "text": message });
        match self
            .client
            .post(url)
            .json(&payload)
            .timeout(WEBHOOK_TIMEOUT)
            .send()
            .await
        {
            Ok(response) if !response.status().is_success() => {
                warn!("webhook returned HTTP {}", response.status());
            }
            Ok(_) => {}
            Err(err) => warn!("webhook delivery failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn posts_text_payload_to_webhook() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(
                serde_json::json!({"text": "14:00 - water heater OFF"}),
            ))
            .with_status(200)
            .create_async()
            .await;

        let notifier = Notifier::new(&format!("{}/hook", server.url()));
        notifier.notify("14:00 - water heater OFF").await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn empty_url_disables_delivery() {
        // Must not panic or attempt any request.
        let notifier = Notifier::new("");
        notifier.notify("ignored").await;
    }
}
