use std::time::Duration;

use reqwest::Client;
use tracing::warn;

const SWITCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Network relay actuator (Shelly Gen2 `Switch.Set` RPC).
/// Fire-and-forget: a failure is logged and the next decision tick
/// re-asserts the state anyway.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    pub async fn set(&self, id: u8, on: bool) {
        let url = format!("{}/rpc/Switch.Set?id={id}&on={on}", self.base_url);
        match self.client.get(&url).timeout(SWITCH_TIMEOUT).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!("relay switch returned HTTP {}", response.status());
            }
            Ok(_) => {}
            Err(err) => warn!("relay switch failed: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn set_calls_switch_rpc_with_id_and_state() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rpc/Switch.Set")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("id".into(), "0".into()),
                Matcher::UrlEncoded("on".into(), "true".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"was_on":false}"#)
            .create_async()
            .await;

        let relay = RelayClient::new(server.url());
        relay.set(0, true).await;

        mock.assert_async().await;
    }
}
