//! SMS delivery over HTTP.

use sluice_core::notify::Notifier;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Posts `{"to", "message"}` JSON to an SMS gateway endpoint.
pub struct HttpSmsNotifier {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpSmsNotifier {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            agent: ureq::AgentBuilder::new()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(concat!("sluice-cli/", env!("CARGO_PKG_VERSION")))
                .build(),
        }
    }
}

impl Notifier for HttpSmsNotifier {
    fn send(&self, to: &str, message: &str) -> anyhow::Result<()> {
        tracing::debug!(endpoint = %self.endpoint, to, "posting sms notification");
        self.agent
            .post(&self.endpoint)
            .send_json(serde_json::json!({
                "to": to,
                "message": message,
            }))
            .map_err(|err| anyhow::anyhow!("SMS request to {} failed: {err}", self.endpoint))
            .map(drop)
    }
}
