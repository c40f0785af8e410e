use crate::config::ApiConfig;
use crate::domain::model::{ApiAck, AvailabilityRequest, MessageRequest};
use crate::domain::ports::MarketplaceApi;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// How a single backend call is attempted. The default is one attempt
/// without a timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPolicy {
    pub timeout: Option<Duration>,
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            timeout: None,
            retry_attempts: 0,
            retry_delay: Duration::from_millis(500),
        }
    }
}

pub struct HttpMarketplaceApi {
    client: Client,
    messages_url: String,
    availability_url: String,
    policy: RequestPolicy,
}

impl HttpMarketplaceApi {
    pub fn new(messages_url: String, availability_url: String, policy: RequestPolicy) -> Self {
        Self {
            client: Client::new(),
            messages_url,
            availability_url,
            policy,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(
            config.messages_url(),
            config.availability_url(),
            config.request_policy(),
        )
    }

    pub fn policy(&self) -> &RequestPolicy {
        &self.policy
    }

    async fn post_json<T: Serialize + Sync>(&self, url: &str, body: &T) -> Result<ApiAck> {
        let mut attempt = 0;
        loop {
            match self.try_post(url, body).await {
                Ok(ack) => return Ok(ack),
                Err(e) if attempt < self.policy.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "POST {} failed ({}), retry {}/{} in {:?}",
                        url,
                        e,
                        attempt,
                        self.policy.retry_attempts,
                        self.policy.retry_delay
                    );
                    tokio::time::sleep(self.policy.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn try_post<T: Serialize + Sync>(&self, url: &str, body: &T) -> Result<ApiAck> {
        tracing::debug!("Making API request to: {}", url);
        let mut request = self.client.post(url).json(body);
        if let Some(timeout) = self.policy.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        let ack: ApiAck = response.error_for_status()?.json().await?;
        Ok(ack)
    }
}

#[async_trait]
impl MarketplaceApi for HttpMarketplaceApi {
    async fn post_message(&self, request: &MessageRequest) -> Result<ApiAck> {
        self.post_json(&self.messages_url, request).await
    }

    async fn post_availability(&self, request: &AvailabilityRequest) -> Result<ApiAck> {
        self.post_json(&self.availability_url, request).await
    }
}
