//! HTTP client for the rules backend.
//!
//! Every call is a JSON `POST {base_url}{path}`. The backend answers with a
//! JSON body on success; anything else is mapped onto [`RulesError`].

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;

use crate::domain::wheel::WheelOutcome;
use crate::ports::{
    CloseBetsResponse, JackpotStatus, RulesEndpoint, RulesError, RulesService, SetStatusAck,
};

/// Configuration for the rules client.
#[derive(Debug, Clone)]
pub struct HttpRulesConfig {
    /// Base URL without trailing slash (default: http://127.0.0.1:8000).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpRulesConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// reqwest-backed [`RulesService`].
#[derive(Debug, Clone)]
pub struct HttpRulesService {
    config: HttpRulesConfig,
    client: Client,
}

impl HttpRulesService {
    pub fn new(config: HttpRulesConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn url(&self, endpoint: RulesEndpoint) -> String {
        format!("{}{}", self.config.base_url, endpoint.path())
    }

    async fn post(&self, endpoint: RulesEndpoint, body: Option<Value>) -> Result<Response, RulesError> {
        let mut request = self.client.post(self.url(endpoint));
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                RulesError::Timeout {
                    endpoint,
                    timeout_secs: self.config.timeout.as_secs(),
                }
            } else if e.is_connect() {
                RulesError::Network {
                    endpoint,
                    message: format!("Connection failed: {}", e),
                }
            } else {
                RulesError::Network {
                    endpoint,
                    message: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RulesError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        endpoint: RulesEndpoint,
        body: Option<Value>,
    ) -> Result<T, RulesError> {
        let response = self.post(endpoint, body).await?;
        response.json::<T>().await.map_err(|e| {
            if e.is_timeout() {
                RulesError::Timeout {
                    endpoint,
                    timeout_secs: self.config.timeout.as_secs(),
                }
            } else {
                RulesError::Parse {
                    endpoint,
                    message: e.to_string(),
                }
            }
        })
    }

    /// Acknowledgement-only endpoints: the body is not inspected.
    async fn post_ack(&self, endpoint: RulesEndpoint) -> Result<(), RulesError> {
        self.post(endpoint, None).await.map(|_| ())
    }
}

#[async_trait]
impl RulesService for HttpRulesService {
    async fn close_wheel_bets(&self) -> Result<WheelOutcome, RulesError> {
        let resp: CloseBetsResponse = self.post_json(RulesEndpoint::WheelClose, None).await?;
        Ok(resp.into())
    }

    async fn open_wheel_bets(&self) -> Result<(), RulesError> {
        self.post_ack(RulesEndpoint::WheelOpen).await
    }

    async fn start_wheel_game(&self) -> Result<(), RulesError> {
        self.post_ack(RulesEndpoint::WheelStart).await
    }

    async fn end_wheel_bets(&self) -> Result<(), RulesError> {
        self.post_ack(RulesEndpoint::WheelEnd).await
    }

    async fn jackpot_slider(&self) -> Result<Value, RulesError> {
        self.post_json(RulesEndpoint::JackpotSlider, None).await
    }

    async fn jackpot_new_game(&self) -> Result<Value, RulesError> {
        self.post_json(RulesEndpoint::JackpotNewGame, None).await
    }

    async fn jackpot_status(&self) -> Result<JackpotStatus, RulesError> {
        self.post_json(RulesEndpoint::JackpotStatus, None).await
    }

    async fn jackpot_set_status(&self, status: i64) -> Result<SetStatusAck, RulesError> {
        self.post_json(
            RulesEndpoint::JackpotSetStatus,
            Some(json!({ "status": status })),
        )
        .await
    }
}
