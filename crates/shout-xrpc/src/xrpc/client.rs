//! XRPC HTTP client implementation.

use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use shout_core::PdsUrl;
use shout_core::error::{ClientError, ProtocolError, TransportError};

use super::endpoints::XrpcErrorResponse;

/// HTTP client for XRPC procedures against a single PDS.
///
/// Every call is one request. Nothing is retried and nothing is cached.
#[derive(Debug, Clone)]
pub struct XrpcClient {
    client: reqwest::Client,
    pds: PdsUrl,
    timeout: Option<Duration>,
}

impl XrpcClient {
    /// Create a client for `pds`, optionally bounding each request by `timeout`.
    pub fn new(pds: PdsUrl, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder =
            reqwest::Client::builder().user_agent(concat!("shout/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransportError::Http {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            pds,
            timeout,
        })
    }

    /// Returns the PDS URL this client is configured for.
    pub fn pds(&self) -> &PdsUrl {
        &self.pds
    }

    /// Make an unauthenticated XRPC procedure (POST request).
    #[instrument(skip(self, body), fields(pds = %self.pds))]
    pub async fn procedure<B, R>(&self, method: &str, body: &B) -> Result<R, ClientError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.pds.xrpc_url(method);
        debug!(method, %url, "XRPC procedure");

        let response = self.send(self.client.post(&url).json(body)).await?;
        self.handle_response(response).await
    }

    /// Make an authenticated XRPC procedure (POST request).
    #[instrument(skip(self, body, token), fields(pds = %self.pds))]
    pub async fn procedure_authed<B, R>(
        &self,
        method: &str,
        body: &B,
        token: &str,
    ) -> Result<R, ClientError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let url = self.pds.xrpc_url(method);
        debug!(method, "XRPC authenticated procedure");

        let request = self.client.post(&url).json(body).bearer_auth(token);
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    /// Make an authenticated XRPC procedure with no request body.
    /// Used for endpoints like refreshSession that don't accept a body.
    #[instrument(skip(self, token), fields(pds = %self.pds))]
    pub async fn procedure_authed_no_body<R>(
        &self,
        method: &str,
        token: &str,
    ) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
    {
        let url = self.pds.xrpc_url(method);
        debug!(method, "XRPC authenticated procedure (no body)");

        let response = self.send(self.client.post(&url).bearer_auth(token)).await?;
        self.handle_response(response).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        request.send().await.map_err(|e| self.transport_error(e))
    }

    /// Handle an XRPC response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<R, ClientError> {
        let status = response.status();
        trace!(status = %status, "XRPC response");

        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            serde_json::from_str(&body).map_err(|e| {
                TransportError::Decode {
                    message: format!("unexpected response body: {}", e),
                }
                .into()
            })
        } else {
            Err(parse_error_response(status.as_u16(), body).into())
        }
    }

    fn transport_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                duration_ms: self.timeout.map_or(0, |t| t.as_millis() as u64),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else if err.is_decode() {
            TransportError::Decode {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

/// Build a protocol error from a non-success response, keeping the raw body.
fn parse_error_response(status: u16, body: String) -> ProtocolError {
    match serde_json::from_str::<XrpcErrorResponse>(&body) {
        Ok(parsed) => ProtocolError::new(status, body, parsed.error, parsed.message),
        Err(_) => ProtocolError::new(status, body, None, None),
    }
}
