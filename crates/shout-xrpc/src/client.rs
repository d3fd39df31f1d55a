//! XRPC-backed session client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use shout_core::error::{ClientError, TransportError};
use shout_core::{
    AccessToken, CreatedSession, Credentials, Did, POST_COLLECTION, PdsUrl, PostReceipt,
    PostRecord, RefreshToken, RefreshedSession, SessionClient,
};

use crate::xrpc::client::XrpcClient;
use crate::xrpc::endpoints::*;

/// [`SessionClient`] that talks to a network PDS.
#[derive(Debug, Clone)]
pub struct XrpcSessionClient {
    client: XrpcClient,
}

impl XrpcSessionClient {
    /// Create a client for `pds` with no request timeout.
    pub fn new(pds: PdsUrl) -> Result<Self, TransportError> {
        Ok(Self {
            client: XrpcClient::new(pds, None)?,
        })
    }

    /// Create a client for `pds` whose requests give up after `timeout`.
    pub fn with_timeout(pds: PdsUrl, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            client: XrpcClient::new(pds, Some(timeout))?,
        })
    }

    /// Returns the PDS URL for this client.
    pub fn pds(&self) -> &PdsUrl {
        self.client.pds()
    }
}

/// A success response that does not describe a usable session or record.
fn invalid_response(what: &str, err: impl std::fmt::Display) -> ClientError {
    TransportError::Decode {
        message: format!("{}: {}", what, err),
    }
    .into()
}

#[async_trait]
impl SessionClient for XrpcSessionClient {
    #[instrument(skip_all, fields(pds = %self.pds(), identifier = %credentials.identifier()))]
    async fn create_session(
        &self,
        credentials: &Credentials,
    ) -> Result<CreatedSession, ClientError> {
        let request = CreateSessionRequest {
            identifier: credentials.identifier(),
            password: credentials.password(),
        };

        let response: CreateSessionResponse =
            self.client.procedure(CREATE_SESSION, &request).await?;

        let did = Did::new(&response.did).map_err(|e| invalid_response("session DID", e))?;
        debug!(did = %did, "createSession succeeded");

        Ok(CreatedSession {
            did,
            handle: response.handle,
            access_token: AccessToken::new(response.access_jwt)
                .map_err(|e| invalid_response("createSession", e))?,
            refresh_token: RefreshToken::new(response.refresh_jwt)
                .map_err(|e| invalid_response("createSession", e))?,
        })
    }

    #[instrument(skip_all, fields(pds = %self.pds()))]
    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<RefreshedSession, ClientError> {
        let response: RefreshSessionResponse = self
            .client
            .procedure_authed_no_body(REFRESH_SESSION, refresh_token.as_str())
            .await?;

        let did = response
            .did
            .map(Did::new)
            .transpose()
            .map_err(|e| invalid_response("session DID", e))?;
        debug!("refreshSession succeeded");

        Ok(RefreshedSession {
            did,
            handle: response.handle,
            access_token: AccessToken::new(response.access_jwt)
                .map_err(|e| invalid_response("refreshSession", e))?,
            refresh_token: RefreshToken::new(response.refresh_jwt)
                .map_err(|e| invalid_response("refreshSession", e))?,
        })
    }

    #[instrument(skip_all, fields(pds = %self.pds(), repo = %repo))]
    async fn create_record(
        &self,
        repo: &Did,
        token: &AccessToken,
        record: &PostRecord,
    ) -> Result<PostReceipt, ClientError> {
        let request = CreateRecordRequest {
            repo: repo.as_str(),
            collection: POST_COLLECTION,
            record,
        };

        let response: CreateRecordResponse = self
            .client
            .procedure_authed(CREATE_RECORD, &request, token.as_str())
            .await?;

        debug!(uri = %response.uri, "createRecord succeeded");
        Ok(PostReceipt {
            uri: response.uri,
            cid: response.cid,
        })
    }
}
