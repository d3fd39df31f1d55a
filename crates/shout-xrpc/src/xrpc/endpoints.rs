//! XRPC endpoint names and request/response bodies.

use serde::{Deserialize, Serialize};

use shout_core::PostRecord;

/// com.atproto.server.createSession
pub const CREATE_SESSION: &str = "com.atproto.server.createSession";

/// com.atproto.server.refreshSession
pub const REFRESH_SESSION: &str = "com.atproto.server.refreshSession";

/// com.atproto.repo.createRecord
pub const CREATE_RECORD: &str = "com.atproto.repo.createRecord";

/// Request body for createSession.
#[derive(Serialize)]
pub struct CreateSessionRequest<'a> {
    pub identifier: &'a str,
    pub password: &'a str,
}

/// Response from createSession.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub did: String,
    #[serde(default)]
    pub handle: Option<String>,
    pub access_jwt: String,
    pub refresh_jwt: String,
}

/// Response from refreshSession.
/// refreshSession takes no body; the refresh token goes in the Authorization header.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSessionResponse {
    #[serde(default)]
    pub did: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    pub access_jwt: String,
    pub refresh_jwt: String,
}

/// Request body for createRecord.
#[derive(Debug, Serialize)]
pub struct CreateRecordRequest<'a> {
    pub repo: &'a str,
    pub collection: &'a str,
    pub record: &'a PostRecord,
}

/// Response from createRecord.
#[derive(Debug, Deserialize)]
pub struct CreateRecordResponse {
    pub uri: String,
    pub cid: String,
}

/// XRPC error response format.
#[derive(Debug, Deserialize)]
pub struct XrpcErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}
