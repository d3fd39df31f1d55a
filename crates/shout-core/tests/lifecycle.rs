//! Session lifecycle and publishing tests against a scripted client.
//!
//! The scripted client answers each exchange from a queue and records every
//! call, so the tests can assert exactly how many requests were made and
//! with which tokens.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use shout_core::error::TransportError;
use shout_core::{
    AccessToken, AuthError, ClientError, CreatedSession, Credentials, Did, MAX_POST_CHARS,
    MemoryStore, NoCredentials, PostError, PostReceipt, PostRecord, ProtocolError, Publisher,
    RefreshToken, RefreshedSession, Session, SessionClient, SessionManager,
};

// ============================================================================
// Scripted client
// ============================================================================

#[derive(Default)]
struct ScriptedClient {
    logins: Mutex<VecDeque<Result<CreatedSession, ClientError>>>,
    refreshes: Mutex<VecDeque<Result<RefreshedSession, ClientError>>>,
    posts: Mutex<VecDeque<Result<PostReceipt, ClientError>>>,
    calls: Mutex<Calls>,
}

#[derive(Default, Debug)]
struct Calls {
    logins: Vec<String>,
    refreshes: Vec<String>,
    posts: Vec<SubmittedPost>,
}

#[derive(Debug, Clone)]
struct SubmittedPost {
    repo: String,
    token: String,
    text: String,
    created_at: String,
}

impl ScriptedClient {
    fn new() -> Self {
        Self::default()
    }

    fn on_login(self, result: Result<CreatedSession, ClientError>) -> Self {
        self.logins.lock().unwrap().push_back(result);
        self
    }

    fn on_refresh(self, result: Result<RefreshedSession, ClientError>) -> Self {
        self.refreshes.lock().unwrap().push_back(result);
        self
    }

    fn on_post(self, result: Result<PostReceipt, ClientError>) -> Self {
        self.posts.lock().unwrap().push_back(result);
        self
    }

    fn login_count(&self) -> usize {
        self.calls.lock().unwrap().logins.len()
    }

    fn refreshed_with(&self) -> Vec<String> {
        self.calls.lock().unwrap().refreshes.clone()
    }

    fn posts(&self) -> Vec<SubmittedPost> {
        self.calls.lock().unwrap().posts.clone()
    }
}

#[async_trait]
impl SessionClient for ScriptedClient {
    async fn create_session(
        &self,
        credentials: &Credentials,
    ) -> Result<CreatedSession, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .logins
            .push(credentials.identifier().to_string());
        self.logins
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected createSession call")
    }

    async fn refresh_session(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<RefreshedSession, ClientError> {
        self.calls
            .lock()
            .unwrap()
            .refreshes
            .push(refresh_token.as_str().to_string());
        self.refreshes
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected refreshSession call")
    }

    async fn create_record(
        &self,
        repo: &Did,
        token: &AccessToken,
        record: &PostRecord,
    ) -> Result<PostReceipt, ClientError> {
        self.calls.lock().unwrap().posts.push(SubmittedPost {
            repo: repo.to_string(),
            token: token.as_str().to_string(),
            text: record.text().to_string(),
            created_at: record.created_at().to_string(),
        });
        self.posts
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected createRecord call")
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn stored_session() -> Session {
    Session::from_parts("did:plc:alice", "alice.test", "access-1", "refresh-1").unwrap()
}

fn created(handle: Option<&str>) -> Result<CreatedSession, ClientError> {
    Ok(CreatedSession {
        did: Did::new("did:plc:alice").unwrap(),
        handle: handle.map(str::to_string),
        access_token: AccessToken::new("access-1").unwrap(),
        refresh_token: RefreshToken::new("refresh-1").unwrap(),
    })
}

fn refreshed(n: u32) -> Result<RefreshedSession, ClientError> {
    Ok(RefreshedSession {
        did: Some(Did::new("did:plc:alice").unwrap()),
        handle: Some("alice.test".to_string()),
        access_token: AccessToken::new(format!("access-{n}")).unwrap(),
        refresh_token: RefreshToken::new(format!("refresh-{n}")).unwrap(),
    })
}

fn receipt() -> Result<PostReceipt, ClientError> {
    Ok(PostReceipt {
        uri: "at://did:plc:alice/app.bsky.feed.post/3k2a".to_string(),
        cid: "bafyreia".to_string(),
    })
}

fn rejected<T>(status: u16, error: &str) -> Result<T, ClientError> {
    let body = format!(r#"{{"error":"{error}","message":"rejected"}}"#);
    Err(ClientError::Rejected(ProtocolError::new(
        status,
        body,
        Some(error.to_string()),
        Some("rejected".to_string()),
    )))
}

fn expired<T>() -> Result<T, ClientError> {
    rejected(401, "ExpiredToken")
}

fn manager_with(
    client: ScriptedClient,
    store: &MemoryStore,
) -> SessionManager<ScriptedClient, MemoryStore> {
    SessionManager::new(client, store.clone())
}

// ============================================================================
// SessionManager
// ============================================================================

#[tokio::test]
async fn ensure_session_reuses_stored_session_without_network() {
    let store = MemoryStore::with_session(stored_session());
    let manager = manager_with(ScriptedClient::new(), &store);

    let session = manager.ensure_session(&NoCredentials).await.unwrap();

    assert_eq!(session, stored_session());
    assert_eq!(manager.client().login_count(), 0);
    assert_eq!(manager.current().await, Some(stored_session()));
}

#[tokio::test]
async fn ensure_session_without_session_or_credentials_fails() {
    let store = MemoryStore::new();
    let manager = manager_with(ScriptedClient::new(), &store);

    let err = manager.ensure_session(&NoCredentials).await.unwrap_err();

    assert!(matches!(err, AuthError::MissingCredentials));
    assert_eq!(manager.client().login_count(), 0);
    assert!(store.snapshot().is_none());
}

#[tokio::test]
async fn ensure_session_treats_blank_credentials_as_missing() {
    let store = MemoryStore::new();
    let manager = manager_with(ScriptedClient::new(), &store);

    let err = manager
        .ensure_session(&Credentials::new("alice.test", ""))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::MissingCredentials));
    assert_eq!(manager.client().login_count(), 0);
}

#[tokio::test]
async fn ensure_session_logs_in_and_persists() {
    let store = MemoryStore::new();
    let client = ScriptedClient::new().on_login(created(Some("alice.bsky.social")));
    let manager = manager_with(client, &store);

    let session = manager
        .ensure_session(&Credentials::new("@alice", "app-password"))
        .await
        .unwrap();

    assert_eq!(manager.client().calls.lock().unwrap().logins, vec!["alice"]);
    // The handle declared by the PDS wins over the identifier typed in.
    assert_eq!(session.handle(), "alice.bsky.social");
    assert_eq!(session.did().as_str(), "did:plc:alice");
    assert_eq!(store.snapshot(), Some(session));
}

#[tokio::test]
async fn authenticate_uses_identifier_when_no_handle_declared() {
    let store = MemoryStore::new();
    let manager = manager_with(ScriptedClient::new().on_login(created(None)), &store);

    let session = manager
        .authenticate(Credentials::new("alice.test", "pw"))
        .await
        .unwrap();

    assert_eq!(session.handle(), "alice.test");
}

#[tokio::test]
async fn authenticate_rejection_leaves_store_untouched() {
    let store = MemoryStore::with_session(stored_session());
    let client = ScriptedClient::new().on_login(rejected(401, "AuthenticationRequired"));
    let manager = manager_with(client, &store);

    let err = manager
        .authenticate(Credentials::new("alice.test", "wrong"))
        .await
        .unwrap_err();

    match err {
        AuthError::RemoteRejected { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("AuthenticationRequired"));
        }
        other => panic!("expected RemoteRejected, got {other:?}"),
    }
    assert_eq!(store.snapshot(), Some(stored_session()));
    assert_eq!(store.save_count(), 0);
    assert_eq!(manager.client().login_count(), 1);
}

#[tokio::test]
async fn authenticate_transport_failure_is_not_retried() {
    let store = MemoryStore::new();
    let client = ScriptedClient::new().on_login(Err(ClientError::Transport(
        TransportError::Connection {
            message: "refused".to_string(),
        },
    )));
    let manager = manager_with(client, &store);

    let err = manager
        .authenticate(Credentials::new("alice.test", "pw"))
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Transport(_)));
    assert_eq!(manager.client().login_count(), 1);
    assert!(store.snapshot().is_none());
}

#[tokio::test]
async fn refresh_replaces_both_tokens_and_persists() {
    let store = MemoryStore::with_session(stored_session());
    let manager = manager_with(ScriptedClient::new().on_refresh(refreshed(2)), &store);

    let session = manager.refresh().await.unwrap();

    assert_eq!(manager.client().refreshed_with(), vec!["refresh-1"]);
    assert_eq!(session.access_token().as_str(), "access-2");
    assert_eq!(session.refresh_token().as_str(), "refresh-2");
    assert_eq!(session.did(), stored_session().did());
    assert_eq!(store.snapshot(), Some(session.clone()));
    assert_eq!(manager.current().await, Some(session));
}

#[tokio::test]
async fn refresh_failure_leaves_store_untouched() {
    let store = MemoryStore::with_session(stored_session());
    let client = ScriptedClient::new().on_refresh(rejected(400, "ExpiredToken"));
    let manager = manager_with(client, &store);

    let err = manager.refresh().await.unwrap_err();

    assert!(matches!(err, AuthError::RefreshFailed { .. }));
    assert_eq!(store.snapshot(), Some(stored_session()));
    assert_eq!(store.save_count(), 0);
}

#[tokio::test]
async fn refresh_without_session_fails() {
    let store = MemoryStore::new();
    let manager = manager_with(ScriptedClient::new(), &store);

    let err = manager.refresh().await.unwrap_err();

    assert!(matches!(err, AuthError::NoSession));
    assert!(manager.client().refreshed_with().is_empty());
}

#[tokio::test]
async fn refresh_rejects_tokens_for_another_account() {
    let store = MemoryStore::with_session(stored_session());
    let client = ScriptedClient::new().on_refresh(Ok(RefreshedSession {
        did: Some(Did::new("did:plc:mallory").unwrap()),
        handle: None,
        access_token: AccessToken::new("access-2").unwrap(),
        refresh_token: RefreshToken::new("refresh-2").unwrap(),
    }));
    let manager = manager_with(client, &store);

    let err = manager.refresh().await.unwrap_err();

    assert!(matches!(err, AuthError::RefreshFailed { .. }));
    assert_eq!(store.snapshot(), Some(stored_session()));
}

#[tokio::test]
async fn concurrent_stale_refreshes_share_one_exchange() {
    let store = MemoryStore::with_session(stored_session());
    let manager = manager_with(ScriptedClient::new().on_refresh(refreshed(2)), &store);
    let stale = manager.ensure_session(&NoCredentials).await.unwrap();

    let (a, b) = tokio::join!(manager.refresh_stale(&stale), manager.refresh_stale(&stale));

    let (a, b) = (a.unwrap(), b.unwrap());
    assert_eq!(a, b);
    assert_eq!(a.access_token().as_str(), "access-2");
    assert_eq!(manager.client().refreshed_with(), vec!["refresh-1"]);
    assert_eq!(store.save_count(), 1);
}

// ============================================================================
// Publisher
// ============================================================================

#[tokio::test]
async fn post_at_limit_makes_one_submission() {
    let store = MemoryStore::with_session(stored_session());
    let manager = manager_with(ScriptedClient::new().on_post(receipt()), &store);
    let session = manager.ensure_session(&NoCredentials).await.unwrap();

    let message = "a".repeat(MAX_POST_CHARS);
    let result = Publisher::new(&manager).post(&message, session).await.unwrap();

    assert_eq!(result, receipt().unwrap());
    let posts = manager.client().posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].repo, "did:plc:alice");
    assert_eq!(posts[0].token, "access-1");
    assert_eq!(posts[0].text, message);
    assert!(manager.client().refreshed_with().is_empty());
}

#[tokio::test]
async fn post_over_limit_makes_no_network_calls() {
    let store = MemoryStore::with_session(stored_session());
    let manager = manager_with(ScriptedClient::new(), &store);

    let message = "a".repeat(MAX_POST_CHARS + 1);
    let err = Publisher::new(&manager)
        .post(&message, stored_session())
        .await
        .unwrap_err();

    assert!(matches!(err, PostError::TooLong { excess: 1 }));
    assert!(manager.client().posts().is_empty());
    assert!(manager.client().refreshed_with().is_empty());
}

#[tokio::test]
async fn post_refreshes_once_and_retries_after_expiry() {
    let store = MemoryStore::with_session(stored_session());
    let client = ScriptedClient::new()
        .on_post(expired())
        .on_refresh(refreshed(2))
        .on_post(receipt());
    let manager = manager_with(client, &store);
    let session = manager.ensure_session(&NoCredentials).await.unwrap();

    let result = Publisher::new(&manager).post("hello", session).await;

    assert!(result.is_ok());
    let posts = manager.client().posts();
    let tokens: Vec<_> = posts.iter().map(|p| p.token.as_str()).collect();
    assert_eq!(tokens, vec!["access-1", "access-2"]);
    assert_eq!(posts[0].created_at, posts[1].created_at);
    assert_eq!(manager.client().refreshed_with(), vec!["refresh-1"]);

    let stored = store.snapshot().unwrap();
    assert_eq!(stored.access_token().as_str(), "access-2");
    assert_eq!(stored.refresh_token().as_str(), "refresh-2");
}

#[tokio::test]
async fn post_treats_expired_token_code_as_expiry() {
    let store = MemoryStore::with_session(stored_session());
    let client = ScriptedClient::new()
        .on_post(rejected(400, "ExpiredToken"))
        .on_refresh(refreshed(2))
        .on_post(receipt());
    let manager = manager_with(client, &store);

    let result = Publisher::new(&manager).post("hello", stored_session()).await;

    assert!(result.is_ok());
    assert_eq!(manager.client().posts().len(), 2);
}

#[tokio::test]
async fn post_reports_auth_expired_when_refresh_is_rejected() {
    let store = MemoryStore::with_session(stored_session());
    let client = ScriptedClient::new()
        .on_post(expired())
        .on_refresh(rejected(400, "ExpiredToken"));
    let manager = manager_with(client, &store);

    let err = Publisher::new(&manager)
        .post("hello", stored_session())
        .await
        .unwrap_err();

    assert!(matches!(err, PostError::AuthExpired));
    assert_eq!(manager.client().posts().len(), 1);
    assert_eq!(manager.client().refreshed_with().len(), 1);
    assert_eq!(store.snapshot(), Some(stored_session()));
}

#[tokio::test]
async fn post_gives_up_after_one_retry() {
    let store = MemoryStore::with_session(stored_session());
    let client = ScriptedClient::new()
        .on_post(expired())
        .on_refresh(refreshed(2))
        .on_post(expired());
    let manager = manager_with(client, &store);

    let err = Publisher::new(&manager)
        .post("hello", stored_session())
        .await
        .unwrap_err();

    assert!(matches!(err, PostError::RemoteRejected { status: 401, .. }));
    assert_eq!(manager.client().posts().len(), 2);
    assert_eq!(manager.client().refreshed_with().len(), 1);
}

#[tokio::test]
async fn post_does_not_retry_other_rejections() {
    let store = MemoryStore::with_session(stored_session());
    let client = ScriptedClient::new().on_post(rejected(400, "InvalidRequest"));
    let manager = manager_with(client, &store);

    let err = Publisher::new(&manager)
        .post("hello", stored_session())
        .await
        .unwrap_err();

    match err {
        PostError::RemoteRejected { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("InvalidRequest"));
        }
        other => panic!("expected RemoteRejected, got {other:?}"),
    }
    assert_eq!(manager.client().posts().len(), 1);
    assert!(manager.client().refreshed_with().is_empty());
}

#[tokio::test]
async fn post_does_not_retry_transport_failures() {
    let store = MemoryStore::with_session(stored_session());
    let client = ScriptedClient::new().on_post(Err(ClientError::Transport(
        TransportError::Timeout { duration_ms: 30_000 },
    )));
    let manager = manager_with(client, &store);

    let err = Publisher::new(&manager)
        .post("hello", stored_session())
        .await
        .unwrap_err();

    assert!(matches!(err, PostError::Transport(_)));
    assert_eq!(manager.client().posts().len(), 1);
}
