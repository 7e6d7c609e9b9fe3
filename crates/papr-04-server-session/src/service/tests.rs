use std::sync::Arc;

use serde_json::json;
use shared_crypto::{ScryptCost, Secp256k1KeyPair};
use shared_types::wire::{AcceptRequest, SubmitRequest};
use shared_types::{Classified, ErrorKind, Server};

use super::{ReviewServerClient, SessionManager};
use crate::adapters::{FakeReviewServer, ScriptedTransport};
use crate::domain::errors::SessionError;
use crate::domain::state::SessionState;
use crate::ports::outbound::{HttpResponse, TransportError};

const FAST: ScryptCost = ScryptCost { n: 1024, r: 8, p: 1 };
const CHANNEL: &str = "@alice";

fn server_record(public_key: Option<String>) -> Server {
    Server {
        name: "review".into(),
        channel_name: "@review".into(),
        url: "https://review.example/".into(),
        public_key,
    }
}

fn setup() -> (Arc<FakeReviewServer>, ReviewServerClient<FakeReviewServer>) {
    let fake = Arc::new(FakeReviewServer::new("review", "@review", FAST));
    let keypair = Secp256k1KeyPair::generate();
    fake.add_client(CHANNEL, keypair.public_key());

    let session = SessionManager::new(fake.clone(), &server_record(None), CHANNEL, keypair).unwrap();
    (fake, ReviewServerClient::new(session))
}

fn submit_request() -> SubmitRequest {
    SubmitRequest {
        title: "Paper".into(),
        article: "paper".into(),
        claim_name: "paper_r1".into(),
        authors: "Alice".into(),
        corresponding_author: CHANNEL.into(),
        revision: 1,
    }
}

#[tokio::test]
async fn test_handshake_learns_server_key() {
    let (fake, client) = setup();
    assert_eq!(client.session().server_public_key(), None);
    assert!(matches!(client.session().state(), SessionState::NoSession));

    client.session().connect().await.unwrap();

    assert_eq!(client.session().handshake_count(), 1);
    assert_eq!(client.session().server_public_key(), Some(fake.public_key()));
    assert!(matches!(
        client.session().state(),
        SessionState::TokenObtained { generation: 1, .. }
    ));
}

#[tokio::test]
async fn test_token_is_reused_across_calls() {
    let (fake, client) = setup();

    client.status("paper").await.unwrap();
    client.submit(&submit_request()).await.unwrap();

    assert_eq!(fake.issued(), 1);
    assert_eq!(fake.received("/api/submit/").len(), 1);
}

#[tokio::test]
async fn test_single_rejection_refreshes_once() {
    let (fake, client) = setup();
    client.session().connect().await.unwrap();
    fake.reject_next(1);

    let status = client.status("paper").await.unwrap();

    assert_eq!(status["state"], "under review");
    assert_eq!(client.session().handshake_count(), 2);
    assert_eq!(fake.received("/api/status/paper").len(), 1);
}

#[tokio::test]
async fn test_second_rejection_is_auth_expiry() {
    let (fake, client) = setup();
    client.session().connect().await.unwrap();
    fake.reject_next(2);

    let err = client.status("paper").await.unwrap_err();

    assert!(matches!(err, SessionError::AuthExpired { .. }));
    assert_eq!(err.kind(), ErrorKind::AuthExpiry);
    assert_eq!(client.session().handshake_count(), 2);
    assert!(client.session().state().is_failed());

    // a later call starts a fresh session
    client.status("paper").await.unwrap();
    assert_eq!(client.session().handshake_count(), 3);
}

#[tokio::test]
async fn test_concurrent_rejections_share_one_refresh() {
    let (fake, client) = setup();
    client.session().connect().await.unwrap();
    fake.expire_tokens();

    let (a, b, c) = tokio::join!(
        client.status("a"),
        client.status("b"),
        client.status("c"),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(client.session().handshake_count(), 2);
    assert_eq!(fake.issued(), 2);
}

#[tokio::test]
async fn test_changed_server_key_is_protocol_error() {
    let fake = Arc::new(FakeReviewServer::new("review", "@review", FAST));
    let keypair = Secp256k1KeyPair::generate();
    fake.add_client(CHANNEL, keypair.public_key());

    let impostor = FakeReviewServer::new("review", "@review", FAST).public_key();
    let session =
        SessionManager::new(fake.clone(), &server_record(Some(impostor)), CHANNEL, keypair).unwrap();

    let err = session.connect().await.unwrap_err();
    assert!(matches!(err, SessionError::Protocol { .. }));
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert_eq!(session.handshake_count(), 0);
}

#[tokio::test]
async fn test_known_server_key_is_accepted() {
    let fake = Arc::new(FakeReviewServer::new("review", "@review", FAST));
    let keypair = Secp256k1KeyPair::generate();
    fake.add_client(CHANNEL, keypair.public_key());

    let record = server_record(Some(fake.public_key()));
    let session = SessionManager::new(fake.clone(), &record, CHANNEL, keypair).unwrap();

    session.connect().await.unwrap();
    assert_eq!(session.server_public_key(), Some(fake.public_key()));
}

#[test]
fn test_undecodable_stored_key_is_rejected() {
    let fake = Arc::new(FakeReviewServer::new("review", "@review", FAST));
    let record = server_record(Some("not base64!".into()));

    let result = SessionManager::new(fake, &record, CHANNEL, Secp256k1KeyPair::generate());
    assert!(matches!(result, Err(SessionError::Protocol { .. })));
}

#[tokio::test]
async fn test_wrong_channel_key_cannot_open_tokens() {
    let fake = Arc::new(FakeReviewServer::new("review", "@review", FAST));
    fake.add_client(CHANNEL, Secp256k1KeyPair::generate().public_key());

    let session = SessionManager::new(
        fake.clone(),
        &server_record(None),
        CHANNEL,
        Secp256k1KeyPair::generate(),
    )
    .unwrap();

    let err = session.connect().await.unwrap_err();
    assert!(matches!(err, SessionError::Crypto { .. }));
    assert_eq!(err.kind(), ErrorKind::Crypto);
}

#[tokio::test]
async fn test_unknown_channel_handshake_is_http_error() {
    let fake = Arc::new(FakeReviewServer::new("review", "@review", FAST));
    let session = SessionManager::new(
        fake,
        &server_record(None),
        "@stranger",
        Secp256k1KeyPair::generate(),
    )
    .unwrap();

    match session.connect().await.unwrap_err() {
        SessionError::Http { status, path, .. } => {
            assert_eq!(status, 404);
            assert_eq!(path, "/api/token/@stranger");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_register_needs_created() {
    let (fake, client) = setup();

    let registered = client.register(CHANNEL).await.unwrap();
    assert_eq!(registered.name, "review");
    assert_eq!(registered.channel_name, "@review");
    assert_eq!(fake.received("/api/register/")[0]["channel_name"], CHANNEL);
    assert_eq!(fake.issued(), 0);

    fake.respond_with("/api/register/", 200);
    let err = client.register(CHANNEL).await.unwrap_err();
    assert!(matches!(err, SessionError::Http { status: 200, .. }));
}

#[tokio::test]
async fn test_accept_needs_exactly_ok() {
    let (fake, client) = setup();
    let request = AcceptRequest {
        base_claim_name: "paper".into(),
        channel_name: CHANNEL.into(),
        review_passphrase: "delta epsilon zeta".into(),
        revision: 1,
        title: "Paper".into(),
        abstract_text: String::new(),
        authors: "Alice".into(),
        tags: vec![],
        encryption_passphrase: Some("alpha beta gamma".into()),
    };

    client.accept(&request).await.unwrap();
    assert_eq!(
        fake.received("/api/accept")[0]["encryption_passphrase"],
        "alpha beta gamma"
    );

    fake.respond_with("/api/accept", 202);
    let err = client.accept(&request).await.unwrap_err();
    assert!(matches!(err, SessionError::Http { status: 202, .. }));
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    let transport = Arc::new(ScriptedTransport::new(|_| {
        Err(TransportError("connection refused".into()))
    }));
    let session = SessionManager::new(
        transport.clone(),
        &server_record(None),
        CHANNEL,
        Secp256k1KeyPair::generate(),
    )
    .unwrap();
    let client = ReviewServerClient::new(session);

    let err = client.status("paper").await.unwrap_err();
    assert!(matches!(err, SessionError::Network { .. }));
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(transport.count("/api/token/@alice"), 1);
}

#[tokio::test]
async fn test_garbled_token_response_is_protocol_error() {
    let transport = Arc::new(ScriptedTransport::new(|_| {
        Ok(HttpResponse {
            status: 200,
            body: json!({"unexpected": true}),
        })
    }));
    let session = SessionManager::new(
        transport,
        &server_record(None),
        CHANNEL,
        Secp256k1KeyPair::generate(),
    )
    .unwrap();

    assert!(matches!(
        session.connect().await,
        Err(SessionError::Protocol { .. })
    ));
}

#[tokio::test]
async fn test_bearer_is_sent_on_authenticated_calls_only() {
    let (fake, _) = setup();
    let keypair = Secp256k1KeyPair::generate();
    fake.add_client("@bob", keypair.public_key());

    let transport = Arc::new(ScriptedTransport::new({
        let fake = fake.clone();
        move |request| fake.handle(request)
    }));
    let session =
        SessionManager::new(transport.clone(), &server_record(None), "@bob", keypair).unwrap();
    let client = ReviewServerClient::new(session);

    client.register("@bob").await.unwrap();
    client.status("paper").await.unwrap();

    let requests = transport.requests();
    let register = requests.iter().find(|r| r.url.ends_with("/api/register/")).unwrap();
    let status = requests.iter().find(|r| r.url.ends_with("/api/status/paper")).unwrap();
    assert!(register.bearer.is_none());
    assert_eq!(status.bearer.as_deref(), Some("access-1"));
    assert_eq!(status.url, "https://review.example/api/status/paper");
}
