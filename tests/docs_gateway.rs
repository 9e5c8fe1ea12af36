// tests/docs_gateway.rs
//! The `docs` operation: credential handling, failure policy and the
//! serialised outcome.

mod common;

use common::{BrokenLogin, FakeConnector, FakeLark, FakeLogin};
use lark2md::{
    BearerToken, CredentialProvider, DocsGateway, DocsOutcome, MediaStore, ReloginPolicy,
    SessionStore,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const REPORT_URL: &str = "https://acme.larksuite.com/docx/doxcnReport?from=share";

fn session(token: &str) -> Arc<SessionStore> {
    Arc::new(SessionStore::with_token(BearerToken::new(token).unwrap()))
}

fn gateway(connector: &FakeConnector, credentials: Arc<SessionStore>, dir: &std::path::Path) -> DocsGateway {
    DocsGateway::new(
        Arc::new(connector.clone()),
        credentials,
        Arc::new(FakeLogin),
        MediaStore::new(dir),
    )
}

#[tokio::test]
async fn test_success_outcome() {
    let connector = FakeConnector::new(FakeLark::with_report_pages());
    let dir = tempfile::tempdir().unwrap();
    let gateway = gateway(&connector, session("u-user"), dir.path());

    let outcome = gateway.docs(REPORT_URL).await;

    assert!(outcome.is_success());
    assert_eq!(*connector.tokens.lock(), vec!["u-user"]);
    assert_eq!(connector.lark.calls()[0], "blocks:doxcnReport:");

    let value = outcome.to_json();
    assert_eq!(value["success"], true);
    assert_eq!(value["document_id"], "doxcnReport");
    assert_eq!(value["url"], REPORT_URL);
    assert_eq!(value["content"], "Report\n\n## Intro\n\n- item");
    assert_eq!(value["blocks"].as_array().unwrap().len(), 3);
    assert_eq!(value["blocks"], value["raw_content"]["blocks"]);
    assert_eq!(value["raw_content"]["image_urls"], json!({}));
    assert_eq!(value["raw_content"]["board_tokens"], json!([]));
}

#[tokio::test]
async fn test_missing_token_needs_login() {
    let connector = FakeConnector::new(FakeLark::with_report_pages());
    let dir = tempfile::tempdir().unwrap();
    let gateway = gateway(&connector, Arc::new(SessionStore::new()), dir.path());

    let outcome = gateway.docs(REPORT_URL).await;

    match &outcome {
        DocsOutcome::NeedsLogin { error, code, prompt } => {
            assert_eq!(error, "Authentication required. Please login first.");
            assert_eq!(*code, None);
            assert_eq!(prompt.state, "s1");
        }
        other => panic!("expected NeedsLogin, got {:?}", other),
    }
    assert!(connector.tokens.lock().is_empty());
    assert!(connector.lark.calls().is_empty());

    let value = outcome.to_json();
    assert_eq!(value["needsLogin"], true);
    assert_eq!(value["next_step"], "Run exchange with the code");
}

#[tokio::test]
async fn test_login_flow_unavailable_is_plain_failure() {
    let connector = FakeConnector::new(FakeLark::new());
    let dir = tempfile::tempdir().unwrap();
    let gateway = DocsGateway::new(
        Arc::new(connector),
        Arc::new(SessionStore::new()),
        Arc::new(BrokenLogin),
        MediaStore::new(dir.path()),
    );

    match gateway.docs(REPORT_URL).await {
        DocsOutcome::Failure { error, code } => {
            assert!(error.contains("LARK_CLIENT_ID"));
            assert_eq!(code, None);
        }
        other => panic!("expected Failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unextractable_document_id() {
    let connector = FakeConnector::new(FakeLark::new());
    let dir = tempfile::tempdir().unwrap();
    let gateway = gateway(&connector, session("u-user"), dir.path());

    let outcome = gateway.docs("https://acme.larksuite.com/").await;

    assert_eq!(
        outcome.to_json(),
        json!({"success": false, "error": "Could not extract document ID from URL"})
    );
    assert!(connector.lark.calls().is_empty());
}

#[tokio::test]
async fn test_any_failure_clears_session_and_requests_login() {
    let lark = FakeLark::with_report_pages();
    lark.fail_blocks(500, None, "");
    let connector = FakeConnector::new(lark);
    let credentials = session("u-user");
    let dir = tempfile::tempdir().unwrap();
    let gateway = gateway(&connector, credentials.clone(), dir.path());

    let outcome = gateway.docs(REPORT_URL).await;

    match &outcome {
        DocsOutcome::NeedsLogin { error, code, .. } => {
            assert_eq!(error, "API error: Internal Server Error. Please login again.");
            assert_eq!(*code, Some(500));
        }
        other => panic!("expected NeedsLogin, got {:?}", other),
    }
    assert!(credentials.access_token().is_none());
    assert_eq!(outcome.to_json()["code"], 500);
}

#[tokio::test]
async fn test_provider_message_is_reported() {
    let lark = FakeLark::new();
    lark.fail_blocks(200, Some(1770002), "document not found");
    let connector = FakeConnector::new(lark);
    let dir = tempfile::tempdir().unwrap();
    let gateway = gateway(&connector, session("u-user"), dir.path());

    match gateway.docs(REPORT_URL).await {
        DocsOutcome::NeedsLogin { error, code, .. } => {
            assert_eq!(error, "API error: document not found. Please login again.");
            assert_eq!(code, Some(1770002));
        }
        other => panic!("expected NeedsLogin, got {:?}", other),
    }
}

#[tokio::test]
async fn test_auth_only_policy_keeps_session_for_server_errors() {
    let lark = FakeLark::new();
    lark.fail_blocks(500, None, "");
    let connector = FakeConnector::new(lark);
    let credentials = session("u-user");
    let dir = tempfile::tempdir().unwrap();
    let gateway = gateway(&connector, credentials.clone(), dir.path())
        .with_relogin_policy(ReloginPolicy::AuthFailuresOnly);

    match gateway.docs(REPORT_URL).await {
        DocsOutcome::Failure { error, code } => {
            assert_eq!(error, "API error: Internal Server Error");
            assert_eq!(code, Some(500));
        }
        other => panic!("expected Failure, got {:?}", other),
    }
    assert!(credentials.access_token().is_some());
}

#[tokio::test]
async fn test_auth_only_policy_relogs_on_expired_token() {
    let lark = FakeLark::new();
    lark.fail_blocks(200, Some(99991677), "token expired");
    let connector = FakeConnector::new(lark);
    let credentials = session("u-user");
    let dir = tempfile::tempdir().unwrap();
    let gateway = gateway(&connector, credentials.clone(), dir.path())
        .with_relogin_policy(ReloginPolicy::AuthFailuresOnly);

    let outcome = gateway.docs(REPORT_URL).await;

    assert!(matches!(
        outcome,
        DocsOutcome::NeedsLogin {
            code: Some(99991677),
            ..
        }
    ));
    assert!(credentials.access_token().is_none());
}
