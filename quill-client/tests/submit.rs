use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use quill_client::{ClientConfig, PublishSession, SubmissionClient, SubmitError};
use quill_core::{BlockKind, FileRef, PostDraft, ValidationError};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Notify;

#[derive(Debug, Clone)]
struct Field {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
}

#[derive(Clone)]
struct FakeRelay {
    hits: Arc<AtomicUsize>,
    fields: Arc<Mutex<Vec<Field>>>,
    api_keys: Arc<Mutex<Vec<Option<String>>>>,
    status: StatusCode,
    body: String,
    release: Option<Arc<Notify>>,
}

impl FakeRelay {
    fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            hits: Arc::new(AtomicUsize::new(0)),
            fields: Arc::new(Mutex::new(Vec::new())),
            api_keys: Arc::new(Mutex::new(Vec::new())),
            status,
            body: body.into(),
            release: None,
        }
    }

    fn published() -> Self {
        Self::new(
            StatusCode::OK,
            json!({
                "success": true,
                "message": "Published!",
                "posts": [
                    {"blogId": "b1", "url": "https://b1.example/hello"},
                    {"blogId": "b2", "url": ""}
                ]
            })
            .to_string(),
        )
    }

    fn hold_until(mut self, release: Arc<Notify>) -> Self {
        self.release = Some(release);
        self
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn field(&self, name: &str) -> Field {
        self.fields
            .lock()
            .unwrap()
            .iter()
            .find(|f| f.name == name)
            .cloned()
            .unwrap_or_else(|| panic!("field {name} not received"))
    }

    fn field_names(&self) -> Vec<String> {
        self.fields.lock().unwrap().iter().map(|f| f.name.clone()).collect()
    }

    async fn spawn(self) -> (String, Self) {
        let router = Router::new()
            .route("/api/blog", post(receive))
            .with_state(self.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{addr}/api/blog"), self)
    }
}

async fn receive(
    State(relay): State<FakeRelay>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, String) {
    relay.hits.fetch_add(1, Ordering::SeqCst);
    relay.api_keys.lock().unwrap().push(
        headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.unwrap().to_vec();
        relay.fields.lock().unwrap().push(Field {
            name,
            file_name,
            content_type,
            data,
        });
    }

    if let Some(release) = &relay.release {
        release.notified().await;
    }

    (relay.status, relay.body.clone())
}

fn client(endpoint: &str) -> SubmissionClient {
    SubmissionClient::new(ClientConfig::new(endpoint)).unwrap()
}

fn add_text(draft: &mut PostDraft, text: &str) {
    let blocks = draft.blocks_mut();
    let id = blocks.add_block();
    blocks.set_block_kind(id, BlockKind::Text).unwrap();
    blocks.set_text(id, text).unwrap();
}

fn add_image(draft: &mut PostDraft, file: FileRef) {
    let blocks = draft.blocks_mut();
    let id = blocks.add_block();
    blocks.set_block_kind(id, BlockKind::Image).unwrap();
    blocks.set_image(id, file).unwrap();
}

fn valid_draft() -> PostDraft {
    let mut draft = PostDraft::new();
    draft.set_title("Hello world");
    draft.set_targets("b1, b2");
    add_text(&mut draft, "first paragraph");
    draft
}

#[tokio::test]
async fn empty_title_never_reaches_the_network() {
    let (endpoint, relay) = FakeRelay::published().spawn().await;
    let mut draft = valid_draft();
    draft.set_title("   ");

    let err = client(&endpoint).submit(&draft).await.unwrap_err();

    assert_eq!(err.validation(), Some(ValidationError::MissingTitle));
    assert!(err.is_local());
    assert_eq!(relay.hits(), 0);
}

#[tokio::test]
async fn missing_targets_and_empty_blocks_are_local_failures() {
    let (endpoint, relay) = FakeRelay::published().spawn().await;
    let client = client(&endpoint);

    let mut no_targets = valid_draft();
    no_targets.set_targets(" ,, ");
    let err = client.submit(&no_targets).await.unwrap_err();
    assert_eq!(err.validation(), Some(ValidationError::MissingTargets));

    let mut no_blocks = PostDraft::new();
    no_blocks.set_title("t");
    no_blocks.set_targets("b1");
    add_text(&mut no_blocks, "   ");
    let err = client.submit(&no_blocks).await.unwrap_err();
    assert_eq!(err.validation(), Some(ValidationError::NoContentBlocks));
    assert_eq!(err.notification(), "Please add at least one content block");

    assert_eq!(relay.hits(), 0);
}

#[tokio::test]
async fn targets_can_be_optional() {
    let (endpoint, relay) = FakeRelay::published().spawn().await;
    let client = SubmissionClient::new(ClientConfig::new(&endpoint).require_targets(false)).unwrap();
    let mut draft = valid_draft();
    draft.set_targets("");

    client.submit(&draft).await.unwrap();

    assert_eq!(relay.field_names(), ["title", "blocks"]);
}

#[tokio::test]
async fn multipart_body_matches_the_contract() {
    let (endpoint, relay) = FakeRelay::published().spawn().await;
    let client = SubmissionClient::new(ClientConfig::new(&endpoint).with_api_key("public-key")).unwrap();

    let mut draft = PostDraft::new();
    draft.set_title("  Hello world ");
    draft.set_targets("b1, b2 ,,b1");
    add_text(&mut draft, "a");
    add_image(&mut draft, FileRef::from_bytes("f1.png", b"first-image".to_vec()).with_content_type("image/png"));
    add_text(&mut draft, "");
    add_image(&mut draft, FileRef::from_bytes("f2.jpg", b"second-image".to_vec()));

    let published = client.submit(&draft).await.unwrap();

    assert_eq!(relay.field_names(), ["title", "image_0", "image_1", "blocks", "blogIds"]);
    assert_eq!(relay.field("title").data, b"Hello world");

    let image_0 = relay.field("image_0");
    assert_eq!(image_0.file_name.as_deref(), Some("f1.png"));
    assert_eq!(image_0.data, b"first-image");
    assert_eq!(relay.field("image_1").data, b"second-image");

    let blocks: Value = serde_json::from_slice(&relay.field("blocks").data).unwrap();
    assert_eq!(
        blocks,
        json!([
            {"type": "text", "value": "a"},
            {"type": "image", "fileKey": "image_0"},
            {"type": "image", "fileKey": "image_1"}
        ])
    );
    let targets: Value = serde_json::from_slice(&relay.field("blogIds").data).unwrap();
    assert_eq!(targets, json!(["b1", "b2", "b1"]));

    assert_eq!(relay.api_keys.lock().unwrap().as_slice(), [Some("public-key".to_string())]);

    assert_eq!(published.notification(), "Published!");
    assert_eq!(published.posts.len(), 1);
    assert_eq!(published.posts[0].identifier, "b1");
    assert_eq!(published.posts[0].url, "https://b1.example/hello");
}

#[tokio::test]
async fn files_on_disk_are_streamed_at_send_time() {
    let dir = std::env::temp_dir().join(format!("quill-client-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("cover.png");
    tokio::fs::write(&path, b"original").await.unwrap();

    let (endpoint, relay) = FakeRelay::published().spawn().await;
    let mut draft = valid_draft();
    add_image(&mut draft, FileRef::from_path(&path).await.unwrap());

    // Same length, new content: the bytes sent are the ones on disk at submit time.
    tokio::fs::write(&path, b"replaced").await.unwrap();
    client(&endpoint).submit(&draft).await.unwrap();

    let image = relay.field("image_0");
    assert_eq!(image.file_name.as_deref(), Some("cover.png"));
    assert_eq!(image.content_type.as_deref(), Some("image/png"));
    assert_eq!(image.data, b"replaced");

    tokio::fs::remove_dir_all(&dir).await.unwrap();
}

#[tokio::test]
async fn unreadable_file_is_reported_before_sending() {
    let dir = std::env::temp_dir().join(format!("quill-client-gone-{}", std::process::id()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("gone.png");
    tokio::fs::write(&path, b"x").await.unwrap();

    let (endpoint, relay) = FakeRelay::published().spawn().await;
    let mut draft = valid_draft();
    add_image(&mut draft, FileRef::from_path(&path).await.unwrap());
    tokio::fs::remove_dir_all(&dir).await.unwrap();

    let err = client(&endpoint).submit(&draft).await.unwrap_err();
    assert!(matches!(&err, SubmitError::Attachment { field, .. } if field == "image_0"));
    assert_eq!(relay.hits(), 0);
}

#[tokio::test]
async fn unreachable_relay_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}/api/blog"))
        .submit(&valid_draft())
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::Network { .. }));
    assert!(!err.is_local());
}

#[tokio::test]
async fn deadline_elapsing_is_a_network_error() {
    let release = Arc::new(Notify::new());
    let (endpoint, _relay) = FakeRelay::published()
        .hold_until(Arc::clone(&release))
        .spawn()
        .await;
    let client = SubmissionClient::new(
        ClientConfig::new(&endpoint).with_timeout(Duration::from_millis(200)),
    )
    .unwrap();

    let err = client.submit(&valid_draft()).await.unwrap_err();

    assert!(matches!(&err, SubmitError::Network { source } if source.is_timeout()));
    release.notify_one();
}

#[tokio::test]
async fn non_json_success_is_an_invalid_response() {
    let (endpoint, _relay) = FakeRelay::new(StatusCode::OK, "<html>done</html>").spawn().await;

    let err = client(&endpoint).submit(&valid_draft()).await.unwrap_err();

    assert!(matches!(err, SubmitError::InvalidResponse { status: 200, .. }));
    assert_eq!(err.notification(), "Invalid response from server");
}

#[tokio::test]
async fn relay_fault_is_rejected_with_its_message() {
    let (endpoint, _relay) = FakeRelay::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"success":false,"message":"Server error. Please try again."}"#,
    )
    .spawn()
    .await;

    let err = client(&endpoint).submit(&valid_draft()).await.unwrap_err();

    assert!(err.is_server_fault());
    assert_eq!(err.notification(), "Server error. Please try again.");
}

#[tokio::test]
async fn unauthorized_without_body_uses_the_fallback_message() {
    let (endpoint, _relay) = FakeRelay::new(StatusCode::UNAUTHORIZED, "").spawn().await;

    let err = client(&endpoint).submit(&valid_draft()).await.unwrap_err();

    assert!(matches!(err, SubmitError::RequestRejected { status: 401, message: None }));
    assert_eq!(err.notification(), "Request failed");
}

#[tokio::test]
async fn second_submission_is_refused_while_one_is_in_flight() {
    let release = Arc::new(Notify::new());
    let (endpoint, relay) = FakeRelay::published()
        .hold_until(Arc::clone(&release))
        .spawn()
        .await;
    let client = client(&endpoint);

    let first = tokio::spawn({
        let client = client.clone();
        async move { client.submit(&valid_draft()).await }
    });

    while relay.hits() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(client.is_submitting());

    let err = client.submit(&valid_draft()).await.unwrap_err();
    assert!(matches!(err, SubmitError::SubmissionInFlight));

    release.notify_one();
    first.await.unwrap().unwrap();

    assert!(!client.is_submitting());
    assert_eq!(relay.hits(), 1);
}

#[tokio::test]
async fn session_resets_only_after_publishing() {
    let (ok_endpoint, _ok) = FakeRelay::published().spawn().await;
    let (bad_endpoint, _bad) = FakeRelay::new(
        StatusCode::OK,
        r#"{"success":false,"message":"Blog not found"}"#,
    )
    .spawn()
    .await;

    let mut failing = PublishSession::with_draft(client(&bad_endpoint), valid_draft());
    let err = failing.publish().await.unwrap_err();
    assert_eq!(err.notification(), "Blog not found");
    assert_eq!(failing.draft().title(), "Hello world");
    assert_eq!(failing.draft().blocks().len(), 3);

    let mut session = PublishSession::with_draft(client(&ok_endpoint), valid_draft());
    session.publish().await.unwrap();
    assert_eq!(session.draft().title(), "");
    assert_eq!(session.draft().targets_input(), "");
    let kinds: Vec<_> = session.draft().blocks().iter().map(|b| b.kind()).collect();
    assert_eq!(kinds, [BlockKind::Unset, BlockKind::Unset]);
}
