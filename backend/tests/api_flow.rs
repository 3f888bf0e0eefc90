//! End-to-end HTTP flows against a real social store.
//!
//! Two users launch the app, become friends, exchange a message and react to
//! it. The store is then flushed to disk and reloaded to confirm the graph
//! survives a restart.

use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use tempfile::TempDir;

use companion::Trace;
use companion::domain::ports::{
    NotificationSink, RecordStore, RecordingNotificationSink, ScriptedPublicIds,
};
use companion::domain::{LaunchVerifier, NotificationKind, PlatformId, SocialStore};
use companion::inbound::http::configure;
use companion::inbound::http::state::{HttpState, HttpStatePorts};
use companion::outbound::JsonRecordStore;
use companion::test_support::{LAUNCH_HEADER, launch_payload_for};

const BOT_TOKEN: &str = "4242:integration";
const ADA_PLATFORM: i64 = 501;
const BEN_PLATFORM: i64 = 502;
// Sequential ids are minted in launch order.
const ADA: &str = "10000000";
const BEN: &str = "10000001";

struct Harness {
    store: Arc<SocialStore>,
    sink: Arc<RecordingNotificationSink>,
}

#[fixture]
fn harness() -> Harness {
    let sink = Arc::new(RecordingNotificationSink::default());
    let notifications: Arc<dyn NotificationSink> = sink.clone();
    let store = Arc::new(SocialStore::new(
        Arc::new(ScriptedPublicIds::sequential()),
        Arc::new(DefaultClock),
        notifications,
    ));
    Harness { store, sink }
}

fn state(store: Arc<SocialStore>) -> web::Data<HttpState> {
    let verifier = LaunchVerifier::new(BOT_TOKEN, false).expect("verifier");
    web::Data::new(HttpState::new(
        HttpStatePorts::from_store(store),
        Arc::new(verifier),
        Arc::new(DefaultClock),
    ))
}

fn signed(request: test::TestRequest, platform_id: i64, name: &str) -> test::TestRequest {
    request.insert_header((LAUNCH_HEADER, launch_payload_for(BOT_TOKEN, platform_id, name)))
}

fn as_ada(request: test::TestRequest) -> test::TestRequest {
    signed(request, ADA_PLATFORM, "Ada")
}

fn as_ben(request: test::TestRequest) -> test::TestRequest {
    signed(request, BEN_PLATFORM, "Ben")
}

fn get(uri: &str) -> test::TestRequest {
    test::TestRequest::get().uri(uri)
}

fn post(uri: &str) -> test::TestRequest {
    test::TestRequest::post().uri(uri)
}

async fn json_body(response: ServiceResponse) -> (StatusCode, Value) {
    let status = response.status();
    let body = test::read_body(response).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

#[rstest]
#[actix_web::test]
async fn friendship_and_chat_flow(harness: Harness) {
    let Harness { store, sink } = harness;
    let app = test::init_service(
        App::new()
            .app_data(state(store))
            .wrap(Trace)
            .configure(configure),
    )
    .await;

    let res = test::call_service(&app, as_ada(get("/api/me")).to_request()).await;
    let (status, me) = json_body(res).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["publicId"], ADA);
    let res = test::call_service(&app, as_ben(get("/api/me")).to_request()).await;
    let (_, me) = json_body(res).await;
    assert_eq!(me["publicId"], BEN);

    let uri = format!("/api/action/add_friend/{BEN}");
    let res = test::call_service(&app, as_ada(post(&uri)).to_request()).await;
    let (status, relation) = json_body(res).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(relation["hasSentPendingRequest"], true);

    let res = test::call_service(&app, as_ben(get("/api/requests")).to_request()).await;
    let (_, requests) = json_body(res).await;
    assert_eq!(requests["received"][0]["publicId"], ADA);

    let uri = format!("/api/action/accept_friend/{ADA}");
    let res = test::call_service(&app, as_ben(post(&uri)).to_request()).await;
    let (status, relation) = json_body(res).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(relation["isFriend"], true);

    let uri = format!("/api/message/{BEN}");
    let request = as_ada(post(&uri)).set_json(json!({ "text": "hi Ben" }));
    let res = test::call_service(&app, request.to_request()).await;
    let (status, sent) = json_body(res).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sent["unread"], false);

    let res = test::call_service(&app, as_ben(get("/api/chats")).to_request()).await;
    let (_, chats) = json_body(res).await;
    assert_eq!(chats[0]["partnerId"], ADA);
    assert_eq!(chats[0]["unreadCount"], 1);

    let uri = format!("/api/chat/{ADA}");
    let res = test::call_service(&app, as_ben(get(&uri)).to_request()).await;
    let (_, messages) = json_body(res).await;
    assert_eq!(messages[0]["text"], "hi Ben");
    let res = test::call_service(&app, as_ben(get("/api/chats")).to_request()).await;
    let (_, chats) = json_body(res).await;
    assert_eq!(chats[0]["unreadCount"], 0);

    let uri = format!("/api/react/{ADA}/%F0%9F%94%A5");
    let res = test::call_service(&app, as_ben(post(&uri)).to_request()).await;
    let (status, reacted) = json_body(res).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reacted["reactions"][0]["emoji"], "🔥");

    // Ada's copy carries Ben's reaction too.
    let uri = format!("/api/chat/{BEN}");
    let res = test::call_service(&app, as_ada(get(&uri)).to_request()).await;
    let (_, messages) = json_body(res).await;
    assert_eq!(messages[0]["reactions"][0]["reactorId"], BEN);

    let kinds: Vec<(PlatformId, NotificationKind)> = sink
        .take()
        .into_iter()
        .map(|note| (note.recipient, note.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (
                PlatformId::new(BEN_PLATFORM),
                NotificationKind::FriendRequestReceived { from: "Ada".into() }
            ),
            (
                PlatformId::new(ADA_PLATFORM),
                NotificationKind::FriendRequestAccepted { by: "Ben".into() }
            ),
            (
                PlatformId::new(BEN_PLATFORM),
                NotificationKind::NewMessage { from: "Ada".into() }
            ),
        ]
    );
}

#[rstest]
#[actix_web::test]
async fn blocking_stops_messages_and_requests(harness: Harness) {
    let app = test::init_service(
        App::new()
            .app_data(state(harness.store))
            .configure(configure),
    )
    .await;
    test::call_service(&app, as_ada(get("/api/me")).to_request()).await;
    test::call_service(&app, as_ben(get("/api/me")).to_request()).await;

    let uri = format!("/api/action/block/{ADA}");
    let res = test::call_service(&app, as_ben(post(&uri)).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);

    let uri = format!("/api/message/{BEN}");
    let request = as_ada(post(&uri)).set_json(json!({ "text": "hello?" }));
    let res = test::call_service(&app, request.to_request()).await;
    let (status, body) = json_body(res).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "blocked");

    let uri = format!("/api/action/add_friend/{BEN}");
    let res = test::call_service(&app, as_ada(post(&uri)).to_request()).await;
    let (status, body) = json_body(res).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "blocked");
}

#[rstest]
#[actix_web::test]
async fn requests_without_a_valid_payload_are_rejected(harness: Harness) {
    let app = test::init_service(
        App::new()
            .app_data(state(harness.store.clone()))
            .configure(configure),
    )
    .await;

    let missing = test::call_service(&app, get("/api/me").to_request()).await;
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let forged = get("/api/me").insert_header((
        LAUNCH_HEADER,
        launch_payload_for("9:other", ADA_PLATFORM, "Ada"),
    ));
    let forged = test::call_service(&app, forged.to_request()).await;
    assert_eq!(forged.status(), StatusCode::FORBIDDEN);

    assert!(
        harness.store.is_empty(),
        "rejected callers are never registered"
    );
}

#[rstest]
#[actix_web::test]
async fn flushed_graph_survives_a_reload(harness: Harness) {
    let app = test::init_service(
        App::new()
            .app_data(state(harness.store.clone()))
            .configure(configure),
    )
    .await;
    test::call_service(&app, as_ada(get("/api/me")).to_request()).await;
    test::call_service(&app, as_ben(get("/api/me")).to_request()).await;
    let uri = format!("/api/action/add_friend/{BEN}");
    test::call_service(&app, as_ada(post(&uri)).to_request()).await;
    let uri = format!("/api/action/accept_friend/{ADA}");
    test::call_service(&app, as_ben(post(&uri)).to_request()).await;

    let dir = TempDir::new().expect("temp dir");
    let records = JsonRecordStore::open(dir.path().join("user_data")).expect("open records");
    let report = records
        .save(&harness.store.snapshot())
        .expect("save snapshot");
    assert_eq!(report.written, 2);

    let reloaded = Arc::new(SocialStore::from_snapshot(
        records.load().expect("load snapshot"),
        Arc::new(ScriptedPublicIds::sequential()),
        Arc::new(DefaultClock),
        Arc::new(RecordingNotificationSink::default()),
    ));
    assert!(reloaded.integrity_violations().is_empty());

    let app = test::init_service(App::new().app_data(state(reloaded)).configure(configure)).await;
    let res = test::call_service(&app, as_ada(get("/api/friends")).to_request()).await;
    let (status, friends) = json_body(res).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(friends[0]["publicId"], BEN);
    assert_eq!(friends[0]["displayName"], "Ben");
}
