use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use commander_api::{router, ApiState};
use commander_core::Game;

const TANK_MILITIA: &str = "6c4/11/11/11/11/11/11/11/5(TM)5/11/11/5C5 r - - 0 1";

fn app() -> Router {
    router(ApiState::shared(Game::new()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn game_state_and_moves() {
    let app = app();
    let (status, body) = send(&app, "GET", "/game", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["turn"], "red");
    assert_eq!(body["pieces"].as_array().unwrap().len(), 36);
    assert_eq!(body["session"], Value::Null);

    let (status, body) = send(&app, "GET", "/moves?square=c5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().contains(&json!("c6")));

    let (_, body) = send(&app, "GET", "/moves?square=c5&verbose=true", None).await;
    assert!(body
        .as_array()
        .unwrap()
        .iter()
        .all(|m| m["from"] == "c5" && m["kind"].is_string()));

    let (status, body) = send(&app, "GET", "/moves?square=z99", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("z99"));
}

#[tokio::test]
async fn play_undo_and_history() {
    let app = app();
    let (status, body) = send(&app, "POST", "/move", Some(json!({"san": "c6"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["san"], "c6");
    assert_eq!(body["move"]["kind"], "normal");
    assert_eq!(body["state"]["turn"], "blue");

    let (status, _) = send(&app, "POST", "/move", Some(json!({"from": "c8", "to": "c7"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, "GET", "/history", None).await;
    assert_eq!(body["moves"], json!(["c6", "c7"]));

    let (status, body) = send(&app, "POST", "/undo", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["history"], json!(["c6"]));

    let (status, body) = send(&app, "POST", "/move", Some(json!({"san": "Tz1"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    send(&app, "POST", "/reset", None).await;
    let (status, _) = send(&app, "POST", "/undo", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn load_rejects_bad_fen() {
    let app = app();
    let (status, body) = send(&app, "POST", "/load", Some(json!({"fen": "nonsense"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());

    let (status, body) = send(&app, "POST", "/load", Some(json!({"fen": TANK_MILITIA}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pieces"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn deploy_session_over_http() {
    let app = app();
    send(&app, "POST", "/load", Some(json!({"fen": TANK_MILITIA}))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/move",
        Some(json!({"from": "f4", "to": "f5", "piece": "militia", "deploy": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["san"], "M>f5");

    let (_, session) = send(&app, "GET", "/session", None).await;
    assert_eq!(session["origin"], "f4");
    assert_eq!(session["undecided"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "POST", "/session/commit", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["san"], "M>f5,T=");
    assert_eq!(body["state"]["turn"], "blue");

    let (_, session) = send(&app, "GET", "/session", None).await;
    assert_eq!(session, Value::Null);

    let (status, body) = send(&app, "POST", "/session/cancel", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}
