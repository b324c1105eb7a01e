// SPDX-FileCopyrightText: 2026 Rubric Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end flow: webhook intake -> queue -> worker batch -> widget summary,
//! with the helpdesk and model APIs mocked.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use rubric_anthropic::AnthropicClient;
use rubric_gateway::{GatewayState, QueuePolicy, build_router};
use rubric_grading::{Grader, Worker};
use rubric_helpdesk::HelpdeskClient;
use rubric_storage::Database;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup_db() -> (Database, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("e2e.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
    (db, dir)
}

fn build_state(db: Database, helpdesk_url: &str, llm_url: &str) -> GatewayState {
    let helpdesk = HelpdeskClient::new("example.gorgias.com", "qa@example.com", "key")
        .unwrap()
        .with_base_url(helpdesk_url.to_string());
    let llm = AnthropicClient::new(
        "sk-test".to_string(),
        "2023-06-01".to_string(),
        "claude-sonnet-4-20250514".to_string(),
    )
    .unwrap()
    .with_base_url(llm_url.to_string());
    let grader = Grader::new(
        db.clone(),
        helpdesk.clone(),
        llm,
        "example.gorgias.com".to_string(),
        4000,
    );
    GatewayState {
        db: db.clone(),
        helpdesk: Some(helpdesk),
        worker: Worker::new(db, grader, 10),
        policy: QueuePolicy {
            delay_hours: 24,
            recent_window_days: 7,
        },
    }
}

async fn mount_helpdesk(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/tickets/5001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 5001,
            "subject": "Broken dashcam",
            "status": "closed",
            "tags": [],
            "customer": { "name": "Dana" },
            "closed_datetime": "2026-02-10T10:00:00Z"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tickets/5001/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {
                    "sender": { "name": "Dana", "type": "customer" },
                    "body_text": "My dashcam arrived broken",
                    "created_datetime": "2026-02-10T09:00:00Z"
                },
                {
                    "sender": { "name": "Alice", "type": "agent" },
                    "body_text": "Sorry about that! Could you send a photo?",
                    "created_datetime": "2026-02-10T09:05:00Z"
                }
            ],
            "meta": { "next_cursor": null }
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tickets/5001/messages"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": 1 })))
        .mount(server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/tickets/5001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": 5001 })))
        .mount(server)
        .await;
}

fn analysis_body() -> serde_json::Value {
    let criterion = serde_json::json!({ "score": 4, "explanation": "solid" });
    let category4 = |keys: [&str; 4]| {
        serde_json::Value::Object(
            keys.iter()
                .map(|k| (k.to_string(), criterion.clone()))
                .collect(),
        )
    };
    let analysis = serde_json::json!({
        "ticketId": "5001",
        "agents": [{
            "agentName": "Alice",
            "isEscalationAgent": false,
            "zeroToleranceViolation": false,
            "violationNotes": "",
            "scores": {
                "softSkills": category4(["tone", "empathy", "professionalism", "clarity"]),
                "issueUnderstanding": category4([
                    "correctIdentification", "rootCauseAnalysis",
                    "customerContext", "escalationRecognition"
                ]),
                "productProcess": category4([
                    "policyAccuracy", "sopAdherence",
                    "solutionCorrectness", "escalationProcess"
                ]),
                "toolsUtilization": {
                    "gorgiasUsage": criterion, "internalNotes": criterion,
                    "shopifyUsage": criterion
                }
            },
            "overallAnalysis": "handled well",
            "suggestedFeedback": "ask for the order number up front"
        }]
    });
    serde_json::json!({
        "id": "msg_analysis",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": analysis.to_string() }],
        "model": "claude-sonnet-4-20250514",
        "usage": { "input_tokens": 900, "output_tokens": 300 }
    })
}

async fn send(
    router: &axum::Router,
    req: Request<Body>,
) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn webhook_to_widget_flow() {
    let helpdesk = MockServer::start().await;
    let llm = MockServer::start().await;
    mount_helpdesk(&helpdesk).await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(analysis_body()))
        .mount(&llm)
        .await;

    let (db, _dir) = setup_db().await;
    let router = build_router(build_state(db.clone(), &helpdesk.uri(), &llm.uri()), None);

    // 1. Webhook on ticket close queues the ticket with a 24h deadline.
    let (status, body) = send(
        &router,
        Request::post("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "ticket_id": "5001" }).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ticket_id"], "5001");
    assert_eq!(body["message"], "ticket queued for grading in 24 hour(s)");
    assert!(body["process_at"].is_string());

    // 2. Nothing is due yet; a worker run is a no-op.
    let (status, body) = send(
        &router,
        Request::get("/process").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["successful"], 0);

    // Pull the deadline into the past, as if 24 hours elapsed.
    db.connection()
        .call(|conn| {
            conn.execute(
                "UPDATE grading_queue SET process_at = '2020-01-01T00:00:00.000Z'",
                [],
            )?;
            Ok::<_, rusqlite::Error>(())
        })
        .await
        .unwrap();

    // 3. The worker grades the ticket through the mocked model.
    let (status, body) = send(
        &router,
        Request::post("/process").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["successful"], 1);
    assert_eq!(body["failed"], 0);
    assert_eq!(body["results"][0]["ticket_id"], "5001");

    // 4. The widget summary reports the stored evaluation.
    let (status, body) = send(
        &router,
        Request::get("/evaluations?ticket_id=5001")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "graded");
    assert_eq!(body["agents"][0]["name"], "Alice");
    assert_eq!(body["agents"][0]["score"], "80.0%");
    assert_eq!(body["agents"][0]["grade"], "B");

    // 5. A second close event inside the re-grade window is ignored.
    let (status, body) = send(
        &router,
        Request::post("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "ticket_id": "5001" }).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "ticket already graded recently");

    db.close().await.unwrap();
}

#[tokio::test]
async fn webhook_skips_open_tickets() {
    let helpdesk = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tickets/6001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": 6001,
            "subject": "Still open",
            "status": "open",
            "tags": []
        })))
        .mount(&helpdesk)
        .await;

    let (db, _dir) = setup_db().await;
    let llm_url = "http://127.0.0.1:1/unused".to_string();
    let router = build_router(build_state(db.clone(), &helpdesk.uri(), &llm_url), None);

    let (status, body) = send(
        &router,
        Request::post("/webhook")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({ "ticket_id": "6001" }).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "not a closed ticket, skipping");

    db.close().await.unwrap();
}
