//! HttpGateway against a local HTTP server: request shape, response decoding
//! and failure classification.

mod common;

use std::time::Duration;

use common::stub_server::StubServer;
use look1nce::gateway::{ApiBase, GatewayError, GatewayOperation, HttpGateway, TryOnBackend};
use look1nce::media::ImagePayload;
use look1nce::model::{GarmentCategory, ProcessedPath, ResultPath};
use look1nce::ErrorKind;

fn gateway(server: &StubServer) -> HttpGateway {
    HttpGateway::new(
        ApiBase::parse(&server.base_url).unwrap(),
        Duration::from_secs(5),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn shirt() -> ImagePayload {
    ImagePayload::new("shirt.png", "image/png", b"PNGDATA".to_vec())
}

#[tokio::test]
async fn test_preprocess_garment_request_and_response() {
    let server = StubServer::start(vec![(
        200,
        r#"{"processed_path":"g/1.png","status":"success","message":"ok"}"#,
    )])
    .await;
    let gateway = gateway(&server);

    let path = gateway
        .preprocess_garment(shirt(), GarmentCategory::Dress)
        .await
        .unwrap();
    assert_eq!(path.as_str(), "g/1.png");

    let requests = server.finish().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/preprocess/cloth");
    assert!(request
        .header("content-type")
        .unwrap()
        .starts_with("multipart/form-data"));

    let body = request.body_text();
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="shirt.png""#));
    assert!(body.contains("PNGDATA"));
    assert_eq!(request.form_text("category").as_deref(), Some("dress"));
}

#[tokio::test]
async fn test_preprocess_person_request() {
    let server = StubServer::start(vec![(200, r#"{"processed_path":"p/1.png"}"#)]).await;
    let gateway = gateway(&server);

    let payload = ImagePayload::new("camera-photo.jpg", "image/jpeg", b"JPEG".to_vec());
    let path = gateway.preprocess_person(payload).await.unwrap();
    assert_eq!(path.as_str(), "p/1.png");

    let requests = server.finish().await;
    assert_eq!(requests[0].path, "/api/preprocess/person");
    let body = requests[0].body_text();
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="camera-photo.jpg""#));
    assert!(requests[0].form_text("category").is_none());
}

#[tokio::test]
async fn test_synthesize_sends_processed_paths() {
    let server = StubServer::start(vec![(
        200,
        r#"{"result_path":"outputs/r/1.png","status":"success"}"#,
    )])
    .await;
    let gateway = gateway(&server);

    let result = gateway
        .synthesize(
            &ProcessedPath::new("g/1.png").unwrap(),
            &ProcessedPath::new("p/1.png").unwrap(),
            GarmentCategory::LowerBody,
        )
        .await
        .unwrap();
    assert_eq!(result.as_str(), "outputs/r/1.png");
    assert_eq!(
        gateway.result_asset_url(&result).as_str(),
        format!("{}/api/result/1.png", server.base_url)
    );

    let requests = server.finish().await;
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/tryon");
    assert_eq!(request.form_text("cloth_path").as_deref(), Some("g/1.png"));
    assert_eq!(request.form_text("person_path").as_deref(), Some("p/1.png"));
    assert_eq!(request.form_text("category").as_deref(), Some("lower_body"));
}

#[tokio::test]
async fn test_empty_paths_are_invalid_responses() {
    let server = StubServer::start(vec![
        (200, r#"{"processed_path":""}"#),
        (200, r#"{"result_path":""}"#),
        (200, r#"{"unexpected":true}"#),
    ])
    .await;
    let gateway = gateway(&server);

    let err = gateway
        .preprocess_garment(shirt(), GarmentCategory::UpperBody)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::InvalidResponse {
            operation: GatewayOperation::PreprocessGarment,
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);

    let err = gateway
        .synthesize(
            &ProcessedPath::new("g/1.png").unwrap(),
            &ProcessedPath::new("p/1.png").unwrap(),
            GarmentCategory::UpperBody,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::InvalidResponse { .. }));

    let err = gateway.preprocess_person(shirt()).await.unwrap_err();
    assert!(matches!(err, GatewayError::InvalidResponse { .. }));

    server.finish().await;
}

#[tokio::test]
async fn test_failure_statuses_are_classified() {
    let server = StubServer::start(vec![
        (422, r#"{"detail":"Invalid category"}"#),
        (
            422,
            r#"{"detail":[{"loc":["body","file"],"msg":"field required","type":"missing"}]}"#,
        ),
        (503, r#"{"detail":"Model overloaded"}"#),
        (500, ""),
    ])
    .await;
    let gateway = gateway(&server);

    let err = gateway
        .preprocess_garment(shirt(), GarmentCategory::Dress)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GatewayError::UpstreamRejected { status: 422, .. }
    ));
    assert_eq!(err.to_string(), "Invalid category");

    let err = gateway.preprocess_person(shirt()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UpstreamRejected);
    assert_eq!(err.to_string(), "field required");

    let garment = ProcessedPath::new("g/1.png").unwrap();
    let person = ProcessedPath::new("p/1.png").unwrap();
    let synthesize = || gateway.synthesize(&garment, &person, GarmentCategory::Dress);
    let err = synthesize().await.unwrap_err();
    assert!(matches!(
        err,
        GatewayError::UpstreamUnavailable {
            status: Some(503),
            ..
        }
    ));
    assert_eq!(err.to_string(), "Model overloaded");

    let err = synthesize().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Failed to generate try-on result (500)");

    server.finish().await;
}

#[tokio::test]
async fn test_health_cleanup_and_download() {
    let server = StubServer::start(vec![
        (200, r#"{"status":"healthy","services":{"tryon":"ready"}}"#),
        (200, r#"{"message":"cleaned"}"#),
        (200, "RESULTBYTES"),
    ])
    .await;
    let gateway = gateway(&server);

    let health = gateway.health().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.services.get("tryon").map(String::as_str), Some("ready"));

    gateway.cleanup().await.unwrap();

    let bytes = gateway
        .fetch_result(&ResultPath::new("outputs/r/1.png").unwrap())
        .await
        .unwrap();
    assert_eq!(bytes, b"RESULTBYTES");

    let requests = server.finish().await;
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/health");
    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(requests[1].path, "/api/cleanup");
    assert_eq!(requests[2].method, "GET");
    assert_eq!(requests[2].path, "/api/result/1.png");
}
