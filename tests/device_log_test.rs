use axum::body::Body;
use axum::http::{Request, StatusCode};
use otaserve::server::auth::basic_header;
use otaserve::server::{create_router, ApiState, Config};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tower::ServiceExt;

fn test_state(log_dir: &Path) -> ApiState {
    let mut config = Config::default();
    config.paths.firmware_dir = log_dir.to_path_buf();
    config.paths.log_dir = log_dir.to_path_buf();
    ApiState::new(&config)
}

fn log_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/log")
        .header("content-type", "application/json")
        .header("authorization", basic_header("admin", "myadminpw"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_log_append_flow() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    let app = create_router(test_state(root.path()));

    let response = app
        .clone()
        .oneshot(log_request(json!({ "id": "esp-01", "content": "boot ok\n" })))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Log appended successfully"
    );

    let path = root.path().join("esp-01.log");
    assert_eq!(fs::read_to_string(&path)?, "boot ok\n");

    // Second fragment appends with no separator.
    let response = app
        .clone()
        .oneshot(log_request(json!({ "id": "esp-01", "content": "wifi up" })))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(fs::read_to_string(&path)?, "boot ok\nwifi up");

    Ok(())
}

#[tokio::test]
async fn test_log_content_is_percent_decoded() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    let app = create_router(test_state(root.path()));

    let response = app
        .oneshot(log_request(json!({
            "id": "esp-02",
            "content": "rst%20cause%3A%202%0A"
        })))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(
        fs::read_to_string(root.path().join("esp-02.log"))?,
        "rst cause: 2\n"
    );

    Ok(())
}

#[tokio::test]
async fn test_log_missing_fields_touch_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    let app = create_router(test_state(root.path()));

    for body in [
        json!({ "id": "esp-03" }),
        json!({ "content": "orphan" }),
        json!({}),
    ] {
        let response = app.clone().oneshot(log_request(body)).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "id and content are required"
        );
    }

    assert_eq!(fs::read_dir(root.path())?.count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_log_requires_credentials() -> Result<(), Box<dyn std::error::Error>> {
    let root = tempfile::tempdir()?;
    let app = create_router(test_state(root.path()));

    let request = Request::builder()
        .method("POST")
        .uri("/log")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "id": "esp-04", "content": "x" }).to_string(),
        ))?;
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(fs::read_dir(root.path())?.count(), 0);

    Ok(())
}
