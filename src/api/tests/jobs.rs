use super::*;
use crate::error::SourceError;

#[tokio::test]
async fn test_download_then_extract_over_http() {
    let (app, _service) = create_test_app();

    let download = download_sample(&app).await;
    assert_eq!(download.message_count, 4);
    assert_eq!(
        download.download_location,
        format!("memory://{}", download.job_id)
    );

    let response = post_json(
        &app,
        "/api/v1/extract",
        json!({"job_id": download.job_id}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let extract: ExtractResponse = json_body(response).await;
    assert_eq!(extract.extracted_message_count, download.message_count);
    assert_eq!(extract.messages.len(), 4);
    assert!(extract.messages[0].contains("[Channel: #general]"));
}

#[tokio::test]
async fn test_download_response_shape() {
    let (app, _service) = create_test_app();

    let response = post_json(
        &app,
        "/api/v1/download",
        json!({"user_id": "U123", "start_date": "2025-03-08", "end_date": "2025-03-08"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message_count"], 2);
    assert!(body["job_id"].as_str().unwrap().len() == 32);
}

#[tokio::test]
async fn test_download_reversed_range_is_bad_request() {
    let (app, service) = create_test_app();

    let response = post_json(
        &app,
        "/api/v1/download",
        json!({"user_id": "U123", "start_date": "2025-03-09", "end_date": "2025-03-07"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: crate::error::ApiError = json_body(response).await;
    assert_eq!(error.error.code, "invalid_request");
    assert!(service.jobs().is_empty().await);
}

#[tokio::test]
async fn test_download_missing_field_is_bad_request() {
    let (app, service) = create_test_app();

    let response = post_json(&app, "/api/v1/download", json!({"user_id": "U123"})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: crate::error::ApiError = json_body(response).await;
    assert_eq!(error.error.code, "invalid_request");
    assert!(service.jobs().is_empty().await);
}

#[tokio::test]
async fn test_download_rate_limited_is_429_with_retry_hint() {
    let source = Arc::new(StaticMessageSource::failing(|| SourceError::RateLimited {
        retry_after_secs: Some(20),
    }));
    let (app, service) = app_for(create_test_service_with(source));

    let response = post_json(
        &app,
        "/api/v1/download",
        json!({"user_id": "U123", "start_date": "2025-03-07", "end_date": "2025-03-09"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let error: crate::error::ApiError = json_body(response).await;
    assert_eq!(error.error.code, "source_error");
    let details = error.error.details.unwrap();
    assert_eq!(details["reason"], "rate_limited");
    assert_eq!(details["retry_after_secs"], 20);
    assert!(service.jobs().is_empty().await);
}

#[tokio::test]
async fn test_download_invalid_token_is_bad_gateway() {
    let source = Arc::new(StaticMessageSource::failing(|| {
        SourceError::InvalidToken("token_revoked".into())
    }));
    let (app, _service) = app_for(create_test_service_with(source));

    let response = post_json(
        &app,
        "/api/v1/download",
        json!({"user_id": "U123", "start_date": "2025-03-07", "end_date": "2025-03-09"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let error: crate::error::ApiError = json_body(response).await;
    assert_eq!(error.error.details.unwrap()["reason"], "invalid_token");
}

#[tokio::test]
async fn test_extract_unknown_job_is_not_found() {
    let (app, _service) = create_test_app();

    let response = post_json(
        &app,
        "/api/v1/extract",
        json!({"job_id": "00000000000000000000000000000000"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error: crate::error::ApiError = json_body(response).await;
    assert_eq!(error.error.code, "job_not_found");
    assert_eq!(
        error.error.details.unwrap()["job_id"],
        "00000000000000000000000000000000"
    );
}

#[tokio::test]
async fn test_extract_narrowed_is_deterministic() {
    let (app, _service) = create_test_app();
    let download = download_sample(&app).await;

    let request = json!({
        "job_id": download.job_id,
        "start_date": "2025-03-08",
        "end_date": "2025-03-08"
    });

    let first: ExtractResponse =
        json_body(post_json(&app, "/api/v1/extract", request.clone()).await).await;
    let second: ExtractResponse =
        json_body(post_json(&app, "/api/v1/extract", request).await).await;

    assert_eq!(first.extracted_message_count, 2);
    assert_eq!(first.messages, second.messages);

    let a = body_text(get_authed(&app, &first.output_content_url).await).await;
    let b = body_text(get_authed(&app, &second.output_content_url).await).await;
    assert_eq!(a, b);
    assert!(a.contains("Message: eighth morning"));
    assert!(!a.contains("Message: seventh"));
}

#[tokio::test]
async fn test_extract_window_outside_job_is_bad_request() {
    let (app, _service) = create_test_app();
    let download = download_sample(&app).await;

    let response = post_json(
        &app,
        "/api/v1/extract",
        json!({"job_id": download.job_id, "start_date": "2024-01-01", "end_date": "2024-01-02"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_extract_unknown_format_is_bad_request() {
    let (app, _service) = create_test_app();
    let download = download_sample(&app).await;

    let response = post_json(
        &app,
        "/api/v1/extract",
        json!({"job_id": download.job_id, "format": "pdf"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
