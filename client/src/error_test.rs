use super::*;

#[test]
fn status_error_reports_code() {
    let err = ApiError::Status { status: 404, body: "{\"detail\":\"房间不存在\"}".to_owned() };
    assert_eq!(err.status(), Some(404));
    assert!(!err.is_timeout());
}

#[test]
fn status_error_display_includes_body() {
    let err = ApiError::Status { status: 400, body: "nope".to_owned() };
    assert_eq!(err.to_string(), "server returned HTTP 400: nope");
}

#[test]
fn socket_timeout_counts_as_timeout() {
    assert!(ApiError::Timeout.is_timeout());
    assert_eq!(ApiError::SocketClosed.status(), None);
}

#[test]
fn session_error_wraps_storage_transparently() {
    let err = SessionError::from(StorageError::Browser("quota exceeded".to_owned()));
    assert_eq!(err.to_string(), "browser storage failed: quota exceeded");
}

// =============================================================
// reqwest errors
// =============================================================

#[tokio::test]
async fn http_error_status_is_reported() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, axum::Router::new()).await.unwrap();
    });

    let http_error = reqwest::get(format!("http://{addr}/missing"))
        .await
        .unwrap()
        .error_for_status()
        .unwrap_err();
    let err = ApiError::from(http_error);
    assert_eq!(err.status(), Some(404));
    assert!(!err.is_timeout());
}
