//! Route table checks that do not need a database

use actix_web::{http::StatusCode, test, App};
use social_graph_service::routes::configure_routes;

macro_rules! status_of {
    ($app:expr, $req:expr) => {
        match test::try_call_service(&$app, $req.to_request()).await {
            Ok(resp) => resp.status(),
            Err(err) => err.as_response_error().status_code(),
        }
    };
}

#[actix_web::test]
async fn metrics_endpoint_is_public() {
    let app = test::init_service(App::new().configure(configure_routes)).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"));
}

#[actix_web::test]
async fn api_routes_require_bearer_token() {
    let app = test::init_service(App::new().configure(configure_routes)).await;

    let protected = [
        ("GET", "/api/me"),
        ("GET", "/api/profile/me"),
        ("GET", "/api/post/feed"),
        ("POST", "/api/post"),
        ("GET", "/api/comment/user/8d5a3c4e-0f7b-4a7e-9a55-0d6f2a3b1c11"),
        ("POST", "/api/like/post/8d5a3c4e-0f7b-4a7e-9a55-0d6f2a3b1c11"),
        ("GET", "/api/bookmark/collection/user/8d5a3c4e-0f7b-4a7e-9a55-0d6f2a3b1c11"),
        ("GET", "/api/follow/requests"),
        ("GET", "/api/block/check/8d5a3c4e-0f7b-4a7e-9a55-0d6f2a3b1c11"),
        ("POST", "/api/message"),
        ("GET", "/api/notification"),
        ("GET", "/api/dating/matches"),
        ("GET", "/api/interaction/similarity/8d5a3c4e-0f7b-4a7e-9a55-0d6f2a3b1c11"),
        ("GET", "/api/recommendation/users"),
    ];

    for (method, uri) in protected {
        let req = match method {
            "POST" => test::TestRequest::post(),
            _ => test::TestRequest::get(),
        }
        .uri(uri);
        assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[actix_web::test]
async fn unknown_path_is_not_found() {
    let app = test::init_service(App::new().configure(configure_routes)).await;

    let status = status_of!(app, test::TestRequest::get().uri("/api/nope/at/all"));
    assert_eq!(status, StatusCode::NOT_FOUND);
}
