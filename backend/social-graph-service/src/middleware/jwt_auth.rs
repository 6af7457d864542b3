use crate::app_state::AppState;
use crate::domain::user::User;
use crate::error::AppError;
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::{ready, Ready};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use uuid::Uuid;

/// Graph id of the authenticated user
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

/// The full user record resolved from the bearer token
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Resolves `Authorization: Bearer <token>` to a graph user.
///
/// The token is validated against the provider's JWKS, the provider profile
/// is fetched, and the user is created on first sight. Both `UserId` and
/// `CurrentUser` are inserted into the request extensions.
pub struct JwtAuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for JwtAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = JwtAuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            let token = bearer_token(&req)?;

            let auth = req
                .app_data::<web::Data<AppState>>()
                .map(|state| state.auth.clone())
                .ok_or_else(|| AppError::Internal("Application state not configured".into()))?;

            let user = auth.current_user(&token).await.map_err(|e| {
                tracing::warn!(error = %e, "Bearer token rejected");
                e
            })?;

            req.extensions_mut().insert(UserId(user.user_id));
            req.extensions_mut().insert(CurrentUser(user));

            service.call(req).await
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Result<String, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Authentication("Missing Authorization header".into()))?;

    header
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Authentication("Invalid Authorization header format".into()))
}

impl actix_web::FromRequest for UserId {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<UserId>() {
            Some(user_id) => ready(Ok(*user_id)),
            None => ready(Err(
                AppError::Authentication("User not authenticated".into()).into()
            )),
        }
    }
}

impl actix_web::FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        match req.extensions().get::<CurrentUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(
                AppError::Authentication("User not authenticated".into()).into()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App, HttpResponse};

    macro_rules! status_of {
        ($app:expr, $req:expr) => {
            match test::try_call_service(&$app, $req.to_request()).await {
                Ok(resp) => resp.status(),
                Err(err) => err.as_response_error().status_code(),
            }
        };
    }

    #[actix_web::test]
    async fn test_missing_header_is_unauthorized() {
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(JwtAuthMiddleware)
                    .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        let status = status_of!(app, test::TestRequest::get().uri("/api/ping"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_non_bearer_scheme_is_unauthorized() {
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(JwtAuthMiddleware)
                    .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        for value in ["Basic dXNlcjpwYXNz", "Bearer ", "bearer abc"] {
            let req = test::TestRequest::get()
                .uri("/api/ping")
                .insert_header(("Authorization", value));
            assert_eq!(status_of!(app, req), StatusCode::UNAUTHORIZED, "{value}");
        }
    }

    #[actix_web::test]
    async fn test_token_without_app_state_is_server_error() {
        let app = test::init_service(
            App::new().service(
                web::scope("/api")
                    .wrap(JwtAuthMiddleware)
                    .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
            ),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/ping")
            .insert_header(("Authorization", "Bearer abc.def.ghi"));
        assert_eq!(status_of!(app, req), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_user_id_extractor_requires_middleware() {
        let app = test::init_service(App::new().route(
            "/whoami",
            web::get().to(|user: UserId| async move { HttpResponse::Ok().body(user.0.to_string()) }),
        ))
        .await;

        let status = status_of!(app, test::TestRequest::get().uri("/whoami"));
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_bearer_token_is_trimmed() {
        let req = test::TestRequest::get()
            .insert_header(("Authorization", "Bearer  abc.def.ghi "))
            .to_srv_request();
        assert_eq!(bearer_token(&req).unwrap(), "abc.def.ghi");
    }
}
