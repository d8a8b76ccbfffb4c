use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::AuthenticatedUser;
use crate::error::AppError;
use crate::services::AppState;

/// Requires a valid bearer access token on every request of the wrapped scope.
///
/// On success the caller's identity is stored in the request extensions as an
/// [`AuthenticatedUser`]; otherwise the request is answered with 401. Rejections
/// are returned as responses, not errors.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflights carry no credentials.
        if req.method() == actix_web::http::Method::OPTIONS {
            return forward(self.service.call(req));
        }

        let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
            return reject(
                req,
                AppError::InternalServerError("Application state is not configured".into()),
            );
        };

        let verified = match bearer_token(&req) {
            Some(token) => state.auth.tokens().verify_access(token),
            None => Err(AppError::Unauthorized("Missing token".into())),
        };

        match verified {
            Ok(claims) => {
                req.extensions_mut().insert(AuthenticatedUser {
                    email: claims.email,
                });
                forward(self.service.call(req))
            }
            Err(app_err) => {
                log::debug!("Rejected request to {}: {}", req.path(), app_err);
                reject(req, app_err)
            }
        }
    }
}

fn forward<F, B>(fut: F) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>>
where
    F: std::future::Future<Output = Result<ServiceResponse<B>, Error>> + 'static,
    B: 'static,
{
    Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
}

fn reject<B>(
    req: ServiceRequest,
    app_err: AppError,
) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>>
where
    B: 'static,
{
    let response = req.into_response(app_err.error_response()).map_into_right_body();
    Box::pin(ready(Ok(response)))
}
