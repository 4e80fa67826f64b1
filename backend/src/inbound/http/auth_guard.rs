//! Session token guard for protected routes.
//!
//! The whole `Authorization` header value is treated as the token; no
//! `Bearer ` prefix is stripped. An empty header counts as no header.
//! Requests without a token, or whose token fails verification, are answered
//! with `401 Unauthorized` before the handler runs. Accepted requests carry an
//! [`AuthenticatedUser`] in their extensions for handlers to extract.

use std::sync::Arc;
use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::{FromRequest, HttpMessage, HttpRequest, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{Error, SessionClaims, TokenCodec, TokenError, Username};

const MISSING_TOKEN: &str = "Request does not contain an access token";
const INVALID_TOKEN: &str = "Invalid token";

/// Identity attached to a request that passed the guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(SessionClaims);

impl AuthenticatedUser {
    /// Username the token was minted for.
    pub fn username(&self) -> &Username {
        self.0.username()
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Self>()
                .cloned()
                .ok_or_else(|| Error::unauthorized(MISSING_TOKEN)),
        )
    }
}

enum Rejection {
    MissingHeader,
    Invalid(TokenError),
}

impl Rejection {
    fn into_error(self) -> Error {
        match self {
            Self::MissingHeader => {
                debug!("request rejected: authorization header absent or empty");
                Error::unauthorized(MISSING_TOKEN)
            }
            Self::Invalid(reason) => {
                debug!(%reason, "request rejected: token verification failed");
                Error::unauthorized(INVALID_TOKEN)
            }
        }
    }
}

fn authenticate(codec: &TokenCodec, headers: &HeaderMap) -> Result<SessionClaims, Rejection> {
    let value = headers
        .get(AUTHORIZATION)
        .filter(|value| !value.is_empty())
        .ok_or(Rejection::MissingHeader)?;
    let token = value.to_str().map_err(|_| {
        Rejection::Invalid(TokenError::malformed(
            "authorization header is not visible ASCII",
        ))
    })?;
    codec.verify(token).map_err(Rejection::Invalid)
}

/// Middleware factory verifying the session token on every request.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use actix_web::{web, App, HttpResponse};
/// use mockable::DefaultClock;
/// use user_auth_api::domain::{TokenCodec, TokenSecret};
/// use user_auth_api::inbound::http::auth_guard::AuthGuard;
///
/// let codec = Arc::new(TokenCodec::new(&TokenSecret::generate(), Arc::new(DefaultClock)));
/// let app = App::new().service(
///     web::scope("/private")
///         .wrap(AuthGuard::new(codec))
///         .route("", web::get().to(HttpResponse::Ok)),
/// );
/// ```
#[derive(Clone)]
pub struct AuthGuard {
    codec: Arc<TokenCodec>,
}

impl AuthGuard {
    /// Guard requests with tokens checked by `codec`.
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = AuthGuardMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGuardMiddleware {
            service,
            codec: Arc::clone(&self.codec),
        }))
    }
}

/// Service wrapper produced by [`AuthGuard`].
pub struct AuthGuardMiddleware<S> {
    service: S,
    codec: Arc<TokenCodec>,
}

impl<S, B> Service<ServiceRequest> for AuthGuardMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&self.codec, req.headers()) {
            Ok(claims) => {
                req.extensions_mut().insert(AuthenticatedUser(claims));
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            // Build the error while polled so it picks up the request trace id.
            Err(rejection) => Box::pin(async move {
                let response = rejection.into_error().error_response();
                Ok(req.into_response(response).map_into_right_body())
            }),
        }
    }
}
