//! Authorization gate
//!
//! One middleware guards every route. Whether a route needs a bearer token
//! is read from a static table of controllers; route-level visibility
//! overrides controller-level visibility, and routes with neither are
//! protected.

use super::jwt::{AccessClaims, JwtError, TokenIssuer};
use crate::error::ApiError;
use axum::{
    body::Body,
    extract::{MatchedPath, Request, State},
    http::{header, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Whether a route requires authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
}

/// HTTP verbs that appear in the access table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    fn matches(self, method: &Method) -> bool {
        match self {
            Verb::Get => method == Method::GET || method == Method::HEAD,
            Verb::Post => method == Method::POST,
            Verb::Put => method == Method::PUT,
            Verb::Delete => method == Method::DELETE,
        }
    }
}

/// A single route of a controller
#[derive(Debug, Clone, Copy)]
pub struct RouteAccess {
    pub verb: Verb,
    /// Path relative to the controller prefix, in router syntax
    pub path: &'static str,
    pub visibility: Option<Visibility>,
}

impl RouteAccess {
    /// Route inheriting the controller's visibility
    pub const fn inherit(verb: Verb, path: &'static str) -> Self {
        Self {
            verb,
            path,
            visibility: None,
        }
    }

    pub const fn public(verb: Verb, path: &'static str) -> Self {
        Self {
            verb,
            path,
            visibility: Some(Visibility::Public),
        }
    }

    pub const fn protected(verb: Verb, path: &'static str) -> Self {
        Self {
            verb,
            path,
            visibility: Some(Visibility::Protected),
        }
    }
}

/// A group of routes under one path prefix
#[derive(Debug, Clone, Copy)]
pub struct ControllerAccess {
    pub prefix: &'static str,
    pub visibility: Option<Visibility>,
    pub routes: &'static [RouteAccess],
}

use Verb::{Delete, Get, Post, Put};

/// Reads are public, writes inherit the protected default
const fn resource_routes() -> [RouteAccess; 5] {
    [
        RouteAccess::public(Get, ""),
        RouteAccess::inherit(Post, ""),
        RouteAccess::public(Get, "/:id"),
        RouteAccess::inherit(Put, "/:id"),
        RouteAccess::inherit(Delete, "/:id"),
    ]
}

const RESOURCE_ROUTES: [RouteAccess; 5] = resource_routes();

const BLOG_ROUTES: [RouteAccess; 6] = [
    RouteAccess::public(Get, "/lookups"),
    RESOURCE_ROUTES[0],
    RESOURCE_ROUTES[1],
    RESOURCE_ROUTES[2],
    RESOURCE_ROUTES[3],
    RESOURCE_ROUTES[4],
];

/// Route visibility table
pub static ACCESS_TABLE: &[ControllerAccess] = &[
    ControllerAccess {
        prefix: "/auth",
        visibility: Some(Visibility::Public),
        routes: &[
            RouteAccess::inherit(Post, "/signup"),
            RouteAccess::inherit(Post, "/signin"),
            RouteAccess::inherit(Post, "/refresh"),
            RouteAccess::protected(Post, "/logout"),
        ],
    },
    ControllerAccess {
        prefix: "/domains",
        visibility: None,
        routes: &RESOURCE_ROUTES,
    },
    ControllerAccess {
        prefix: "/authors",
        visibility: None,
        routes: &RESOURCE_ROUTES,
    },
    ControllerAccess {
        prefix: "/blog-categories",
        visibility: None,
        routes: &RESOURCE_ROUTES,
    },
    ControllerAccess {
        prefix: "/blogs",
        visibility: None,
        routes: &BLOG_ROUTES,
    },
    ControllerAccess {
        prefix: "/upload",
        visibility: Some(Visibility::Public),
        routes: &[
            RouteAccess::inherit(Post, "/file"),
            RouteAccess::inherit(Post, "/fetchUrl"),
        ],
    },
    ControllerAccess {
        prefix: "/health",
        visibility: Some(Visibility::Public),
        routes: &[RouteAccess::inherit(Get, "")],
    },
];

/// Resolve the visibility of a matched route template
pub fn resolve_visibility(method: &Method, matched_path: &str) -> Visibility {
    resolve_in(ACCESS_TABLE, method, matched_path)
}

fn resolve_in(table: &[ControllerAccess], method: &Method, matched_path: &str) -> Visibility {
    for controller in table {
        let Some(rest) = matched_path.strip_prefix(controller.prefix) else {
            continue;
        };
        let route = controller
            .routes
            .iter()
            .find(|r| r.path == rest && r.verb.matches(method));
        if let Some(route) = route {
            return route
                .visibility
                .or(controller.visibility)
                .unwrap_or(Visibility::Protected);
        }
    }
    Visibility::Protected
}

/// Caller identity attached to protected requests
///
/// Extract in handlers with `Extension<Identity>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub account_id: Uuid,
    pub email: String,
}

impl TryFrom<AccessClaims> for Identity {
    type Error = AuthError;

    fn try_from(claims: AccessClaims) -> Result<Self, Self::Error> {
        let account_id =
            Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken(JwtError::InvalidToken))?;
        Ok(Self {
            account_id,
            email: claims.email,
        })
    }
}

/// Authentication failures
///
/// Every variant renders the same `401` body.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing or malformed Authorization header")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(ApiError::unauthorized())).into_response()
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(request: &Request<Body>) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authorization middleware
///
/// Install with `route_layer` so the matched route template is known:
///
/// ```ignore
/// router.route_layer(middleware::from_fn_with_state(tokens, authorize))
/// ```
pub async fn authorize(
    State(tokens): State<TokenIssuer>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let visibility = match request.extensions().get::<MatchedPath>() {
        Some(path) => resolve_visibility(request.method(), path.as_str()),
        None => Visibility::Protected,
    };
    if visibility == Visibility::Public {
        return Ok(next.run(request).await);
    }

    let token = bearer_token(&request).ok_or_else(|| {
        warn!(path = %request.uri().path(), "request without bearer token rejected");
        AuthError::MissingToken
    })?;

    let claims = tokens.verify_access(token).map_err(|e| {
        warn!(path = %request.uri().path(), error = %e, "invalid access token rejected");
        AuthError::InvalidToken(e)
    })?;

    let identity = Identity::try_from(claims)?;
    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
