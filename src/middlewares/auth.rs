use crate::entities::UserRole;
use crate::error::{AppError, AppResult};
use crate::utils::JwtService;
use actix_web::http::Method;
use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};

/// Caller resolved from the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// Routes reachable without a token
struct PublicPaths {
    exact_paths: Vec<&'static str>,
    prefix_paths: Vec<&'static str>,
    // anonymous GET only
    read_prefixes: Vec<&'static str>,
    // private even under a read prefix
    excluded_paths: Vec<&'static str>,
}

impl PublicPaths {
    fn new() -> Self {
        Self {
            exact_paths: vec![
                "/swagger-ui",
                "/swagger-ui/",
                "/api-docs/openapi.json",
                "/api/auth/register",
                "/api/auth/login",
            ],
            prefix_paths: vec!["/swagger-ui/", "/api-docs/"],
            read_prefixes: vec!["/api/businesses", "/api/services/"],
            excluded_paths: vec!["/api/businesses/mine"],
        }
    }

    fn is_public(&self, method: &Method, path: &str) -> bool {
        if self.exact_paths.contains(&path) {
            return true;
        }
        if self.prefix_paths.iter().any(|&prefix| path.starts_with(prefix)) {
            return true;
        }
        if method != Method::GET {
            return false;
        }
        if self
            .excluded_paths
            .iter()
            .any(|&excluded| path.starts_with(excluded))
        {
            return false;
        }
        self.read_prefixes
            .iter()
            .any(|&prefix| path.starts_with(prefix))
    }
}

pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            jwt_service: self.jwt_service.clone(),
            public_paths: PublicPaths::new(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    jwt_service: JwtService,
    public_paths: PublicPaths,
}

impl<S> AuthMiddlewareService<S> {
    fn resolve(&self, token: &str) -> AppResult<CurrentUser> {
        let claims = self.jwt_service.verify_token(token)?;
        Ok(CurrentUser {
            id: claims.user_id()?,
            role: claims.role,
        })
    }
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // CORS preflight
        if req.method() == Method::OPTIONS {
            return Box::pin(self.service.call(req));
        }

        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let is_public = self.public_paths.is_public(req.method(), req.path());

        match token.map(|t| self.resolve(t)) {
            Some(Ok(user)) => {
                req.extensions_mut().insert(user);
                Box::pin(self.service.call(req))
            }
            // a stale token does not lock anyone out of public pages
            Some(Err(_)) if is_public => Box::pin(self.service.call(req)),
            None if is_public => Box::pin(self.service.call(req)),
            Some(Err(_)) => {
                let error = AppError::AuthError("Invalid or expired token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
            None => {
                let error = AppError::AuthError("Missing access token".to_string());
                Box::pin(async move { Err(error.into()) })
            }
        }
    }
}

/// Caller placed by [`AuthMiddleware`], if any.
pub fn optional_user(req: &HttpRequest) -> Option<CurrentUser> {
    req.extensions().get::<CurrentUser>().copied()
}

/// Caller on a protected route.
pub fn current_user(req: &HttpRequest) -> AppResult<CurrentUser> {
    optional_user(req).ok_or_else(|| AppError::AuthError("Authentication required".to_string()))
}

/// Caller whose role is one of `roles`.
pub fn require_role(req: &HttpRequest, roles: &[UserRole]) -> AppResult<CurrentUser> {
    let user = current_user(req)?;
    if !roles.contains(&user.role) {
        return Err(AppError::forbidden());
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        let paths = PublicPaths::new();
        assert!(paths.is_public(&Method::POST, "/api/auth/login"));
        assert!(paths.is_public(&Method::POST, "/api/auth/register"));
        assert!(!paths.is_public(&Method::GET, "/api/auth/me"));
        assert!(paths.is_public(&Method::GET, "/api/businesses"));
        assert!(paths.is_public(&Method::GET, "/api/businesses/3/services"));
        assert!(paths.is_public(&Method::GET, "/api/services/9"));
        assert!(!paths.is_public(&Method::POST, "/api/businesses"));
        assert!(!paths.is_public(&Method::PUT, "/api/services/9"));
        assert!(!paths.is_public(&Method::GET, "/api/businesses/mine"));
        assert!(!paths.is_public(&Method::GET, "/api/appointments"));
        assert!(paths.is_public(&Method::GET, "/swagger-ui/index.html"));
    }
}
