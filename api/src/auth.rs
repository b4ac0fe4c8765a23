use axum::{extract::FromRequestParts, http::request::Parts};
use recipe_costing_service::{AuthContext, Role};

use crate::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// The authenticated caller.
///
/// Identity is asserted by the gateway in front of this service, which sets the
/// `X-User-Id` and `X-User-Role` headers after checking the user's credentials.
#[derive(Clone, Debug)]
pub struct Caller(pub AuthContext);

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)?
            .parse::<i32>()
            .map_err(|_| ApiError::Unauthenticated("X-User-Id must be an integer"))?;
        let role = header(parts, USER_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(|_| ApiError::Unauthenticated("X-User-Role is not a known role"))?;

        Ok(Caller(AuthContext::new(user_id, role)))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::Unauthenticated("missing caller identity headers"))
}
