//! Pre-validated actor claim extractor.
//!
//! Authentication itself is an external collaborator: the auth front-end
//! terminates sessions and forwards verified claims on trusted headers.
//! This extractor only reads those claims; it never validates credentials.
//!
//! Headers:
//! - `x-actor-id` (required): the acting user's id.
//! - `x-actor-roles` (optional): comma-separated role names.
//! - `x-actor-provider` (optional): the provider the actor is bound to,
//!   for actors with the `provider` role.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use medq_core::error::CoreError;
use medq_core::roles::ROLE_ADMIN;
use medq_core::types::DbId;

use crate::error::AppError;
use crate::state::AppState;

/// Actor claim extracted from trusted headers.
///
/// Use as an extractor parameter in any handler that requires an
/// authenticated actor:
///
/// ```ignore
/// async fn my_handler(actor: ActorClaim) -> AppResult<Json<()>> {
///     tracing::info!(actor_id = actor.actor_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ActorClaim {
    /// The actor's user id.
    pub actor_id: DbId,
    /// Role names carried by the claim.
    pub roles: Vec<String>,
    /// The provider this actor is, when the claim is provider-bound.
    pub provider_id: Option<DbId>,
}

impl ActorClaim {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }
}

impl FromRequestParts<AppState> for ActorClaim {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor_id = parts
            .headers
            .get("x-actor-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<DbId>().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing or invalid x-actor-id header".into(),
                ))
            })?;

        let roles: Vec<String> = parts
            .headers
            .get("x-actor-roles")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let provider_id = parts
            .headers
            .get("x-actor-provider")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<DbId>().ok());

        Ok(ActorClaim {
            actor_id,
            roles,
            provider_id,
        })
    }
}
