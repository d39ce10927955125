pub mod admin;
pub mod availability;
pub mod booking;
pub mod health;
pub mod tokens;

use medq_core::error::CoreError;
use medq_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::actor::ActorClaim;
use crate::state::AppState;

/// Authorize an actor to act on a provider's records: the provider's own
/// claim, an authorized manager of that provider, or an admin.
pub(crate) async fn authorize_provider_actor(
    state: &AppState,
    actor: &ActorClaim,
    provider_id: DbId,
) -> AppResult<()> {
    if actor.is_admin() || actor.provider_id == Some(provider_id) {
        return Ok(());
    }
    if state.role_cache.manages(actor.actor_id, provider_id).await? {
        return Ok(());
    }
    Err(AppError::Core(CoreError::Forbidden(format!(
        "actor {} may not act for provider {provider_id}",
        actor.actor_id
    ))))
}
