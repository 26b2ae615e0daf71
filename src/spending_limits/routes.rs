use axum::{extract::{Path, State}, routing::get, Json, Router};
use uuid::Uuid;

use crate::{auth::middleware::AuthUser, state::AppState};

use super::{error::Result, models::{CreateSpendingLimitModel, SpendingLimitModel, UpdateSpendingLimitModel}, DynSpendingLimitService};

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(get_limits).post(post_limit))
        .route("/{limit_id}", get(get_limit).put(update_limit).delete(delete_limit))
        .with_state(app_state)
}

pub async fn get_limits(
    State(limit_svc): State<DynSpendingLimitService>,
    user: AuthUser,
) -> Result<Json<Vec<SpendingLimitModel>>> {
    Ok(Json(limit_svc.get_limits(user.id).await?))
}

pub async fn get_limit(
    State(limit_svc): State<DynSpendingLimitService>,
    user: AuthUser,
    Path(limit_id): Path<Uuid>,
) -> Result<Json<SpendingLimitModel>> {
    Ok(Json(limit_svc.get_limit(user.id, limit_id).await?))
}

pub async fn post_limit(
    State(limit_svc): State<DynSpendingLimitService>,
    user: AuthUser,
    Json(body): Json<CreateSpendingLimitModel>,
) -> Result<Json<SpendingLimitModel>> {
    Ok(Json(limit_svc.create_limit(user.id, body).await?))
}

pub async fn update_limit(
    State(limit_svc): State<DynSpendingLimitService>,
    user: AuthUser,
    Path(limit_id): Path<Uuid>,
    Json(body): Json<UpdateSpendingLimitModel>,
) -> Result<Json<SpendingLimitModel>> {
    Ok(Json(limit_svc.update_limit(user.id, limit_id, body).await?))
}

pub async fn delete_limit(
    State(limit_svc): State<DynSpendingLimitService>,
    user: AuthUser,
    Path(limit_id): Path<Uuid>,
) -> Result<()> {
    limit_svc.delete_limit(user.id, limit_id).await?;
    Ok(())
}
