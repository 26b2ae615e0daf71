use axum::{extract::{Path, State}, routing::{get, patch}, Json, Router};
use uuid::Uuid;

use crate::{auth::middleware::AuthUser, state::AppState};

use super::{error::Result, models::{CreateGoalModel, GoalModel, GoalProgressModel, UpdateGoalModel}, DynGoalService};

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(get_goals).post(post_goal))
        .route("/{goal_id}", get(get_goal).put(update_goal).delete(delete_goal))
        .route("/{goal_id}/progress", patch(add_progress))
        .with_state(app_state)
}

pub async fn get_goals(
    State(goal_svc): State<DynGoalService>,
    user: AuthUser,
) -> Result<Json<Vec<GoalModel>>> {
    Ok(Json(goal_svc.get_goals(user.id).await?))
}

pub async fn get_goal(
    State(goal_svc): State<DynGoalService>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> Result<Json<GoalModel>> {
    Ok(Json(goal_svc.get_goal(user.id, goal_id).await?))
}

pub async fn post_goal(
    State(goal_svc): State<DynGoalService>,
    user: AuthUser,
    Json(body): Json<CreateGoalModel>,
) -> Result<Json<GoalModel>> {
    Ok(Json(goal_svc.create_goal(user.id, body).await?))
}

pub async fn update_goal(
    State(goal_svc): State<DynGoalService>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
    Json(body): Json<UpdateGoalModel>,
) -> Result<Json<GoalModel>> {
    Ok(Json(goal_svc.update_goal(user.id, goal_id, body).await?))
}

pub async fn add_progress(
    State(goal_svc): State<DynGoalService>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
    Json(body): Json<GoalProgressModel>,
) -> Result<Json<GoalModel>> {
    Ok(Json(goal_svc.add_progress(user.id, goal_id, body.amount).await?))
}

pub async fn delete_goal(
    State(goal_svc): State<DynGoalService>,
    user: AuthUser,
    Path(goal_id): Path<Uuid>,
) -> Result<()> {
    goal_svc.delete_goal(user.id, goal_id).await?;
    Ok(())
}
