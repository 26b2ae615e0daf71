use axum::{extract::State, routing::get, Json, Router};

use crate::{auth::middleware::AuthUser, state::AppState};

use super::{error::Result, models::SuggestionModel, DynSuggestionService};

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(get_suggestions))
        .with_state(app_state)
}

pub async fn get_suggestions(
    State(suggestion_svc): State<DynSuggestionService>,
    user: AuthUser,
) -> Result<Json<Vec<SuggestionModel>>> {
    Ok(Json(suggestion_svc.get_suggestions(user.id).await?))
}
