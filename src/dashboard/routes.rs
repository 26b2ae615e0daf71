use axum::{extract::State, routing::get, Json, Router};

use crate::{auth::middleware::AuthUser, state::AppState, transactions::{self, models::TransactionModel}};

use super::{error::Result, models::DashboardSummaryModel, DynDashboardService};

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/summary", get(get_summary))
        .route("/recent-transactions", get(get_recent_transactions))
        .with_state(app_state.clone())
        .nest("/transactions", transactions::routes::dashboard_alias_routes(app_state))
}

pub async fn get_summary(
    State(dashboard_svc): State<DynDashboardService>,
    user: AuthUser,
) -> Result<Json<DashboardSummaryModel>> {
    Ok(Json(dashboard_svc.get_summary(user.id).await?))
}

pub async fn get_recent_transactions(
    State(dashboard_svc): State<DynDashboardService>,
    user: AuthUser,
) -> Result<Json<Vec<TransactionModel>>> {
    Ok(Json(dashboard_svc.get_recent_transactions(user.id).await?))
}
