use axum::{extract::{Path, Query, State}, routing::{get, patch, post}, Json, Router};
use uuid::Uuid;

use crate::{auth::middleware::AuthUser, state::AppState};

use super::{error::Result, models::{BulkCategorizeModel, BulkCategorizeResponseModel, CreateTransactionModel, GetTransactionReqModel, MonthlyQueryParams, TransactionModel, UpdateTransactionModel}, DynTransactionService};

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(get_transactions).post(post_transaction))
        .route("/query", post(query_transactions))
        .route("/monthly", get(get_monthly_transactions))
        .route("/bulk-categorize", patch(bulk_categorize))
        .route("/{tx_id}", get(get_transaction).put(update_transaction).delete(delete_transaction))
        .with_state(app_state)
}

///
/// Routes served under `/dashboard/transactions` by the dashboard
/// 
pub fn dashboard_alias_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(get_transactions).post(post_transaction))
        .route("/{tx_id}", get(get_transaction).put(update_transaction).delete(delete_transaction))
        .with_state(app_state)
}

pub async fn get_transactions(
    State(tx_svc): State<DynTransactionService>,
    user: AuthUser,
) -> Result<Json<Vec<TransactionModel>>> {
    Ok(Json(tx_svc.get_transactions(user.id).await?))
}

pub async fn query_transactions(
    State(tx_svc): State<DynTransactionService>,
    user: AuthUser,
    Json(req): Json<GetTransactionReqModel>,
) -> Result<Json<Vec<TransactionModel>>> {
    Ok(Json(tx_svc.query_transactions(user.id, req).await?))
}

pub async fn get_monthly_transactions(
    State(tx_svc): State<DynTransactionService>,
    user: AuthUser,
    Query(params): Query<MonthlyQueryParams>,
) -> Result<Json<Vec<TransactionModel>>> {
    Ok(Json(tx_svc.get_monthly_transactions(user.id, params.year, params.month).await?))
}

pub async fn get_transaction(
    State(tx_svc): State<DynTransactionService>,
    user: AuthUser,
    Path(tx_id): Path<Uuid>,
) -> Result<Json<TransactionModel>> {
    Ok(Json(tx_svc.get_transaction(user.id, tx_id).await?))
}

pub async fn post_transaction(
    State(tx_svc): State<DynTransactionService>,
    user: AuthUser,
    Json(body): Json<CreateTransactionModel>,
) -> Result<Json<TransactionModel>> {
    Ok(Json(tx_svc.create_transaction(user.id, body).await?))
}

pub async fn update_transaction(
    State(tx_svc): State<DynTransactionService>,
    user: AuthUser,
    Path(tx_id): Path<Uuid>,
    Json(body): Json<UpdateTransactionModel>,
) -> Result<Json<TransactionModel>> {
    Ok(Json(tx_svc.update_transaction(user.id, tx_id, body).await?))
}

pub async fn delete_transaction(
    State(tx_svc): State<DynTransactionService>,
    user: AuthUser,
    Path(tx_id): Path<Uuid>,
) -> Result<()> {
    tx_svc.delete_transaction(user.id, tx_id).await?;
    Ok(())
}

pub async fn bulk_categorize(
    State(tx_svc): State<DynTransactionService>,
    user: AuthUser,
    Json(body): Json<BulkCategorizeModel>,
) -> Result<Json<BulkCategorizeResponseModel>> {
    let updated = tx_svc.bulk_categorize(user.id, body).await?;
    Ok(Json(BulkCategorizeResponseModel { success: true, updated }))
}
