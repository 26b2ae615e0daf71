use axum::{extract::State, routing::post, Json, Router};

use crate::{state::AppState, users::models::{CreateUserRequestModel, UserResponseModel}};

use super::{error::Result, models::{LoginModel, LoginResponseModel}, DynAuthService};

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))  
        .with_state(app_state)
}

pub async fn login(
    State(auth_svc): State<DynAuthService>,
    Json(req): Json<LoginModel>
) -> Result<Json<LoginResponseModel>> {
    Ok(Json(auth_svc.login(req).await?))
}

pub async fn register(
    State(auth_svc): State<DynAuthService>,
    Json(req): Json<CreateUserRequestModel>
) -> Result<Json<UserResponseModel>> {
    Ok(Json(auth_svc.register(req).await?))
}
