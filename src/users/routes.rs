use axum::{extract::{DefaultBodyLimit, Multipart, State}, http::header, response::IntoResponse, routing::{get, post}, Json, Router};

use crate::{auth::middleware::AuthUser, state::AppState};

use super::{error::{Error, Result}, photo::MAX_PHOTO_BYTES, models::{ChangePasswordRequestModel, PreferencesModel, SuccessResponseModel, UpdateUserRequestModel, UserResponseModel}, DynUserService};

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/me", get(get_user))
        .route("/update", post(update_user))
        .route("/change-password", post(change_password))
        .route("/preferences", get(get_preferences).post(update_preferences))
        .route(
            "/photo", 
            get(get_photo).post(upload_photo).layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES))
        )
        .with_state(state)
}

async fn get_user(
    user: AuthUser,
    State(user_svc): State<DynUserService>,
) -> Result<Json<UserResponseModel>> {
    Ok(Json(user_svc.get_user(user.id).await?))
}

async fn update_user(
    user: AuthUser,
    State(user_svc): State<DynUserService>,
    Json(body): Json<UpdateUserRequestModel>,
) -> Result<Json<UserResponseModel>> {
    Ok(Json(user_svc.update_user(user.id, body).await?))
}

async fn change_password(
    user: AuthUser,
    State(user_svc): State<DynUserService>,
    Json(body): Json<ChangePasswordRequestModel>,
) -> Result<Json<SuccessResponseModel>> {
    user_svc.change_password(user.id, body).await?;
    Ok(Json(SuccessResponseModel { success: true }))
}

async fn get_preferences(
    user: AuthUser,
    State(user_svc): State<DynUserService>,
) -> Result<Json<PreferencesModel>> {
    Ok(Json(user_svc.get_preferences(user.id).await?))
}

async fn update_preferences(
    user: AuthUser,
    State(user_svc): State<DynUserService>,
    Json(body): Json<PreferencesModel>,
) -> Result<Json<PreferencesModel>> {
    Ok(Json(user_svc.update_preferences(user.id, body).await?))
}

async fn get_photo(
    user: AuthUser,
    State(user_svc): State<DynUserService>,
) -> Result<impl IntoResponse> {
    let photo = user_svc.get_photo(user.id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        photo,
    ))
}

async fn upload_photo(
    user: AuthUser,
    State(user_svc): State<DynUserService>,
    mut multipart: Multipart,
) -> Result<Json<UserResponseModel>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("photo") {
            let image = field.bytes().await?.to_vec();
            return Ok(Json(user_svc.update_photo(user.id, image).await?));
        }
    }

    Err(Error::MissingPhoto)
}
