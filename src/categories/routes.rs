use axum::{extract::{Path, State}, routing::get, Json, Router};
use uuid::Uuid;

use crate::{auth::middleware::AuthUser, categories::Result, state::AppState};

use super::{models::{BulkDeleteCategoriesModel, CategoryModel}, CreateCategoryModel, DynCategoryService, UpdateCategoryModel};

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(get_categories).post(post_category).delete(delete_categories))
        .route("/{cat_id}", get(get_category).put(update_category).delete(delete_category))
        .with_state(app_state)
}

pub async fn get_categories(
    State(cat_svc): State<DynCategoryService>,
    user: AuthUser,
) -> Result<Json<Vec<CategoryModel>>> {
    Ok(Json(cat_svc.get_cats(user.id).await?))
}

pub async fn get_category(
    State(cat_svc): State<DynCategoryService>,
    Path(cat_id): Path<Uuid>,
    user: AuthUser,
) -> Result<Json<CategoryModel>> {
    Ok(Json(cat_svc.get_cat(user.id, cat_id).await?))
}

pub async fn post_category(
    State(cat_svc): State<DynCategoryService>,
    user: AuthUser,
    Json(body): Json<CreateCategoryModel>,
) -> Result<Json<CategoryModel>> {
    Ok(Json(cat_svc.create_cat(user.id, body).await?))
}

pub async fn update_category(
    State(cat_svc): State<DynCategoryService>,
    Path(cat_id): Path<Uuid>,
    user: AuthUser,
    Json(body): Json<UpdateCategoryModel>,
) -> Result<Json<CategoryModel>> {
    Ok(Json(cat_svc.update_cat(user.id, cat_id, body).await?))
}

pub async fn delete_category(
    State(cat_svc): State<DynCategoryService>,
    Path(cat_id): Path<Uuid>,
    user: AuthUser,
) -> Result<()> {
    cat_svc.delete_cat(user.id, cat_id).await?;
    Ok(())
}

pub async fn delete_categories(
    State(cat_svc): State<DynCategoryService>,
    user: AuthUser,
    Json(body): Json<BulkDeleteCategoriesModel>
) -> Result<()> {
    cat_svc.delete_cats(user.id, body.ids).await?;
    Ok(())
}
