use axum::{extract::{DefaultBodyLimit, Multipart, State}, routing::{get, post}, Json, Router};

use crate::{auth::middleware::AuthUser, state::AppState};

use super::{error::{Error, Result}, models::{StatementImportModel, StatementUploadModel, UploadInfoModel, MAX_STATEMENT_BYTES}, DynMpesaService};

const FILE_FIELD: &str = "file";

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/upload-statement", 
            post(upload_statement).layer(DefaultBodyLimit::max(MAX_STATEMENT_BYTES))
        )
        .route("/upload-info", get(upload_info))
        .with_state(app_state)
}

pub async fn upload_statement(
    State(mpesa_svc): State<DynMpesaService>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<StatementImportModel>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let contents = field.bytes().await?.to_vec();
        let upload = StatementUploadModel { file_name, contents };

        return Ok(Json(mpesa_svc.import_statement(user.id, upload).await?));
    }

    Err(Error::MissingFile)
}

pub async fn upload_info(_user: AuthUser) -> Json<UploadInfoModel> {
    Json(UploadInfoModel::default())
}
