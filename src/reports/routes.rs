use axum::{extract::State, http::header, response::IntoResponse, routing::post, Json, Router};

use crate::{auth::middleware::AuthUser, state::AppState};

use super::{error::Result, models::{ReportDataModel, ReportFilterModel}, pdf::REPORT_FILE_NAME, DynReportService};

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .route("/generate", post(generate_report))
        .route("/download-pdf", post(download_report_pdf))
        .with_state(app_state)
}

pub async fn generate_report(
    State(report_svc): State<DynReportService>,
    user: AuthUser,
    Json(filter): Json<ReportFilterModel>,
) -> Result<Json<ReportDataModel>> {
    Ok(Json(report_svc.generate_report(user.id, filter).await?))
}

pub async fn download_report_pdf(
    State(report_svc): State<DynReportService>,
    user: AuthUser,
    Json(filter): Json<ReportFilterModel>,
) -> Result<impl IntoResponse> {
    let pdf = report_svc.generate_report_pdf(user.id, filter).await?;
    Ok((
        [
            (header::CONTENT_TYPE, String::from("application/pdf")),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", REPORT_FILE_NAME)),
        ],
        pdf,
    ))
}
