use std::fs;

use axum::Router;
use log::info;
use sea_orm::Database;
use spendee_server::{
    auth::{self, CoreAuthService}, 
    categories::{self, DbConnCategoryService}, 
    config::Config, 
    dashboard::{self, DbConnDashboardService}, 
    date_time_provider::CoreTimeProvider, 
    db_utils::create_tables, 
    goals::{self, DbConnGoalService}, 
    mpesa::{self, DbConnMpesaService}, 
    notifications::{self, DbConnNotificationService}, 
    reports::{self, DbConnReportService}, 
    spending_limits::{self, DbConnSpendingLimitService}, 
    state::AppState, 
    suggestions::{self, DbConnSuggestionService}, 
    tokens::{password_hasher::Argon2PasswordHasher, token_service::JwtTokenService}, 
    transactions::{self, DbConnTransactionService}, 
    users::{self, DbConnUserService},
};
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    dotenvy::dotenv().ok();

    let time_provider = CoreTimeProvider::new_dyn();

    let db = Database::connect(dotenvy::var("DATABASE_URL")?).await?;
    create_tables(&db).await?;

    let config = serde_json::from_str::<Config>(&fs::read_to_string("config.json")?)?;
    let token_svc = JwtTokenService::new_dyn(
        dotenvy::var("TOKEN_SECRET")?, 
        time_provider.clone(), 
        config.token_svc_config,
    );
    let password_hasher = Argon2PasswordHasher::new_dyn();

    let limit_svc = DbConnSpendingLimitService::new_dyn(db.clone(), time_provider.clone());
    let user_svc = DbConnUserService::new_dyn(db.clone(), password_hasher.clone(), time_provider.clone());
    let auth_svc = CoreAuthService::new_dyn(db.clone(), user_svc.clone(), token_svc.clone(), password_hasher);
    let cat_svc = DbConnCategoryService::new_dyn(db.clone(), limit_svc.clone());
    let tx_svc = DbConnTransactionService::new_dyn(db.clone(), time_provider.clone(), limit_svc.clone());
    let notif_svc = DbConnNotificationService::new_dyn(db.clone(), time_provider.clone());
    let goal_svc = DbConnGoalService::new_dyn(db.clone(), time_provider.clone());
    let dashboard_svc = DbConnDashboardService::new_dyn(db.clone(), time_provider.clone(), limit_svc.clone());
    let report_svc = DbConnReportService::new_dyn(db.clone(), time_provider.clone());
    let suggestion_svc = DbConnSuggestionService::new_dyn(db.clone(), time_provider.clone());
    let mpesa_svc = DbConnMpesaService::new_dyn(db, time_provider, limit_svc.clone());

    let app_state = AppState { 
        auth_svc, 
        token_svc, 
        user_svc, 
        cat_svc, 
        tx_svc, 
        limit_svc, 
        notif_svc, 
        goal_svc, 
        dashboard_svc, 
        report_svc,
        suggestion_svc,
        mpesa_svc,
    };

    let app = Router::new()
        .nest(
            "/api", 
            Router::new()
                .nest("/auth", auth::routes::routes(app_state.clone()))
                .nest("/user", users::routes::routes(app_state.clone()))
                .nest("/categories", categories::routes::routes(app_state.clone()))
                .nest("/transactions", transactions::routes::routes(app_state.clone()))
                .nest("/dashboard", dashboard::routes::routes(app_state.clone()))
                .nest("/spending-limits", spending_limits::routes::routes(app_state.clone()))
                .nest("/notifications", notifications::routes::routes(app_state.clone()))
                .nest("/goals", goals::routes::routes(app_state.clone()))
                .nest("/reports", reports::routes::routes(app_state.clone()))
                .nest("/suggestions", suggestions::routes::routes(app_state.clone()))
                .nest("/mpesa", mpesa::routes::routes(app_state))
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
