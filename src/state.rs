use axum_macros::FromRef;

use crate::{
    auth::DynAuthService, categories::DynCategoryService, dashboard::DynDashboardService, 
    goals::DynGoalService, mpesa::DynMpesaService, notifications::DynNotificationService, reports::DynReportService, 
    spending_limits::DynSpendingLimitService, suggestions::DynSuggestionService, tokens::token_service::DynTokenService, 
    transactions::DynTransactionService, users::DynUserService,
};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub auth_svc: DynAuthService,
    pub token_svc: DynTokenService,
    pub user_svc: DynUserService,
    pub cat_svc: DynCategoryService,
    pub tx_svc: DynTransactionService,
    pub limit_svc: DynSpendingLimitService,
    pub notif_svc: DynNotificationService,
    pub goal_svc: DynGoalService,
    pub dashboard_svc: DynDashboardService,
    pub report_svc: DynReportService,
    pub suggestion_svc: DynSuggestionService,
    pub mpesa_svc: DynMpesaService,
}
