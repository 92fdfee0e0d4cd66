use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;
use crate::utils::PaginationInfo;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::send_reset_code,
        handlers::auth::verify_reset_code,
        handlers::user::get_profile,
        handlers::user::update_profile,
        handlers::user::get_referrals,
        handlers::user::get_referral_link,
        handlers::user::set_withdrawal_pin,
        handlers::user::verify_withdrawal_pin,
        handlers::user::face_verification,
        handlers::user::get_transactions,
        handlers::investment::list_plans,
        handlers::investment::create_investment,
        handlers::investment::list_investments,
        handlers::withdrawal::create_withdrawal,
        handlers::withdrawal::list_withdrawals,
        handlers::admin::list_payments,
        handlers::admin::confirm_payment,
        handlers::admin::reject_payment,
        handlers::admin::list_withdrawals,
        handlers::admin::approve_withdrawal,
        handlers::admin::reject_withdrawal,
        handlers::admin::list_investments,
        handlers::admin::get_stats,
        handlers::admin::run_accrual,
    ),
    components(
        schemas(
            UserResponse,
            ProfileResponse,
            CreateUserRequest,
            LoginRequest,
            UpdateUserRequest,
            AuthResponse,
            RefreshTokenRequest,
            SendResetCodeRequest,
            VerifyResetCodeRequest,
            SetWithdrawalPinRequest,
            VerifyWithdrawalPinRequest,
            ReferralLinkResponse,
            FaceVerificationRequest,
            InvestmentPlan,
            PaymentStatus,
            InvestmentStatus,
            CreateInvestmentRequest,
            CreateInvestmentResponse,
            PendingPaymentResponse,
            InvestmentResponse,
            PortfolioSummary,
            PlatformStats,
            AccrualResponse,
            WithdrawalStatus,
            BankDetails,
            CreateWithdrawalRequest,
            WithdrawalResponse,
            TransactionKind,
            TransactionEntry,
            PaginationInfo,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication API"),
        (name = "user", description = "User account API"),
        (name = "investment", description = "Investment plans and deposits API"),
        (name = "withdrawal", description = "Withdrawal API"),
        (name = "admin", description = "Administration API"),
    ),
    info(
        title = "HYIP Backend API",
        version = "1.0.0",
        description = "HYIP investment tracking REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
