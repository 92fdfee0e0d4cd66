use super::current_user_id;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{InvestmentService, UserService, WithdrawalService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

async fn ensure_admin(user_service: &UserService, req: &HttpRequest) -> AppResult<()> {
    let user_id = current_user_id(req)?;
    user_service.require_admin(&user_id).await.map(|_| ())
}

/// 已处理过的提现申请不能再次审核
fn ensure_status(
    withdrawal: WithdrawalRequest,
    expected: WithdrawalStatus,
) -> AppResult<WithdrawalRequest> {
    if withdrawal.status == expected {
        Ok(withdrawal)
    } else {
        Err(AppError::ValidationError(format!(
            "Withdrawal already {:?}",
            withdrawal.status
        )))
    }
}

#[utoipa::path(
    get,
    path = "/admin/payments",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "待确认存款列表", body = [PendingPaymentResponse]),
        (status = 403, description = "无管理员权限")
    )
)]
pub async fn list_payments(
    user_service: web::Data<UserService>,
    investment_service: web::Data<InvestmentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = ensure_admin(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match investment_service.list_pending_payments().await {
        Ok(payments) => {
            let payments: Vec<PendingPaymentResponse> =
                payments.into_iter().map(PendingPaymentResponse::from).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(payments)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/payments/{id}/confirm",
    tag = "admin",
    params(
        ("id" = String, Path, description = "存款ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "存款已确认，投资已生效", body = InvestmentResponse),
        (status = 403, description = "无管理员权限"),
        (status = 404, description = "存款不存在")
    )
)]
pub async fn confirm_payment(
    user_service: web::Data<UserService>,
    investment_service: web::Data<InvestmentService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = ensure_admin(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match investment_service.confirm_payment(&path).await {
        Ok(Some(investment)) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            InvestmentResponse::from(investment),
            "Payment confirmed and investment activated",
        ))),
        Ok(None) => Ok(AppError::NotFound("Payment not found".to_string()).error_response()),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/payments/{id}/reject",
    tag = "admin",
    params(
        ("id" = String, Path, description = "存款ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "存款已拒绝"),
        (status = 403, description = "无管理员权限"),
        (status = 404, description = "存款不存在")
    )
)]
pub async fn reject_payment(
    user_service: web::Data<UserService>,
    investment_service: web::Data<InvestmentService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = ensure_admin(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match investment_service.reject_payment(&path).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::message("Payment rejected"))),
        Ok(false) => Ok(AppError::NotFound("Payment not found".to_string()).error_response()),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/withdrawals",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部提现申请", body = [WithdrawalResponse]),
        (status = 403, description = "无管理员权限")
    )
)]
pub async fn list_withdrawals(
    user_service: web::Data<UserService>,
    withdrawal_service: web::Data<WithdrawalService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = ensure_admin(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match withdrawal_service.list_withdrawals().await {
        Ok(withdrawals) => {
            let withdrawals: Vec<WithdrawalResponse> =
                withdrawals.into_iter().map(WithdrawalResponse::from).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(withdrawals)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/withdrawals/{id}/approve",
    tag = "admin",
    params(
        ("id" = String, Path, description = "提现申请ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提现已批准", body = WithdrawalResponse),
        (status = 400, description = "申请已处理"),
        (status = 403, description = "无管理员权限"),
        (status = 404, description = "申请不存在")
    )
)]
pub async fn approve_withdrawal(
    user_service: web::Data<UserService>,
    withdrawal_service: web::Data<WithdrawalService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = ensure_admin(&user_service, &req).await {
        return Ok(e.error_response());
    }

    let result = match withdrawal_service.approve_withdrawal(&path).await {
        Ok(Some(w)) => ensure_status(w, WithdrawalStatus::Approved),
        Ok(None) => Err(AppError::NotFound("Withdrawal not found".to_string())),
        Err(e) => Err(e),
    };
    match result {
        Ok(withdrawal) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            WithdrawalResponse::from(withdrawal),
            "Withdrawal approved",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/withdrawals/{id}/reject",
    tag = "admin",
    params(
        ("id" = String, Path, description = "提现申请ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提现已拒绝", body = WithdrawalResponse),
        (status = 400, description = "申请已处理"),
        (status = 403, description = "无管理员权限"),
        (status = 404, description = "申请不存在")
    )
)]
pub async fn reject_withdrawal(
    user_service: web::Data<UserService>,
    withdrawal_service: web::Data<WithdrawalService>,
    req: HttpRequest,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    if let Err(e) = ensure_admin(&user_service, &req).await {
        return Ok(e.error_response());
    }

    let result = match withdrawal_service.reject_withdrawal(&path).await {
        Ok(Some(w)) => ensure_status(w, WithdrawalStatus::Rejected),
        Ok(None) => Err(AppError::NotFound("Withdrawal not found".to_string())),
        Err(e) => Err(e),
    };
    match result {
        Ok(withdrawal) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            WithdrawalResponse::from(withdrawal),
            "Withdrawal rejected",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/investments",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "全部投资", body = [InvestmentResponse]),
        (status = 403, description = "无管理员权限")
    )
)]
pub async fn list_investments(
    user_service: web::Data<UserService>,
    investment_service: web::Data<InvestmentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = ensure_admin(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match investment_service.list_investments().await {
        Ok(investments) => {
            let investments: Vec<InvestmentResponse> =
                investments.into_iter().map(InvestmentResponse::from).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(investments)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/stats",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "平台统计", body = PlatformStats),
        (status = 403, description = "无管理员权限")
    )
)]
pub async fn get_stats(
    user_service: web::Data<UserService>,
    investment_service: web::Data<InvestmentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = ensure_admin(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match investment_service.platform_stats().await {
        Ok(stats) => Ok(HttpResponse::Ok().json(ApiResponse::success(stats))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/accrual",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "收益结算完成", body = AccrualResponse),
        (status = 403, description = "无管理员权限")
    )
)]
pub async fn run_accrual(
    user_service: web::Data<UserService>,
    investment_service: web::Data<InvestmentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = ensure_admin(&user_service, &req).await {
        return Ok(e.error_response());
    }

    match investment_service.update_investments().await {
        Ok(updated) => Ok(HttpResponse::Ok().json(ApiResponse::success(AccrualResponse {
            updated,
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/payments", web::get().to(list_payments))
            .route("/payments/{id}/confirm", web::post().to(confirm_payment))
            .route("/payments/{id}/reject", web::post().to(reject_payment))
            .route("/withdrawals", web::get().to(list_withdrawals))
            .route("/withdrawals/{id}/approve", web::post().to(approve_withdrawal))
            .route("/withdrawals/{id}/reject", web::post().to(reject_withdrawal))
            .route("/investments", web::get().to(list_investments))
            .route("/stats", web::get().to(get_stats))
            .route("/accrual", web::post().to(run_accrual)),
    );
}
