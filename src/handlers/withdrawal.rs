use super::current_user_id;
use crate::models::*;
use crate::services::WithdrawalService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/withdrawals",
    tag = "withdrawal",
    request_body = CreateWithdrawalRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提现申请已提交", body = WithdrawalResponse),
        (status = 400, description = "请求参数错误"),
        (status = 401, description = "提现密码错误")
    )
)]
pub async fn create_withdrawal(
    withdrawal_service: web::Data<WithdrawalService>,
    req: HttpRequest,
    request: web::Json<CreateWithdrawalRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match withdrawal_service
        .submit_withdrawal(&user_id, request.into_inner())
        .await
    {
        Ok(withdrawal) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            WithdrawalResponse::from(withdrawal),
            "Withdrawal request submitted",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/withdrawals",
    tag = "withdrawal",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "当前用户的提现申请", body = [WithdrawalResponse]),
        (status = 401, description = "未授权")
    )
)]
pub async fn list_withdrawals(
    withdrawal_service: web::Data<WithdrawalService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match withdrawal_service.list_user_withdrawals(&user_id).await {
        Ok(withdrawals) => {
            let withdrawals: Vec<WithdrawalResponse> =
                withdrawals.into_iter().map(WithdrawalResponse::from).collect();
            Ok(HttpResponse::Ok().json(ApiResponse::success(withdrawals)))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn withdrawal_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/withdrawals")
            .route("", web::post().to(create_withdrawal))
            .route("", web::get().to(list_withdrawals)),
    );
}
