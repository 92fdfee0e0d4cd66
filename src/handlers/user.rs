use super::current_user_id;
use crate::models::*;
use crate::services::{ReferralService, UserService};
use crate::utils::PaginationParams;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/user/profile",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取用户资料成功", body = ProfileResponse),
        (status = 401, description = "未授权"),
        (status = 404, description = "用户不存在")
    )
)]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match user_service.get_profile(&user_id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(ApiResponse::success(profile))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/user/profile",
    tag = "user",
    request_body = UpdateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "更新用户资料成功", body = UserResponse),
        (status = 401, description = "未授权"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn update_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<UpdateUserRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match user_service.update_user(&user_id, request.into_inner()).await {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(user))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/referrals",
    tag = "user",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取推荐列表成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_referrals(
    referral_service: web::Data<ReferralService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match referral_service
        .list_referrals(&user_id, &query.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/referral-link",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取推荐链接成功", body = ReferralLinkResponse),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_referral_link(
    referral_service: web::Data<ReferralService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match referral_service.referral_link(&user_id).await {
        Ok(link) => Ok(HttpResponse::Ok().json(ApiResponse::success(link))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/user/withdrawal-pin",
    tag = "user",
    request_body = SetWithdrawalPinRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "提现密码设置成功"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn set_withdrawal_pin(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<SetWithdrawalPinRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match user_service
        .set_withdrawal_pin(&user_id, request.into_inner())
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Withdrawal PIN set successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/user/withdrawal-pin/verify",
    tag = "user",
    request_body = VerifyWithdrawalPinRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "校验结果"),
        (status = 401, description = "未授权")
    )
)]
pub async fn verify_withdrawal_pin(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<VerifyWithdrawalPinRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match user_service
        .verify_withdrawal_pin(&user_id, &request.pin)
        .await
    {
        Ok(valid) => Ok(HttpResponse::Ok().json(ApiResponse::success(json!({ "valid": valid })))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/user/face-verification",
    tag = "user",
    request_body = FaceVerificationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "人脸核验已记录"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn face_verification(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    request: web::Json<FaceVerificationRequest>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match user_service
        .record_face_verification(&user_id, request.into_inner())
        .await
    {
        Ok(record) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            json!({ "verified": record.verified, "timestamp": record.timestamp }),
            "Face verification completed",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/transactions",
    tag = "user",
    params(
        ("page" = Option<u32>, Query, description = "页码"),
        ("per_page" = Option<u32>, Query, description = "每页数量")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "获取交易记录成功"),
        (status = 401, description = "未授权")
    )
)]
pub async fn get_transactions(
    user_service: web::Data<UserService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    let user_id = current_user_id(&req)?;

    match user_service
        .transaction_history(&user_id, &query.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile))
            .route("/referrals", web::get().to(get_referrals))
            .route("/referral-link", web::get().to(get_referral_link))
            .route("/withdrawal-pin", web::post().to(set_withdrawal_pin))
            .route("/withdrawal-pin/verify", web::post().to(verify_withdrawal_pin))
            .route("/face-verification", web::post().to(face_verification))
            .route("/transactions", web::get().to(get_transactions)),
    );
}
