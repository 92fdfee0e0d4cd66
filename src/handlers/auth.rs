use crate::error::AppError;
use crate::models::*;
use crate::services::AuthService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "注册成功", body = AuthResponse),
        (status = 400, description = "请求参数错误"),
        (status = 500, description = "服务器内部错误")
    )
)]
pub async fn register(
    auth_service: web::Data<AuthService>,
    request: web::Json<CreateUserRequest>,
) -> Result<HttpResponse> {
    match auth_service.register(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success_with_message(
            response,
            "Account created successfully",
        ))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "登录成功", body = AuthResponse),
        (status = 401, description = "认证失败"),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    match auth_service.login(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "刷新令牌成功", body = AuthResponse),
        (status = 401, description = "无效的刷新令牌")
    )
)]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    request: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse> {
    match auth_service.refresh_token(&request.refresh_token).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "登出成功")
    )
)]
pub async fn logout() -> Result<HttpResponse> {
    // 令牌失效由客户端处理
    Ok(HttpResponse::Ok().json(ApiResponse::message("Logged out")))
}

#[utoipa::path(
    post,
    path = "/auth/password-reset/send",
    tag = "auth",
    request_body = SendResetCodeRequest,
    responses(
        (status = 200, description = "重置码已生成"),
        (status = 404, description = "手机号未注册")
    )
)]
pub async fn send_reset_code(
    auth_service: web::Data<AuthService>,
    request: web::Json<SendResetCodeRequest>,
) -> Result<HttpResponse> {
    match auth_service
        .send_password_reset_code(&request.phone_number)
        .await
    {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Reset code sent to your phone number",
        ))),
        Ok(false) => Ok(AppError::NotFound("Phone number not registered".to_string()).error_response()),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/auth/password-reset/verify",
    tag = "auth",
    request_body = VerifyResetCodeRequest,
    responses(
        (status = 200, description = "密码已重置"),
        (status = 400, description = "重置码无效")
    )
)]
pub async fn verify_reset_code(
    auth_service: web::Data<AuthService>,
    request: web::Json<VerifyResetCodeRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();
    match auth_service
        .verify_password_reset_code(&request.phone_number, &request.code, &request.new_password)
        .await
    {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::message(
            "Password reset successfully",
        ))),
        Ok(false) => Ok(AppError::ValidationError("Invalid reset code".to_string()).error_response()),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn auth_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/refresh", web::post().to(refresh))
            .route("/logout", web::post().to(logout))
            .route("/password-reset/send", web::post().to(send_reset_code))
            .route("/password-reset/verify", web::post().to(verify_reset_code)),
    );
}
