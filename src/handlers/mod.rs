pub mod admin;
pub mod auth;
pub mod investment;
pub mod user;
pub mod withdrawal;

pub use admin::admin_config;
pub use auth::auth_config;
pub use investment::investment_config;
pub use user::user_config;
pub use withdrawal::withdrawal_config;

use crate::error::{AppError, AppResult};
use crate::middlewares::CurrentUser;
use actix_web::{HttpMessage, HttpRequest};

/// 认证中间件写入的用户ID
pub(crate) fn current_user_id(req: &HttpRequest) -> AppResult<String> {
    req.extensions()
        .get::<CurrentUser>()
        .map(|user| user.0.clone())
        .ok_or_else(|| AppError::AuthError("Missing access token".to_string()))
}
