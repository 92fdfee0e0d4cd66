use crate::config::PlatformConfig;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::storage::{Storage, keys};
use crate::utils::*;
use chrono::Utc;

#[derive(Clone)]
pub struct AuthService {
    storage: Storage,
    jwt_service: JwtService,
    platform: PlatformConfig,
}

impl AuthService {
    pub fn new(storage: Storage, jwt_service: JwtService, platform: PlatformConfig) -> Self {
        Self {
            storage,
            jwt_service,
            platform,
        }
    }

    fn normalize(&self, phone: &str) -> String {
        normalize_phone(phone, &self.platform.phone_country_code)
    }

    pub async fn register(&self, request: CreateUserRequest) -> AppResult<AuthResponse> {
        // 验证输入参数
        validate_phone(&request.phone_number)?;
        validate_password(&request.password)?;
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::ValidationError("Name is required".to_string()));
        }

        let phone_number = self.normalize(&request.phone_number);
        // 哈希在加锁前完成
        let password = hash_password_blocking(request.password).await?;

        let mut db = self.storage.lock().await;
        let mut users = db.users()?;

        // 检查手机号是否已注册
        if users.iter().any(|u| u.phone_number == phone_number) {
            return Err(AppError::ValidationError(
                "Phone number already exists".to_string(),
            ));
        }

        // 推荐码无效时按无推荐人处理
        let referred_by = request
            .referral_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .and_then(|code| users.iter().find(|u| u.referral_code == code))
            .map(|referrer| referrer.id.clone());

        let referral_code =
            generate_unique_referral_code(users.iter().map(|u| u.referral_code.as_str()));

        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            is_admin: self.platform.admin_phones.contains(&phone_number),
            phone_number,
            name: name.to_string(),
            password,
            balance: self.platform.welcome_bonus,
            total_invested: 0,
            total_earned: 0,
            referral_code,
            referred_by,
            referral_earnings: 0,
            face_verified: true,
            withdrawal_pin: None,
            created_at: Utc::now(),
        };

        users.push(user.clone());
        db.save_users(&users)?;
        log::info!("User {} registered ({})", user.id, user.phone_number);

        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let phone_number = self.normalize(&request.phone_number);
        let user = {
            let db = self.storage.lock().await;
            db.users()?
                .into_iter()
                .find(|u| u.phone_number == phone_number)
                .ok_or_else(|| {
                    AppError::AuthError("Invalid phone number or password".to_string())
                })?
        };

        if !verify_password_blocking(request.password, user.password.clone()).await? {
            return Err(AppError::AuthError(
                "Invalid phone number or password".to_string(),
            ));
        }

        self.issue_tokens(user)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;

        let db = self.storage.lock().await;
        let user = db
            .find_user(&claims.sub)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let access_token = self
            .jwt_service
            .generate_access_token(&user.id, &user.phone_number)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token: refresh_token.to_string(),
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    fn issue_tokens(&self, user: User) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(&user.id, &user.phone_number)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(&user.id, &user.phone_number)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    /// 生成6位重置码并按手机号保存；没有短信通道，重置码写入日志。
    /// 手机号未注册时返回 `false`。
    pub async fn send_password_reset_code(&self, phone: &str) -> AppResult<bool> {
        let phone_number = self.normalize(phone);
        let mut db = self.storage.lock().await;

        if !db.users()?.iter().any(|u| u.phone_number == phone_number) {
            return Ok(false);
        }

        let code = generate_six_digit_code();
        db.set_raw(&keys::reset_code(&phone_number), &code)?;
        log::info!("Reset code for {phone_number}: {code}");
        Ok(true)
    }

    /// 校验重置码并设置新密码，成功后删除重置码。重置码不过期。
    pub async fn verify_password_reset_code(
        &self,
        phone: &str,
        code: &str,
        new_password: &str,
    ) -> AppResult<bool> {
        validate_password(new_password)?;
        let phone_number = self.normalize(phone);
        let key = keys::reset_code(&phone_number);
        let password = hash_password_blocking(new_password.to_string()).await?;
        let mut db = self.storage.lock().await;

        if db.get_raw(&key)?.as_deref() != Some(code) {
            return Ok(false);
        }

        let mut users = db.users()?;
        let Some(user) = users.iter_mut().find(|u| u.phone_number == phone_number) else {
            return Ok(false);
        };
        user.password = password;
        db.save_users(&users)?;
        db.remove(&key)?;

        log::info!("Password reset for {phone_number}");
        Ok(true)
    }
}
