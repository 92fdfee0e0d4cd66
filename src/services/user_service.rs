use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::investment_service::summarize_portfolio;
use crate::storage::Storage;
use crate::utils::*;
use chrono::Utc;

#[derive(Clone)]
pub struct UserService {
    storage: Storage,
}

impl UserService {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// 获取用户资料、推荐人数与投资组合汇总
    pub async fn get_profile(&self, user_id: &str) -> AppResult<ProfileResponse> {
        let db = self.storage.lock().await;
        let users = db.users()?;
        let user = users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let total_referrals = users
            .iter()
            .filter(|u| u.referred_by.as_deref() == Some(user_id))
            .count() as i64;
        let portfolio = summarize_portfolio(&db.investments()?, user_id);

        let mut user = UserResponse::from(user);
        user.total_referrals = total_referrals;
        Ok(ProfileResponse { user, portfolio })
    }

    pub async fn require_admin(&self, user_id: &str) -> AppResult<User> {
        let db = self.storage.lock().await;
        match db.find_user(user_id)? {
            Some(user) if user.is_admin => Ok(user),
            Some(_) => Err(AppError::PermissionDenied),
            None => Err(AppError::AuthError("Unknown user".to_string())),
        }
    }

    /// 合并资料字段
    pub async fn update_user(
        &self,
        user_id: &str,
        request: UpdateUserRequest,
    ) -> AppResult<UserResponse> {
        if request.name.is_none() && request.face_verified.is_none() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }
        if let Some(name) = &request.name {
            let len = name.trim().chars().count();
            if !(2..=50).contains(&len) {
                return Err(AppError::ValidationError(
                    "Name length must be between 2 and 50 characters".to_string(),
                ));
            }
        }

        let mut db = self.storage.lock().await;
        let mut users = db.users()?;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if let Some(name) = request.name {
            user.name = name.trim().to_string();
        }
        if let Some(face_verified) = request.face_verified {
            user.face_verified = face_verified;
        }
        let updated = user.clone();
        db.save_users(&users)?;

        Ok(UserResponse::from(updated))
    }

    pub async fn set_withdrawal_pin(
        &self,
        user_id: &str,
        request: SetWithdrawalPinRequest,
    ) -> AppResult<()> {
        validate_withdrawal_pin(&request.pin)?;
        if request.pin != request.confirm_pin {
            return Err(AppError::ValidationError("PINs do not match".to_string()));
        }

        let pin_hash = hash_password_blocking(request.pin).await?;

        let mut db = self.storage.lock().await;
        let mut users = db.users()?;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.withdrawal_pin = Some(pin_hash);
        db.save_users(&users)?;

        log::info!("Withdrawal PIN set for user {user_id}");
        Ok(())
    }

    pub async fn verify_withdrawal_pin(&self, user_id: &str, pin: &str) -> AppResult<bool> {
        let user = self
            .storage
            .lock()
            .await
            .find_user(user_id)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        match user.withdrawal_pin {
            Some(hash) => verify_password_blocking(pin.to_string(), hash).await,
            None => Ok(false),
        }
    }

    /// 保存人脸核验记录并标记用户已核验。图像内容不做任何解析。
    pub async fn record_face_verification(
        &self,
        user_id: &str,
        request: FaceVerificationRequest,
    ) -> AppResult<FaceVerification> {
        if request.face_image.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Face image is required".to_string(),
            ));
        }

        let mut db = self.storage.lock().await;
        let mut users = db.users()?;
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.face_verified = true;

        let record = FaceVerification {
            user_id: user_id.to_string(),
            face_image: request.face_image,
            steps: request.steps,
            verified: true,
            timestamp: Utc::now(),
        };
        let mut records = db.face_verifications()?;
        records.push(record.clone());
        db.save_face_verifications(&records)?;
        db.save_users(&users)?;

        Ok(record)
    }

    /// 投资、提现、存款合并后按日期倒序分页
    pub async fn transaction_history(
        &self,
        user_id: &str,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<TransactionEntry>> {
        let db = self.storage.lock().await;

        let investments = db
            .investments()?
            .into_iter()
            .filter(|i| i.user_id == user_id)
            .map(|i| TransactionEntry {
                description: format!("Investment in {}", i.plan_name),
                id: i.id,
                kind: TransactionKind::Investment,
                amount: i.amount,
                date: i.start_date,
                status: status_label(&i.status),
            });
        let withdrawals = db
            .withdrawals()?
            .into_iter()
            .filter(|w| w.user_id == user_id)
            .map(|w| TransactionEntry {
                description: format!("Withdrawal to {}", w.bank_name),
                id: w.id,
                kind: TransactionKind::Withdrawal,
                amount: w.amount,
                date: w.timestamp,
                status: status_label(&w.status),
            });
        let deposits = db
            .pending_payments()?
            .into_iter()
            .filter(|p| p.user_id == user_id)
            .map(|p| TransactionEntry {
                description: format!("Deposit for {}", p.plan_name),
                id: p.id,
                kind: TransactionKind::Deposit,
                amount: p.amount,
                date: p.timestamp,
                status: status_label(&p.status),
            });

        let mut all: Vec<TransactionEntry> =
            investments.chain(withdrawals).chain(deposits).collect();
        all.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(PaginatedResponse::from_all(all, params))
    }
}

fn status_label<T: serde::Serialize>(status: &T) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
