use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::ledger;
use crate::storage::Storage;
use crate::utils::verify_password_blocking;
use chrono::Utc;

#[derive(Clone)]
pub struct WithdrawalService {
    storage: Storage,
    min_withdrawal: i64,
}

impl WithdrawalService {
    pub fn new(storage: Storage, min_withdrawal: i64) -> Self {
        Self {
            storage,
            min_withdrawal,
        }
    }

    /// 提现表单校验后再登记申请
    pub async fn submit_withdrawal(
        &self,
        user_id: &str,
        request: CreateWithdrawalRequest,
    ) -> AppResult<WithdrawalRequest> {
        let bank = request.bank_details();
        let user = {
            let db = self.storage.lock().await;
            let user = db
                .find_user(user_id)?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

            if !db.investments()?.iter().any(|i| i.user_id == user_id) {
                return Err(AppError::ValidationError(
                    "You need at least one investment before withdrawing".to_string(),
                ));
            }
            user
        };

        let pin_hash = user.withdrawal_pin.ok_or_else(|| {
            AppError::ValidationError("Please set a withdrawal PIN first".to_string())
        })?;
        // PIN 校验不持有存储锁
        if !verify_password_blocking(request.pin, pin_hash).await? {
            return Err(AppError::AuthError("Incorrect withdrawal PIN".to_string()));
        }

        self.validate_form(request.amount, &bank, user.balance)?;
        self.request_withdrawal(user_id, request.amount, bank).await
    }

    fn validate_form(&self, amount: i64, bank: &BankDetails, balance: i64) -> AppResult<()> {
        if amount <= 0 {
            return Err(AppError::ValidationError(
                "Please enter a valid withdrawal amount".to_string(),
            ));
        }
        if amount < self.min_withdrawal {
            return Err(AppError::ValidationError(format!(
                "Minimum withdrawal amount is {} kobo",
                self.min_withdrawal
            )));
        }
        if amount > balance {
            return Err(AppError::ValidationError(
                "You don't have enough balance for this withdrawal".to_string(),
            ));
        }
        if bank.bank_name.is_empty() || bank.account_number.is_empty() || bank.account_name.is_empty()
        {
            return Err(AppError::ValidationError(
                "Please fill in all required fields".to_string(),
            ));
        }
        if bank.account_number.len() != 10 || !bank.account_number.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AppError::ValidationError(
                "Account number must be exactly 10 digits".to_string(),
            ));
        }
        Ok(())
    }

    /// 登记一笔待审核提现，不扣款也不检查余额
    pub async fn request_withdrawal(
        &self,
        user_id: &str,
        amount: i64,
        bank: BankDetails,
    ) -> AppResult<WithdrawalRequest> {
        let mut db = self.storage.lock().await;
        let user_name = db
            .find_user(user_id)?
            .map(|u| u.name)
            .unwrap_or_default();

        let withdrawal = WithdrawalRequest {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            user_name,
            amount,
            bank_name: bank.bank_name,
            account_number: bank.account_number,
            account_name: bank.account_name,
            timestamp: Utc::now(),
            status: WithdrawalStatus::Pending,
        };

        let mut withdrawals = db.withdrawals()?;
        withdrawals.push(withdrawal.clone());
        db.save_withdrawals(&withdrawals)?;

        log::info!(
            "Withdrawal {} requested by user {user_id}: {amount} kobo",
            withdrawal.id
        );
        Ok(withdrawal)
    }

    /// 批准提现并扣减余额。只处理待审核的申请，已处理过的原样返回。
    pub async fn approve_withdrawal(&self, withdrawal_id: &str) -> AppResult<Option<WithdrawalRequest>> {
        let mut db = self.storage.lock().await;
        let mut withdrawals = db.withdrawals()?;

        let Some(withdrawal) = withdrawals.iter_mut().find(|w| w.id == withdrawal_id) else {
            log::debug!("Withdrawal {withdrawal_id} not found, nothing to approve");
            return Ok(None);
        };
        if withdrawal.status != WithdrawalStatus::Pending {
            log::warn!(
                "Withdrawal {withdrawal_id} already {:?}, skipping approval",
                withdrawal.status
            );
            return Ok(Some(withdrawal.clone()));
        }

        let mut users = db.users()?;
        match ledger::find_user_mut(&mut users, &withdrawal.user_id) {
            Some(user) => {
                ledger::debit_withdrawal(user, withdrawal.amount);
                if user.balance < 0 {
                    log::warn!(
                        "User {} balance is negative after withdrawal {withdrawal_id}",
                        user.id
                    );
                }
            }
            None => log::warn!(
                "Withdrawal {withdrawal_id} belongs to unknown user {}",
                withdrawal.user_id
            ),
        }
        db.save_users(&users)?;

        withdrawal.status = WithdrawalStatus::Approved;
        let approved = withdrawal.clone();
        db.save_withdrawals(&withdrawals)?;

        log::info!("Withdrawal {withdrawal_id} approved: {} kobo", approved.amount);
        Ok(Some(approved))
    }

    /// 拒绝提现，余额不变
    pub async fn reject_withdrawal(&self, withdrawal_id: &str) -> AppResult<Option<WithdrawalRequest>> {
        let mut db = self.storage.lock().await;
        let mut withdrawals = db.withdrawals()?;

        let Some(withdrawal) = withdrawals.iter_mut().find(|w| w.id == withdrawal_id) else {
            return Ok(None);
        };
        if withdrawal.status != WithdrawalStatus::Pending {
            return Ok(Some(withdrawal.clone()));
        }

        withdrawal.status = WithdrawalStatus::Rejected;
        let rejected = withdrawal.clone();
        db.save_withdrawals(&withdrawals)?;

        log::info!("Withdrawal {withdrawal_id} rejected");
        Ok(Some(rejected))
    }

    pub async fn list_user_withdrawals(&self, user_id: &str) -> AppResult<Vec<WithdrawalRequest>> {
        let db = self.storage.lock().await;
        Ok(db
            .withdrawals()?
            .into_iter()
            .filter(|w| w.user_id == user_id)
            .collect())
    }

    pub async fn list_withdrawals(&self) -> AppResult<Vec<WithdrawalRequest>> {
        let db = self.storage.lock().await;
        db.withdrawals()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InvestmentService;
    use crate::services::ledger::test_support::user;
    use crate::utils::hash_password;
    use std::time::Instant;

    fn bank() -> BankDetails {
        BankDetails {
            bank_name: "Access Bank".into(),
            account_number: "0123456789".into(),
            account_name: "Ada Obi".into(),
        }
    }

    fn form(amount: i64, pin: &str) -> CreateWithdrawalRequest {
        CreateWithdrawalRequest {
            amount,
            bank_name: "Access Bank".into(),
            account_number: "0123456789".into(),
            account_name: "Ada Obi".into(),
            pin: pin.into(),
        }
    }

    async fn seeded(users: Vec<User>) -> (Storage, WithdrawalService) {
        let storage = Storage::in_memory();
        storage.lock().await.save_users(&users).unwrap();
        let service = WithdrawalService::new(storage.clone(), 100_000);
        (storage, service)
    }

    async fn balance(storage: &Storage, user_id: &str) -> i64 {
        storage.lock().await.find_user(user_id).unwrap().unwrap().balance
    }

    #[tokio::test]
    async fn test_request_does_not_debit() {
        let (storage, service) = seeded(vec![user("1", None)]).await;
        let w = service.request_withdrawal("1", 500_000, bank()).await.unwrap();
        assert_eq!(w.status, WithdrawalStatus::Pending);
        assert_eq!(w.user_name, "user-1");
        // 不校验余额
        assert_eq!(balance(&storage, "1").await, 100_000);
    }

    #[tokio::test]
    async fn test_approve_debits_exact_amount_once() {
        let (storage, service) = seeded(vec![user("1", None)]).await;
        let w = service.request_withdrawal("1", 60_000, bank()).await.unwrap();

        let approved = service.approve_withdrawal(&w.id).await.unwrap().unwrap();
        assert_eq!(approved.status, WithdrawalStatus::Approved);
        assert_eq!(balance(&storage, "1").await, 40_000);

        // 再次批准不重复扣款
        service.approve_withdrawal(&w.id).await.unwrap();
        assert_eq!(balance(&storage, "1").await, 40_000);
    }

    #[tokio::test]
    async fn test_approve_can_drive_balance_negative() {
        let (storage, service) = seeded(vec![user("1", None)]).await;
        let w = service.request_withdrawal("1", 300_000, bank()).await.unwrap();
        service.approve_withdrawal(&w.id).await.unwrap();
        assert_eq!(balance(&storage, "1").await, -200_000);
    }

    #[tokio::test]
    async fn test_reject_leaves_balance() {
        let (storage, service) = seeded(vec![user("1", None)]).await;
        let w = service.request_withdrawal("1", 60_000, bank()).await.unwrap();

        let rejected = service.reject_withdrawal(&w.id).await.unwrap().unwrap();
        assert_eq!(rejected.status, WithdrawalStatus::Rejected);
        assert_eq!(balance(&storage, "1").await, 100_000);

        // 已拒绝的申请不能再被批准
        let still = service.approve_withdrawal(&w.id).await.unwrap().unwrap();
        assert_eq!(still.status, WithdrawalStatus::Rejected);
        assert_eq!(balance(&storage, "1").await, 100_000);
    }

    #[tokio::test]
    async fn test_unknown_withdrawal_is_noop() {
        let (_, service) = seeded(vec![user("1", None)]).await;
        assert!(service.approve_withdrawal("x").await.unwrap().is_none());
        assert!(service.reject_withdrawal("x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_submit_requires_investment_and_pin() {
        let mut u = user("1", None);
        u.balance = 500_000;
        let (storage, service) = seeded(vec![u]).await;

        let err = service.submit_withdrawal("1", form(150_000, "1234")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let investments = InvestmentService::new(storage.clone());
        let p = investments.create_investment("1", "1", 200_000).await.unwrap();
        investments.confirm_payment(&p.id).await.unwrap();

        // 未设置 PIN
        let err = service.submit_withdrawal("1", form(150_000, "1234")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        {
            let mut db = storage.lock().await;
            let mut users = db.users().unwrap();
            users[0].withdrawal_pin = Some(hash_password("1234").unwrap());
            db.save_users(&users).unwrap();
        }

        let err = service.submit_withdrawal("1", form(150_000, "9999")).await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));

        let w = service.submit_withdrawal("1", form(150_000, "1234")).await.unwrap();
        assert_eq!(w.amount, 150_000);
        assert_eq!(service.list_user_withdrawals("1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_releases_storage_during_pin_check() {
        let mut u = user("1", None);
        u.balance = 500_000;
        u.withdrawal_pin = Some(hash_password("1234").unwrap());
        let (storage, service) = seeded(vec![u]).await;

        let investments = InvestmentService::new(storage.clone());
        let p = investments.create_investment("1", "1", 200_000).await.unwrap();
        investments.confirm_payment(&p.id).await.unwrap();

        let (submitted, lock_taken) = tokio::join!(
            async {
                service.submit_withdrawal("1", form(150_000, "1234")).await.unwrap();
                Instant::now()
            },
            async {
                let _db = storage.lock().await;
                Instant::now()
            },
        );
        assert!(lock_taken < submitted);
    }

    #[test]
    fn test_validate_form_rules() {
        let service = WithdrawalService::new(Storage::in_memory(), 100_000);
        assert!(service.validate_form(150_000, &bank(), 200_000).is_ok());
        assert!(service.validate_form(0, &bank(), 200_000).is_err());
        assert!(service.validate_form(50_000, &bank(), 200_000).is_err());
        assert!(service.validate_form(300_000, &bank(), 200_000).is_err());

        let mut short = bank();
        short.account_number = "12345".into();
        assert!(service.validate_form(150_000, &short, 200_000).is_err());

        let mut missing = bank();
        missing.account_name = String::new();
        assert!(service.validate_form(150_000, &missing, 200_000).is_err());
    }
}
