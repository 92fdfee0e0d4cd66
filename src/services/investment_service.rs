use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{ledger, referral_service};
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// 汇总某个用户的投资组合
pub fn summarize_portfolio(investments: &[Investment], user_id: &str) -> PortfolioSummary {
    investments
        .iter()
        .filter(|i| i.user_id == user_id)
        .fold(PortfolioSummary::default(), |mut acc, i| {
            match i.status {
                InvestmentStatus::Active => acc.active_investments += 1,
                InvestmentStatus::Completed => acc.completed_investments += 1,
                InvestmentStatus::Pending => {}
            }
            acc.total_invested += i.amount;
            acc.accrued_earnings += i.total_earned;
            acc.expected_return += i.total_return;
            acc
        })
}

#[derive(Clone)]
pub struct InvestmentService {
    storage: Storage,
    plans: Arc<Vec<InvestmentPlan>>,
}

impl InvestmentService {
    pub fn new(storage: Storage) -> Self {
        Self::with_plans(storage, default_plans())
    }

    pub fn with_plans(storage: Storage, plans: Vec<InvestmentPlan>) -> Self {
        Self {
            storage,
            plans: Arc::new(plans),
        }
    }

    pub fn plans(&self) -> &[InvestmentPlan] {
        &self.plans
    }

    pub fn find_plan(&self, plan_id: &str) -> Option<&InvestmentPlan> {
        self.plans.iter().find(|p| p.id == plan_id)
    }

    /// 记录一笔待确认的存款。金额是否落在方案区间内由调用方检查。
    pub async fn create_investment(
        &self,
        user_id: &str,
        plan_id: &str,
        amount: i64,
    ) -> AppResult<PendingPayment> {
        let plan = self
            .find_plan(plan_id)
            .ok_or_else(|| AppError::NotFound("Plan not found".to_string()))?;
        if total_return(amount, plan.roi, plan.duration).is_none() {
            return Err(AppError::ValidationError("Amount is too large".to_string()));
        }

        let mut db = self.storage.lock().await;
        let user = db
            .find_user(user_id)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let payment = PendingPayment {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user.id,
            user_name: user.name,
            plan_id: plan.id.clone(),
            plan_name: plan.name.clone(),
            amount,
            timestamp: Utc::now(),
            status: PaymentStatus::Pending,
        };

        let mut payments = db.pending_payments()?;
        payments.push(payment.clone());
        db.save_pending_payments(&payments)?;

        log::info!(
            "Pending payment {} created: user {} plan {} amount {}",
            payment.id,
            payment.user_id,
            payment.plan_id,
            payment.amount
        );
        Ok(payment)
    }

    pub async fn confirm_payment(&self, payment_id: &str) -> AppResult<Option<Investment>> {
        self.confirm_payment_at(payment_id, Utc::now()).await
    }

    /// 确认存款：生成投资、给用户记账、结算推荐佣金并移除待确认记录。
    /// 付款或方案不存在时静默返回 `None`。
    pub async fn confirm_payment_at(
        &self,
        payment_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Investment>> {
        let mut db = self.storage.lock().await;
        let mut payments = db.pending_payments()?;

        let Some(payment) = payments.iter().find(|p| p.id == payment_id).cloned() else {
            log::debug!("Payment {payment_id} not found, nothing to confirm");
            return Ok(None);
        };
        let Some(plan) = self.find_plan(&payment.plan_id) else {
            log::warn!(
                "Payment {payment_id} references unknown plan {}",
                payment.plan_id
            );
            return Ok(None);
        };

        let Some(investment) = Investment::from_payment(&payment, plan, now) else {
            log::warn!(
                "Payment {payment_id} amount {} overflows plan returns",
                payment.amount
            );
            return Ok(None);
        };
        let mut investments = db.investments()?;
        investments.push(investment.clone());
        db.save_investments(&investments)?;

        let mut users = db.users()?;
        match ledger::find_user_mut(&mut users, &payment.user_id) {
            Some(user) => ledger::credit_deposit(user, payment.amount),
            None => log::warn!(
                "Payment {payment_id} belongs to unknown user {}",
                payment.user_id
            ),
        }
        if let Some((referrer_id, commission)) =
            referral_service::credit_commission(&mut users, &payment.user_id, payment.amount)
        {
            log::info!("Referral commission of {commission} kobo paid to user {referrer_id}");
        }
        db.save_users(&users)?;

        payments.retain(|p| p.id != payment_id);
        db.save_pending_payments(&payments)?;

        log::info!(
            "Payment {payment_id} confirmed, investment {} is active",
            investment.id
        );
        Ok(Some(investment))
    }

    /// 移除待确认存款，返回是否确实删除了记录
    pub async fn reject_payment(&self, payment_id: &str) -> AppResult<bool> {
        let mut db = self.storage.lock().await;
        let mut payments = db.pending_payments()?;
        let before = payments.len();
        payments.retain(|p| p.id != payment_id);
        let removed = payments.len() != before;
        db.save_pending_payments(&payments)?;

        if removed {
            log::info!("Payment {payment_id} rejected");
        }
        Ok(removed)
    }

    pub async fn update_investments(&self) -> AppResult<usize> {
        self.update_investments_at(Utc::now()).await
    }

    /// 重算所有进行中投资的收益，返回有变化的记录数
    pub async fn update_investments_at(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let mut db = self.storage.lock().await;
        let mut investments = db.investments()?;

        let mut updated = 0;
        for investment in investments.iter_mut() {
            if investment.accrue(now) {
                updated += 1;
            }
        }
        if updated > 0 {
            db.save_investments(&investments)?;
        }
        Ok(updated)
    }

    pub async fn list_user_investments(&self, user_id: &str) -> AppResult<Vec<Investment>> {
        self.update_investments().await?;
        let db = self.storage.lock().await;
        Ok(db
            .investments()?
            .into_iter()
            .filter(|i| i.user_id == user_id)
            .collect())
    }

    pub async fn list_investments(&self) -> AppResult<Vec<Investment>> {
        self.update_investments().await?;
        let db = self.storage.lock().await;
        db.investments()
    }

    pub async fn list_pending_payments(&self) -> AppResult<Vec<PendingPayment>> {
        let db = self.storage.lock().await;
        db.pending_payments()
    }

    pub async fn portfolio_summary(&self, user_id: &str) -> AppResult<PortfolioSummary> {
        let db = self.storage.lock().await;
        Ok(summarize_portfolio(&db.investments()?, user_id))
    }

    pub async fn platform_stats(&self) -> AppResult<PlatformStats> {
        let db = self.storage.lock().await;
        let investments = db.investments()?;
        let count = |status: InvestmentStatus| {
            investments.iter().filter(|i| i.status == status).count() as i64
        };

        Ok(PlatformStats {
            total_users: db.users()?.len() as i64,
            pending_payments: db.pending_payments()?.len() as i64,
            total_invested: investments.iter().map(|i| i.amount).sum(),
            active_investments: count(InvestmentStatus::Active),
            completed_investments: count(InvestmentStatus::Completed),
            pending_withdrawals: db
                .withdrawals()?
                .iter()
                .filter(|w| w.status == WithdrawalStatus::Pending)
                .count() as i64,
        })
    }
}
