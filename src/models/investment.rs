use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const KOBO_PER_NAIRA: i64 = 100;

/// 静态方案目录中的一项；`min_amount == max_amount` 表示固定金额方案
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct InvestmentPlan {
    pub id: String,
    pub name: String,
    pub car_name: String,
    pub min_amount: i64,
    pub max_amount: i64,
    /// 每日收益百分比
    pub roi: i64,
    /// 天数
    pub duration: i64,
    pub total_return: i64,
    pub description: String,
    #[serde(default)]
    pub popular: bool,
}

impl InvestmentPlan {
    fn fixed(id: &str, car_name: &str, naira: i64, description: &str, popular: bool) -> Self {
        let amount = naira * KOBO_PER_NAIRA;
        let roi = 16;
        let duration = 30;
        Self {
            id: id.to_string(),
            name: format!("Plan {id}"),
            car_name: car_name.to_string(),
            min_amount: amount,
            max_amount: amount,
            roi,
            duration,
            total_return: total_return(amount, roi, duration).unwrap_or(i64::MAX),
            description: description.to_string(),
            popular,
        }
    }

    pub fn accepts(&self, amount: i64) -> bool {
        amount >= self.min_amount && amount <= self.max_amount
    }
}

pub fn default_plans() -> Vec<InvestmentPlan> {
    vec![
        InvestmentPlan::fixed(
            "1",
            "Toyota Camry 2025",
            2_000,
            "Reliable starter plan - Earn ₦320 daily for 30 days",
            false,
        ),
        InvestmentPlan::fixed(
            "2",
            "Mazda CX-5 2025",
            4_000,
            "Smooth performance - Earn ₦640 daily for 30 days",
            false,
        ),
        InvestmentPlan::fixed(
            "3",
            "BMW X3 2025",
            6_000,
            "Luxury comfort - Earn ₦960 daily for 30 days",
            false,
        ),
        InvestmentPlan::fixed(
            "4",
            "Mercedes-Benz C-Class 2025",
            10_000,
            "Premium elegance - Earn ₦1,600 daily for 30 days",
            true,
        ),
        InvestmentPlan::fixed(
            "5",
            "Tesla Model S 2025",
            20_000,
            "Electric innovation - Earn ₦3,200 daily for 30 days",
            false,
        ),
        InvestmentPlan::fixed(
            "6",
            "Lamborghini Huracan 2025",
            30_000,
            "Italian supercar - Earn ₦4,800 daily for 30 days",
            false,
        ),
    ]
}

/// 金额过大时返回 `None`
pub fn daily_earning(amount: i64, roi: i64) -> Option<i64> {
    amount.checked_mul(roi).map(|v| v / 100)
}

pub fn total_return(amount: i64, roi: i64, duration: i64) -> Option<i64> {
    daily_earning(amount, roi)?.checked_mul(duration)
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PendingPayment {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub plan_id: String,
    #[serde(default)]
    pub plan_name: String,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentStatus {
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Investment {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    #[serde(default)]
    pub plan_name: String,
    pub amount: i64,
    pub roi: i64,
    pub duration: i64,
    pub daily_earning: i64,
    pub total_return: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: InvestmentStatus,
    #[serde(default)]
    pub days_completed: i64,
    #[serde(default)]
    pub total_earned: i64,
}

impl Investment {
    /// 由已确认的付款生成一笔进行中的投资，收益溢出时返回 `None`
    pub fn from_payment(
        payment: &PendingPayment,
        plan: &InvestmentPlan,
        now: DateTime<Utc>,
    ) -> Option<Self> {
        let daily = daily_earning(payment.amount, plan.roi)?;
        let total = daily.checked_mul(plan.duration)?;
        Some(Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: payment.user_id.clone(),
            plan_id: payment.plan_id.clone(),
            plan_name: payment.plan_name.clone(),
            amount: payment.amount,
            roi: plan.roi,
            duration: plan.duration,
            daily_earning: daily,
            total_return: total,
            start_date: now,
            end_date: now + Duration::days(plan.duration),
            status: InvestmentStatus::Active,
            days_completed: 0,
            total_earned: 0,
        })
    }

    /// 按经过的整天数重算收益，返回记录是否发生变化。
    /// 非 active 状态不处理；时钟回拨时天数按 0 计。
    pub fn accrue(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != InvestmentStatus::Active {
            return false;
        }

        let days_passed = (now - self.start_date).num_days().max(0);
        let (status, days_completed, total_earned) = if days_passed >= self.duration {
            (InvestmentStatus::Completed, self.duration, self.total_return)
        } else {
            (
                InvestmentStatus::Active,
                days_passed,
                days_passed * self.daily_earning,
            )
        };

        let changed = status != self.status
            || days_completed != self.days_completed
            || total_earned != self.total_earned;
        self.status = status;
        self.days_completed = days_completed;
        self.total_earned = total_earned;
        changed
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateInvestmentRequest {
    #[schema(example = "4")]
    pub plan_id: String,
    /// kobo
    #[schema(example = 1000000)]
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateInvestmentResponse {
    pub payment_id: String,
    pub plan: InvestmentPlan,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingPaymentResponse {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub plan_id: String,
    pub plan_name: String,
    pub amount: i64,
    pub timestamp: DateTime<Utc>,
    pub status: PaymentStatus,
}

impl From<PendingPayment> for PendingPaymentResponse {
    fn from(p: PendingPayment) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            user_name: p.user_name,
            plan_id: p.plan_id,
            plan_name: p.plan_name,
            amount: p.amount,
            timestamp: p.timestamp,
            status: p.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvestmentResponse {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub plan_name: String,
    pub amount: i64,
    pub roi: i64,
    pub duration: i64,
    pub daily_earning: i64,
    pub total_return: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: InvestmentStatus,
    pub days_completed: i64,
    pub total_earned: i64,
}

impl From<Investment> for InvestmentResponse {
    fn from(i: Investment) -> Self {
        Self {
            id: i.id,
            user_id: i.user_id,
            plan_id: i.plan_id,
            plan_name: i.plan_name,
            amount: i.amount,
            roi: i.roi,
            duration: i.duration,
            daily_earning: i.daily_earning,
            total_return: i.total_return,
            start_date: i.start_date,
            end_date: i.end_date,
            status: i.status,
            days_completed: i.days_completed,
            total_earned: i.total_earned,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PortfolioSummary {
    pub active_investments: i64,
    pub completed_investments: i64,
    pub total_invested: i64,
    pub accrued_earnings: i64,
    pub expected_return: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlatformStats {
    pub total_users: i64,
    pub pending_payments: i64,
    pub total_invested: i64,
    pub active_investments: i64,
    pub completed_investments: i64,
    pub pending_withdrawals: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccrualResponse {
    pub updated: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payment(amount: i64) -> PendingPayment {
        PendingPayment {
            id: "p1".into(),
            user_id: "u1".into(),
            user_name: "Ada".into(),
            plan_id: "4".into(),
            plan_name: "Plan 4".into(),
            amount,
            timestamp: Utc::now(),
            status: PaymentStatus::Pending,
        }
    }

    fn plan_4() -> InvestmentPlan {
        default_plans().into_iter().find(|p| p.id == "4").unwrap()
    }

    #[test]
    fn test_default_catalog() {
        let plans = default_plans();
        assert_eq!(plans.len(), 6);
        let starter = &plans[0];
        assert_eq!(starter.min_amount, 200_000);
        assert_eq!(starter.total_return, 960_000); // ₦9,600
        assert!(plans.iter().filter(|p| p.popular).count() == 1);
        assert!(plans.iter().all(|p| p.roi == 16 && p.duration == 30));
    }

    #[test]
    fn test_plan_accepts_band() {
        let plan = plan_4();
        assert!(plan.accepts(1_000_000));
        assert!(!plan.accepts(999_999));
        assert!(!plan.accepts(1_000_001));
    }

    #[test]
    fn test_from_payment_computes_returns() {
        let now = Utc::now();
        let investment = Investment::from_payment(&payment(1_000_000), &plan_4(), now).unwrap();
        assert_eq!(investment.daily_earning, 160_000); // ₦1,600
        assert_eq!(investment.total_return, 4_800_000); // ₦48,000
        assert_eq!(investment.status, InvestmentStatus::Active);
        assert_eq!(investment.days_completed, 0);
        assert_eq!(investment.total_earned, 0);
        assert_eq!(investment.end_date - investment.start_date, Duration::days(30));
    }

    #[test]
    fn test_returns_overflow() {
        assert_eq!(daily_earning(1_000_000, 16), Some(160_000));
        assert_eq!(daily_earning(i64::MAX, 16), None);
        assert_eq!(total_return(i64::MAX / 16, 16, 30), None);
        assert!(Investment::from_payment(&payment(i64::MAX), &plan_4(), Utc::now()).is_none());
    }

    #[test]
    fn test_accrue_partial_and_complete() {
        let start = Utc::now();
        let mut investment = Investment::from_payment(&payment(1_000_000), &plan_4(), start).unwrap();

        assert!(investment.accrue(start + Duration::days(10) + Duration::hours(5)));
        assert_eq!(investment.days_completed, 10);
        assert_eq!(investment.total_earned, 1_600_000); // ₦16,000
        assert_eq!(investment.status, InvestmentStatus::Active);

        assert!(investment.accrue(start + Duration::days(45)));
        assert_eq!(investment.status, InvestmentStatus::Completed);
        assert_eq!(investment.days_completed, 30);
        assert_eq!(investment.total_earned, investment.total_return);

        // 完成后不再变化
        assert!(!investment.accrue(start + Duration::days(90)));
        assert_eq!(investment.total_earned, 4_800_000);
    }

    #[test]
    fn test_accrue_is_idempotent() {
        let start = Utc::now();
        let now = start + Duration::days(3);
        let mut investment = Investment::from_payment(&payment(1_000_000), &plan_4(), start).unwrap();
        assert!(investment.accrue(now));
        let snapshot = investment.clone();
        assert!(!investment.accrue(now));
        assert_eq!(investment, snapshot);
    }

    #[test]
    fn test_accrue_ignores_clock_skew() {
        let start = Utc::now();
        let mut investment = Investment::from_payment(&payment(1_000_000), &plan_4(), start).unwrap();
        assert!(!investment.accrue(start - Duration::days(2)));
        assert_eq!(investment.days_completed, 0);
        assert_eq!(investment.total_earned, 0);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&InvestmentStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
