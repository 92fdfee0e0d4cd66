use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::ledger;
use crate::storage::Storage;
use crate::utils::{PaginatedResponse, PaginationParams};

/// 推荐佣金比例（基点），100 = 1%
pub const REFERRAL_COMMISSION_BPS: i64 = 100;

pub fn commission_for(amount: i64) -> i64 {
    amount * REFERRAL_COMMISSION_BPS / 10_000
}

/// 给被推荐用户的推荐人记佣金，返回 (推荐人ID, 佣金)。
/// 被推荐用户不存在、没有推荐人或推荐人不存在时不做任何修改。
pub(crate) fn credit_commission(
    users: &mut [User],
    referred_user_id: &str,
    investment_amount: i64,
) -> Option<(String, i64)> {
    let referrer_id = users
        .iter()
        .find(|u| u.id == referred_user_id)?
        .referred_by
        .clone()?;
    let referrer = ledger::find_user_mut(users, &referrer_id)?;

    let commission = commission_for(investment_amount);
    ledger::credit_referral(referrer, commission);
    Some((referrer_id, commission))
}

#[derive(Clone)]
pub struct ReferralService {
    storage: Storage,
    public_base_url: String,
}

impl ReferralService {
    pub fn new(storage: Storage, public_base_url: impl Into<String>) -> Self {
        Self {
            storage,
            public_base_url: public_base_url.into(),
        }
    }

    /// 按投资金额的 1% 给推荐人记佣金；没有推荐关系时返回 `None`
    pub async fn process_referral_commission(
        &self,
        referred_user_id: &str,
        investment_amount: i64,
    ) -> AppResult<Option<i64>> {
        let mut db = self.storage.lock().await;
        let mut users = db.users()?;

        match credit_commission(&mut users, referred_user_id, investment_amount) {
            Some((referrer_id, commission)) => {
                db.save_users(&users)?;
                log::info!(
                    "Referral commission of {commission} kobo paid to user {referrer_id} for user {referred_user_id}"
                );
                Ok(Some(commission))
            }
            None => {
                log::debug!("No referrer to credit for user {referred_user_id}");
                Ok(None)
            }
        }
    }

    /// 被当前用户推荐注册的用户列表，按注册时间倒序
    pub async fn list_referrals(
        &self,
        user_id: &str,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<UserResponse>> {
        let db = self.storage.lock().await;
        let mut referrals: Vec<User> = db
            .users()?
            .into_iter()
            .filter(|u| u.referred_by.as_deref() == Some(user_id))
            .collect();
        referrals.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let items = referrals.into_iter().map(UserResponse::from).collect();
        Ok(PaginatedResponse::from_all(items, params))
    }

    pub async fn referral_link(&self, user_id: &str) -> AppResult<ReferralLinkResponse> {
        let db = self.storage.lock().await;
        let user = db
            .find_user(user_id)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(ReferralLinkResponse {
            link: format!(
                "{}/register?ref={}",
                self.public_base_url.trim_end_matches('/'),
                user.referral_code
            ),
            referral_code: user.referral_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ledger::test_support::user;

    async fn seeded(users: Vec<User>) -> ReferralService {
        let storage = Storage::in_memory();
        storage.lock().await.save_users(&users).unwrap();
        ReferralService::new(storage, "https://invest.example/")
    }

    #[test]
    fn test_commission_is_one_percent() {
        assert_eq!(commission_for(1_000_000), 10_000);
        assert_eq!(commission_for(200_000), 2_000);
        assert_eq!(commission_for(0), 0);
    }

    #[tokio::test]
    async fn test_commission_credits_referrer() {
        let service = seeded(vec![user("1", None), user("2", Some("1"))]).await;

        let credited = service
            .process_referral_commission("2", 1_000_000)
            .await
            .unwrap();
        assert_eq!(credited, Some(10_000));

        let db = service.storage.lock().await;
        let referrer = db.find_user("1").unwrap().unwrap();
        assert_eq!(referrer.balance, 110_000);
        assert_eq!(referrer.total_earned, 10_000);
        assert_eq!(referrer.referral_earnings, 10_000);
        // 被推荐人不变
        assert_eq!(db.find_user("2").unwrap().unwrap().balance, 100_000);
    }

    #[tokio::test]
    async fn test_no_commission_without_referrer() {
        let service = seeded(vec![user("1", None), user("2", None)]).await;
        assert_eq!(
            service.process_referral_commission("2", 1_000_000).await.unwrap(),
            None
        );
        assert_eq!(
            service.process_referral_commission("missing", 1_000_000).await.unwrap(),
            None
        );

        let db = service.storage.lock().await;
        assert!(db.users().unwrap().iter().all(|u| u.balance == 100_000));
    }

    #[tokio::test]
    async fn test_dangling_referrer_is_ignored() {
        let service = seeded(vec![user("2", Some("gone"))]).await;
        assert_eq!(
            service.process_referral_commission("2", 500_000).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_list_referrals_and_link() {
        let service = seeded(vec![
            user("1", None),
            user("2", Some("1")),
            user("3", Some("1")),
            user("4", Some("2")),
        ])
        .await;

        let page = service
            .list_referrals("1", &PaginationParams::new(None, None))
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 2);
        assert!(page.items.iter().all(|u| u.referred_by.as_deref() == Some("1")));

        let link = service.referral_link("1").await.unwrap();
        assert_eq!(link.link, "https://invest.example/register?ref=R00001");
    }
}
