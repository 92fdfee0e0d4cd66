//! 用户账本字段的变更。
//!
//! 这些函数只改内存中的 `User`，调用方负责在同一把存储锁内把整个
//! 用户集合写回，保证多集合更新不会与其它操作交错。

use crate::models::User;

pub fn find_user_mut<'a>(users: &'a mut [User], user_id: &str) -> Option<&'a mut User> {
    users.iter_mut().find(|u| u.id == user_id)
}

/// 确认存款：余额与累计投资同时增加
pub fn credit_deposit(user: &mut User, amount: i64) {
    user.balance += amount;
    user.total_invested += amount;
}

/// 推荐佣金：余额、累计收益、推荐收益同时增加
pub fn credit_referral(user: &mut User, commission: i64) {
    user.balance += commission;
    user.total_earned += commission;
    user.referral_earnings += commission;
}

/// 提现批准时扣款，不检查余额是否充足
pub fn debit_withdrawal(user: &mut User, amount: i64) {
    user.balance -= amount;
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::User;
    use chrono::Utc;

    pub fn user(id: &str, referred_by: Option<&str>) -> User {
        User {
            id: id.to_string(),
            phone_number: format!("+234801{id:0>7}"),
            name: format!("user-{id}"),
            password: String::new(),
            balance: 100_000,
            total_invested: 0,
            total_earned: 0,
            referral_code: format!("R{id:0>5}"),
            referred_by: referred_by.map(str::to_string),
            referral_earnings: 0,
            is_admin: false,
            face_verified: true,
            withdrawal_pin: None,
            created_at: Utc::now(),
        }
    }
}
