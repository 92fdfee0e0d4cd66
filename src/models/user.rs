use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::investment::PortfolioSummary;

/// 持久化在 `hyip_users` 集合中的用户记录，金额单位为 kobo
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub phone_number: String,
    pub name: String,
    /// bcrypt 哈希
    pub password: String,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub total_invested: i64,
    #[serde(default)]
    pub total_earned: i64,
    pub referral_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,
    #[serde(default)]
    pub referral_earnings: i64,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub face_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub withdrawal_pin: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    #[schema(example = "8012345678")]
    pub phone_number: String,
    #[schema(example = "secret1")]
    pub password: String,
    #[schema(example = "Ada Obi")]
    pub name: String,
    #[schema(example = "K3XQ9A")]
    pub referral_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "8012345678")]
    pub phone_number: String,
    #[schema(example = "secret1")]
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    #[schema(example = "Ada Obi")]
    pub name: Option<String>,
    pub face_verified: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub phone_number: String,
    pub name: String,
    pub balance: i64,
    pub total_invested: i64,
    pub total_earned: i64,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub referral_earnings: i64,
    pub is_admin: bool,
    pub face_verified: bool,
    pub has_withdrawal_pin: bool,
    pub total_referrals: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user: UserResponse,
    pub portfolio: PortfolioSummary,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendResetCodeRequest {
    #[schema(example = "8012345678")]
    pub phone_number: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResetCodeRequest {
    #[schema(example = "8012345678")]
    pub phone_number: String,
    #[schema(example = "123456")]
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetWithdrawalPinRequest {
    #[schema(example = "1234")]
    pub pin: String,
    #[schema(example = "1234")]
    pub confirm_pin: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyWithdrawalPinRequest {
    #[schema(example = "1234")]
    pub pin: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReferralLinkResponse {
    pub referral_code: String,
    pub link: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            phone_number: user.phone_number,
            name: user.name,
            balance: user.balance,
            total_invested: user.total_invested,
            total_earned: user.total_earned,
            referral_code: user.referral_code,
            referred_by: user.referred_by,
            referral_earnings: user.referral_earnings,
            is_admin: user.is_admin,
            face_verified: user.face_verified,
            has_withdrawal_pin: user.withdrawal_pin.is_some(),
            total_referrals: 0, // 需要单独统计
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_uses_camel_case_and_defaults() {
        let raw = r#"{
            "id": "u1",
            "phoneNumber": "+2348012345678",
            "name": "Ada",
            "password": "hash",
            "referralCode": "ABC123"
        }"#;
        let user: User = serde_json::from_str(raw).unwrap();
        assert_eq!(user.balance, 0);
        assert_eq!(user.referred_by, None);
        assert!(!user.is_admin);

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("phoneNumber").is_some());
        assert!(value.get("referredBy").is_none());
    }

    #[test]
    fn test_user_response_hides_secrets() {
        let user = User {
            id: "u1".into(),
            phone_number: "+2348012345678".into(),
            name: "Ada".into(),
            password: "hash".into(),
            balance: 100_000,
            total_invested: 0,
            total_earned: 0,
            referral_code: "ABC123".into(),
            referred_by: None,
            referral_earnings: 0,
            is_admin: false,
            face_verified: true,
            withdrawal_pin: Some("pinhash".into()),
            created_at: Utc::now(),
        };
        let response = UserResponse::from(user);
        assert!(response.has_withdrawal_pin);
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("password").is_none());
        assert!(value.get("withdrawal_pin").is_none());
    }
}
