use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    pub amount: i64,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    pub timestamp: DateTime<Utc>,
    pub status: WithdrawalStatus,
}

/// 银行收款信息
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BankDetails {
    #[schema(example = "Access Bank")]
    pub bank_name: String,
    #[schema(example = "0123456789")]
    pub account_number: String,
    #[schema(example = "Ada Obi")]
    pub account_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateWithdrawalRequest {
    /// kobo
    #[schema(example = 150000)]
    pub amount: i64,
    #[schema(example = "Access Bank")]
    pub bank_name: String,
    #[schema(example = "0123456789")]
    pub account_number: String,
    #[schema(example = "Ada Obi")]
    pub account_name: String,
    #[schema(example = "1234")]
    pub pin: String,
}

impl CreateWithdrawalRequest {
    pub fn bank_details(&self) -> BankDetails {
        BankDetails {
            bank_name: self.bank_name.trim().to_string(),
            account_number: self.account_number.trim().to_string(),
            account_name: self.account_name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalResponse {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub amount: i64,
    pub bank_name: String,
    pub account_number: String,
    pub account_name: String,
    pub timestamp: DateTime<Utc>,
    pub status: WithdrawalStatus,
}

impl From<WithdrawalRequest> for WithdrawalResponse {
    fn from(w: WithdrawalRequest) -> Self {
        Self {
            id: w.id,
            user_id: w.user_id,
            user_name: w.user_name,
            amount: w.amount,
            bank_name: w.bank_name,
            account_number: w.account_number,
            account_name: w.account_name,
            timestamp: w.timestamp,
            status: w.status,
        }
    }
}
