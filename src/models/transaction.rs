use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Investment,
    Withdrawal,
    Deposit,
}

/// 交易记录视图：投资、提现与存款按时间合并
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionEntry {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: i64,
    pub date: DateTime<Utc>,
    pub status: String,
    pub description: String,
}
