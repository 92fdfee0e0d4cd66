use crate::error::AppResult;
use crate::models::{FaceVerification, Investment, PendingPayment, User, WithdrawalRequest};
use crate::storage::kv::{KeyValueStore, MemoryStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// 固定的集合键名
pub mod keys {
    pub const USERS: &str = "hyip_users";
    pub const INVESTMENTS: &str = "hyip_investments";
    pub const PENDING_PAYMENTS: &str = "hyip_pending_payments";
    pub const WITHDRAWAL_REQUESTS: &str = "hyip_withdrawal_requests";
    pub const FACE_VERIFICATIONS: &str = "face_verifications";

    pub fn reset_code(phone: &str) -> String {
        format!("reset_{phone}")
    }
}

/// 共享的存储句柄。每个业务操作在整个读-改-写期间持有同一把锁。
#[derive(Clone)]
pub struct Storage {
    inner: Arc<Mutex<Box<dyn KeyValueStore>>>,
}

impl Storage {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(store))),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    pub async fn lock(&self) -> Collections<'_> {
        Collections {
            store: self.inner.lock().await,
        }
    }
}

/// 持锁期间的类型化集合访问
pub struct Collections<'a> {
    store: MutexGuard<'a, Box<dyn KeyValueStore>>,
}

impl Collections<'_> {
    /// 读取整个集合；键不存在或内容损坏时退回空集合
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> AppResult<Vec<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                log::warn!("Collection {key} is malformed, treating as empty: {e}");
                Ok(Vec::new())
            }
        }
    }

    pub fn save<T: Serialize>(&mut self, key: &str, items: &[T]) -> AppResult<()> {
        let raw = serde_json::to_string(items)?;
        self.store.set(key, &raw)
    }

    pub fn get_raw(&self, key: &str) -> AppResult<Option<String>> {
        self.store.get(key)
    }

    pub fn set_raw(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.store.set(key, value)
    }

    pub fn remove(&mut self, key: &str) -> AppResult<()> {
        self.store.remove(key)
    }

    pub fn users(&self) -> AppResult<Vec<User>> {
        self.load(keys::USERS)
    }

    pub fn save_users(&mut self, users: &[User]) -> AppResult<()> {
        self.save(keys::USERS, users)
    }

    pub fn investments(&self) -> AppResult<Vec<Investment>> {
        self.load(keys::INVESTMENTS)
    }

    pub fn save_investments(&mut self, investments: &[Investment]) -> AppResult<()> {
        self.save(keys::INVESTMENTS, investments)
    }

    pub fn pending_payments(&self) -> AppResult<Vec<PendingPayment>> {
        self.load(keys::PENDING_PAYMENTS)
    }

    pub fn save_pending_payments(&mut self, payments: &[PendingPayment]) -> AppResult<()> {
        self.save(keys::PENDING_PAYMENTS, payments)
    }

    pub fn withdrawals(&self) -> AppResult<Vec<WithdrawalRequest>> {
        self.load(keys::WITHDRAWAL_REQUESTS)
    }

    pub fn save_withdrawals(&mut self, withdrawals: &[WithdrawalRequest]) -> AppResult<()> {
        self.save(keys::WITHDRAWAL_REQUESTS, withdrawals)
    }

    pub fn face_verifications(&self) -> AppResult<Vec<FaceVerification>> {
        self.load(keys::FACE_VERIFICATIONS)
    }

    pub fn save_face_verifications(&mut self, records: &[FaceVerification]) -> AppResult<()> {
        self.save(keys::FACE_VERIFICATIONS, records)
    }

    pub fn find_user(&self, user_id: &str) -> AppResult<Option<User>> {
        Ok(self.users()?.into_iter().find(|u| u.id == user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let storage = Storage::in_memory();
        let db = storage.lock().await;
        assert!(db.users().unwrap().is_empty());
        assert!(db.investments().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_collection_falls_back_to_empty() {
        let storage = Storage::in_memory();
        let mut db = storage.lock().await;
        db.set_raw(keys::PENDING_PAYMENTS, "{not json").unwrap();
        assert!(db.pending_payments().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let storage = Storage::in_memory();
        let mut db = storage.lock().await;
        db.save(keys::FACE_VERIFICATIONS, &[FaceVerification {
            user_id: "u1".into(),
            face_image: "img".into(),
            steps: vec!["blink".into()],
            verified: true,
            timestamp: chrono::Utc::now(),
        }])
        .unwrap();
        let records = db.face_verifications().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].steps, vec!["blink".to_string()]);
    }

    #[test]
    fn test_reset_code_key() {
        assert_eq!(keys::reset_code("+2348012345678"), "reset_+2348012345678");
    }
}
