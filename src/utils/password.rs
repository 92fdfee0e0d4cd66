use crate::error::{AppError, AppResult};
use bcrypt::{DEFAULT_COST, hash, verify};

const MAX_PASSWORD_BYTES: usize = 128;

/// 密码至少 6 个字符，最多 128 字节
pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 6 {
        return Err(AppError::ValidationError(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AppError::ValidationError(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    Ok(())
}

/// 提现 PIN：恰好 4 位数字
pub fn validate_withdrawal_pin(pin: &str) -> AppResult<()> {
    if pin.len() != 4 || !pin.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::ValidationError(
            "PIN must be exactly 4 digits".to_string(),
        ));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Failed to verify password: {e}")))
}

/// 在阻塞线程池中计算哈希，调用方不得持有存储锁
pub async fn hash_password_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalError(format!("Password hashing task failed: {e}")))?
}

/// 在阻塞线程池中校验哈希，调用方不得持有存储锁
pub async fn verify_password_blocking(password: String, hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::InternalError(format!("Password verification task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_password("").is_err());

        let too_long = "a".repeat(129);
        match validate_password(&too_long) {
            Err(AppError::ValidationError(msg)) => assert!(msg.contains("at most")),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(validate_password(&"a".repeat(128)).is_ok());
    }

    #[test]
    fn test_validate_withdrawal_pin() {
        assert!(validate_withdrawal_pin("0420").is_ok());
        assert!(validate_withdrawal_pin("123").is_err());
        assert!(validate_withdrawal_pin("12345").is_err());
        assert!(validate_withdrawal_pin("12a4").is_err());
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hashed = hash_password("secret1").unwrap();
        assert!(verify_password("secret1", &hashed).unwrap());
        assert!(!verify_password("secret2", &hashed).unwrap());
    }

    #[tokio::test]
    async fn test_blocking_hash_and_verify() {
        let hashed = hash_password_blocking("secret1".to_string()).await.unwrap();
        assert!(verify_password_blocking("secret1".to_string(), hashed.clone()).await.unwrap());
        assert!(!verify_password_blocking("other1".to_string(), hashed).await.unwrap());
    }
}
