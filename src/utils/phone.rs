use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::OnceLock;

fn digits_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+?\d{10,15}$").expect("valid phone regex"))
}

/// 补全国家区号：已带区号的号码原样返回，否则在前面拼接区号
pub fn normalize_phone(phone: &str, country_code: &str) -> String {
    let phone = phone.trim();
    if phone.starts_with(country_code) {
        phone.to_string()
    } else {
        format!("{country_code}{phone}")
    }
}

/// 注册时的最低要求：至少 10 位，只含数字（可带前导 '+'）
pub fn validate_phone(phone: &str) -> AppResult<()> {
    let phone = phone.trim();
    if !digits_regex().is_match(phone) {
        return Err(AppError::ValidationError(
            "Please enter a valid phone number".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("8012345678", "+234"), "+2348012345678");
        assert_eq!(normalize_phone("+2348012345678", "+234"), "+2348012345678");
        assert_eq!(normalize_phone(" 8012345678 ", "+234"), "+2348012345678");
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("8012345678").is_ok());
        assert!(validate_phone("+2348012345678").is_ok());
        assert!(validate_phone("801234567").is_err());
        assert!(validate_phone("80123abc78").is_err());
    }
}
