use rand::Rng;

const REFERRAL_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 生成6位数字代码（用于密码重置）
pub fn generate_six_digit_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(100000..=999999))
}

/// 生成6位大写字母数字推荐码
pub fn generate_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..6)
        .map(|_| REFERRAL_CHARSET[rng.gen_range(0..REFERRAL_CHARSET.len())] as char)
        .collect()
}

/// 生成不与已有推荐码冲突的推荐码
pub fn generate_unique_referral_code<'a>(existing: impl Iterator<Item = &'a str> + Clone) -> String {
    loop {
        let code = generate_referral_code();
        if !existing.clone().any(|c| c == code) {
            return code;
        }
    }
}
