pub mod code_generator;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod phone;

pub use code_generator::{generate_six_digit_code, generate_unique_referral_code};
pub use jwt::*;
pub use pagination::*;
pub use password::*;
pub use phone::*;
