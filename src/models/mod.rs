pub mod common;
pub mod face_verification;
pub mod investment;
pub mod transaction;
pub mod user;
pub mod withdrawal;

pub use common::*;
pub use face_verification::*;
pub use investment::*;
pub use transaction::*;
pub use user::*;
pub use withdrawal::*;
