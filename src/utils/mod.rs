pub mod code_generator;
pub mod jwt;
pub mod password;
pub mod phone;
pub mod time;

pub use code_generator::generate_coupon_code;
pub use jwt::*;
pub use password::*;
pub use phone::*;
pub use time::*;
