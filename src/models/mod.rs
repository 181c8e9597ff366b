pub mod admin;
pub mod appointment;
pub mod business;
pub mod common;
pub mod coupon;
pub mod notification;
pub mod pagination;
pub mod review;
pub mod service;
pub mod user;

pub use admin::*;
pub use appointment::*;
pub use business::*;
pub use common::*;
pub use coupon::*;
pub use notification::*;
pub use pagination::*;
pub use review::*;
pub use service::*;
pub use user::*;
