pub mod appointments;
pub mod businesses;
pub mod coupon_usages;
pub mod coupons;
pub mod notifications;
pub mod reviews;
pub mod services;
pub mod users;
pub mod working_hours;

pub use appointments as appointment_entity;
pub use businesses as business_entity;
pub use coupon_usages as coupon_usage_entity;
pub use coupons as coupon_entity;
pub use notifications as notification_entity;
pub use reviews as review_entity;
pub use services as service_entity;
pub use users as user_entity;
pub use working_hours as working_hours_entity;

pub use appointments::AppointmentStatus;
pub use businesses::BusinessType;
pub use coupons::DiscountType;
pub use notifications::NotificationType;
pub use users::UserRole;
pub use working_hours::Weekday;
