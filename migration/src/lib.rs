pub use sea_orm_migration::prelude::*;

mod m20251001_000001_create_users;
mod m20251001_000002_create_businesses;
mod m20251001_000003_create_services;
mod m20251001_000004_create_appointments;
mod m20251001_000005_create_reviews;
mod m20251001_000006_create_coupons;
mod m20251001_000007_create_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_users::Migration),
            Box::new(m20251001_000002_create_businesses::Migration),
            Box::new(m20251001_000003_create_services::Migration),
            Box::new(m20251001_000004_create_appointments::Migration),
            Box::new(m20251001_000005_create_reviews::Migration),
            Box::new(m20251001_000006_create_coupons::Migration),
            Box::new(m20251001_000007_create_notifications::Migration),
        ]
    }
}
