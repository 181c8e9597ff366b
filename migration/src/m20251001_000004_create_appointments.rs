use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Businesses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Services {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Appointments {
    Table,
    Id,
    UserId,
    BusinessId,
    ServiceId,
    AppointmentDate,
    AppointmentTime,
    Status,
    Notes,
    CancelReason,
    Price,
    DiscountAmount,
    FinalPrice,
    CouponId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("appointment_status"))
                    .values(vec![
                        Alias::new("pending"),
                        Alias::new("confirmed"),
                        Alias::new("completed"),
                        Alias::new("cancelled"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Appointments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Appointments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Appointments::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Appointments::BusinessId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::ServiceId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Appointments::AppointmentDate).date().not_null())
                    .col(
                        ColumnDef::new(Appointments::AppointmentTime)
                            .string_len(5)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::Status)
                            .custom(Alias::new("appointment_status"))
                            .not_null()
                            .default(Expr::cust("'pending'::appointment_status")),
                    )
                    .col(ColumnDef::new(Appointments::Notes).text().null())
                    .col(ColumnDef::new(Appointments::CancelReason).text().null())
                    .col(ColumnDef::new(Appointments::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(Appointments::DiscountAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Appointments::FinalPrice)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Appointments::CouponId).big_integer().null())
                    .col(
                        ColumnDef::new(Appointments::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Appointments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_user")
                            .from(Appointments::Table, Appointments::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_business")
                            .from(Appointments::Table, Appointments::BusinessId)
                            .to(Businesses::Table, Businesses::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointments_service")
                            .from(Appointments::Table, Appointments::ServiceId)
                            .to(Services::Table, Services::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_appointments_user")
                    .table(Appointments::Table)
                    .col(Appointments::UserId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_appointments_business_date")
                    .table(Appointments::Table)
                    .col(Appointments::BusinessId)
                    .col(Appointments::AppointmentDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Appointments::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("appointment_status")).to_owned())
            .await?;
        Ok(())
    }
}
