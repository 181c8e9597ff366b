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
    OwnerId,
    Name,
    BusinessType,
    Description,
    Phone,
    Email,
    Website,
    Address,
    City,
    District,
    Latitude,
    Longitude,
    IsActive,
    AverageRating,
    ReviewCount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum WorkingHours {
    Table,
    Id,
    BusinessId,
    DayOfWeek,
    IsOpen,
    OpenTime,
    CloseTime,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("business_type"))
                    .values(vec![
                        Alias::new("car_wash"),
                        Alias::new("inspection"),
                        Alias::new("parking"),
                        Alias::new("tire_change"),
                        Alias::new("other"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("weekday"))
                    .values(vec![
                        Alias::new("monday"),
                        Alias::new("tuesday"),
                        Alias::new("wednesday"),
                        Alias::new("thursday"),
                        Alias::new("friday"),
                        Alias::new("saturday"),
                        Alias::new("sunday"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Businesses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Businesses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Businesses::OwnerId).big_integer().not_null())
                    .col(ColumnDef::new(Businesses::Name).string_len(150).not_null())
                    .col(
                        ColumnDef::new(Businesses::BusinessType)
                            .custom(Alias::new("business_type"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Businesses::Description).text().null())
                    .col(ColumnDef::new(Businesses::Phone).string_len(20).null())
                    .col(ColumnDef::new(Businesses::Email).string_len(255).null())
                    .col(ColumnDef::new(Businesses::Website).string_len(255).null())
                    .col(ColumnDef::new(Businesses::Address).string_len(500).not_null())
                    .col(ColumnDef::new(Businesses::City).string_len(100).not_null())
                    .col(ColumnDef::new(Businesses::District).string_len(100).null())
                    .col(ColumnDef::new(Businesses::Latitude).double().null())
                    .col(ColumnDef::new(Businesses::Longitude).double().null())
                    .col(
                        ColumnDef::new(Businesses::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Businesses::AverageRating)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(Businesses::ReviewCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Businesses::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Businesses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_businesses_owner")
                            .from(Businesses::Table, Businesses::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_businesses_owner")
                    .table(Businesses::Table)
                    .col(Businesses::OwnerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_businesses_type_city")
                    .table(Businesses::Table)
                    .col(Businesses::BusinessType)
                    .col(Businesses::City)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WorkingHours::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WorkingHours::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WorkingHours::BusinessId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkingHours::DayOfWeek)
                            .custom(Alias::new("weekday"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WorkingHours::IsOpen)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(WorkingHours::OpenTime).string_len(5).null())
                    .col(ColumnDef::new(WorkingHours::CloseTime).string_len(5).null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_working_hours_business")
                            .from(WorkingHours::Table, WorkingHours::BusinessId)
                            .to(Businesses::Table, Businesses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // one row per (business, weekday)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("uq_working_hours_business_day")
                    .table(WorkingHours::Table)
                    .col(WorkingHours::BusinessId)
                    .col(WorkingHours::DayOfWeek)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(WorkingHours::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Businesses::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("weekday")).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("business_type")).to_owned())
            .await?;
        Ok(())
    }
}
