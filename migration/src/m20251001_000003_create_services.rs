use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Businesses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Services {
    Table,
    Id,
    BusinessId,
    Name,
    Description,
    Price,
    DurationMinutes,
    BusinessType,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Services::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Services::BusinessId).big_integer().not_null())
                    .col(ColumnDef::new(Services::Name).string_len(150).not_null())
                    .col(ColumnDef::new(Services::Description).text().null())
                    .col(
                        ColumnDef::new(Services::Price)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Services::Price).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Services::DurationMinutes)
                            .integer()
                            .not_null()
                            .check(Expr::col(Services::DurationMinutes).gte(5)),
                    )
                    .col(
                        ColumnDef::new(Services::BusinessType)
                            .custom(Alias::new("business_type"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Services::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Services::CreatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Services::UpdatedAt)
                            .timestamp_with_time_zone()
                            .default(Expr::cust("NOW()"))
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_services_business")
                            .from(Services::Table, Services::BusinessId)
                            .to(Businesses::Table, Businesses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_services_business")
                    .table(Services::Table)
                    .col(Services::BusinessId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Services::Table).to_owned())
            .await?;
        Ok(())
    }
}
