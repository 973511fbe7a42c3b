//! Create case table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Case::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Case::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Case::CaseType).string_len(100).not_null())
                    .col(ColumnDef::new(Case::PlaceSpotted).string_len(255).not_null())
                    .col(ColumnDef::new(Case::Needs).text().not_null())
                    .col(
                        ColumnDef::new(Case::Priority)
                            .string_len(10)
                            .not_null()
                            .default("MEDIUM"),
                    )
                    .col(ColumnDef::new(Case::Image).string_len(255))
                    .col(
                        ColumnDef::new(Case::Status)
                            .string_len(15)
                            .not_null()
                            .default("PENDING"),
                    )
                    .col(ColumnDef::new(Case::ReportedBy).big_integer().not_null())
                    .col(
                        ColumnDef::new(Case::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Case::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(Expr::col(Case::Priority).is_in(["HIGH", "MEDIUM", "LOW"]))
                    .check(Expr::col(Case::Status).is_in([
                        "PENDING",
                        "VALIDATED",
                        "IN_PROGRESS",
                        "RESOLVED",
                        "FORWARDED",
                    ]))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_case_reported_by")
                            .from(Case::Table, Case::ReportedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: created_at (default listing order)
        manager
            .create_index(
                Index::create()
                    .name("idx_case_created_at")
                    .table(Case::Table)
                    .col(Case::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: (status, priority) for the case board filters
        manager
            .create_index(
                Index::create()
                    .name("idx_case_status_priority")
                    .table(Case::Table)
                    .col(Case::Status)
                    .col(Case::Priority)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_case_reported_by")
                    .table(Case::Table)
                    .col(Case::ReportedBy)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Case::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Case {
    Table,
    Id,
    CaseType,
    PlaceSpotted,
    Needs,
    Priority,
    Image,
    Status,
    ReportedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
