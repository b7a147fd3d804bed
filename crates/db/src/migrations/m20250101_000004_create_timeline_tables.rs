//! Create timeline_day and timeline_pin tables migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_pin_tables::Pin;
use super::m20250101_000003_create_board_tables::Board;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TimelineDay::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimelineDay::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TimelineDay::BoardId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(TimelineDay::DayNumber)
                            .integer()
                            .not_null()
                            .check(Expr::col(TimelineDay::DayNumber).gte(1)),
                    )
                    .col(ColumnDef::new(TimelineDay::Title).string_len(128))
                    .col(ColumnDef::new(TimelineDay::Notes).text())
                    .col(ColumnDef::new(TimelineDay::Date).date())
                    .col(
                        ColumnDef::new(TimelineDay::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(TimelineDay::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timeline_day_board")
                            .from(TimelineDay::Table, TimelineDay::BoardId)
                            .to(Board::Table, Board::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (board_id, day_number)
        manager
            .create_index(
                Index::create()
                    .name("idx_timeline_day_board_number")
                    .table(TimelineDay::Table)
                    .col(TimelineDay::BoardId)
                    .col(TimelineDay::DayNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TimelinePin::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TimelinePin::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TimelinePin::DayId).string_len(32).not_null())
                    .col(ColumnDef::new(TimelinePin::PinId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(TimelinePin::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TimelinePin::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timeline_pin_day")
                            .from(TimelinePin::Table, TimelinePin::DayId)
                            .to(TimelineDay::Table, TimelineDay::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_timeline_pin_pin")
                            .from(TimelinePin::Table, TimelinePin::PinId)
                            .to(Pin::Table, Pin::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (day_id, display_order)
        manager
            .create_index(
                Index::create()
                    .name("idx_timeline_pin_day_order")
                    .table(TimelinePin::Table)
                    .col(TimelinePin::DayId)
                    .col(TimelinePin::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        // Unique index: (day_id, pin_id) - a pin is scheduled once per day
        manager
            .create_index(
                Index::create()
                    .name("idx_timeline_pin_day_pin")
                    .table(TimelinePin::Table)
                    .col(TimelinePin::DayId)
                    .col(TimelinePin::PinId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TimelinePin::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TimelineDay::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum TimelineDay {
    Table,
    Id,
    BoardId,
    DayNumber,
    Title,
    Notes,
    Date,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum TimelinePin {
    Table,
    Id,
    DayId,
    PinId,
    DisplayOrder,
    CreatedAt,
}
