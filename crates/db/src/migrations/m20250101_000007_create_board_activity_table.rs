//! Create board_activity table migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000003_create_board_tables::Board;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BoardActivity::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BoardActivity::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BoardActivity::BoardId).string_len(32).not_null())
                    .col(ColumnDef::new(BoardActivity::ActorId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(BoardActivity::ActivityType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BoardActivity::Metadata)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'{}'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(BoardActivity::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_activity_board")
                            .from(BoardActivity::Table, BoardActivity::BoardId)
                            .to(Board::Table, Board::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (board_id, created_at) for newest-first listing
        manager
            .create_index(
                Index::create()
                    .name("idx_board_activity_board_created")
                    .table(BoardActivity::Table)
                    .col(BoardActivity::BoardId)
                    .col(BoardActivity::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BoardActivity::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BoardActivity {
    Table,
    Id,
    BoardId,
    ActorId,
    ActivityType,
    Metadata,
    CreatedAt,
}
