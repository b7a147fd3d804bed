//! Create board, board_member and board_pin tables migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_user_table::User;
use super::m20250101_000002_create_pin_tables::Pin;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Board::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Board::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Board::OwnerId).string_len(32).not_null())
                    .col(ColumnDef::new(Board::Name).string_len(128).not_null())
                    .col(ColumnDef::new(Board::Description).text())
                    .col(ColumnDef::new(Board::Category).string_len(64))
                    .col(ColumnDef::new(Board::CoverImageUrl).string_len(1024))
                    .col(
                        ColumnDef::new(Board::Visibility)
                            .string_len(16)
                            .not_null()
                            .default("PRIVATE"),
                    )
                    .col(
                        ColumnDef::new(Board::Layout)
                            .string_len(16)
                            .not_null()
                            .default("MASONRY"),
                    )
                    .col(
                        ColumnDef::new(Board::IsArchived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Board::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Board::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_owner")
                            .from(Board::Table, Board::OwnerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: owner_id
        manager
            .create_index(
                Index::create()
                    .name("idx_board_owner_id")
                    .table(Board::Table)
                    .col(Board::OwnerId)
                    .to_owned(),
            )
            .await?;

        // Index: (visibility, is_archived) for public board search
        manager
            .create_index(
                Index::create()
                    .name("idx_board_visibility_archived")
                    .table(Board::Table)
                    .col(Board::Visibility)
                    .col(Board::IsArchived)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BoardMember::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BoardMember::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BoardMember::BoardId).string_len(32).not_null())
                    .col(ColumnDef::new(BoardMember::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(BoardMember::Role).string_len(16).not_null())
                    .col(ColumnDef::new(BoardMember::InvitedBy).string_len(32))
                    .col(
                        ColumnDef::new(BoardMember::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(BoardMember::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_member_board")
                            .from(BoardMember::Table, BoardMember::BoardId)
                            .to(Board::Table, Board::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_member_user")
                            .from(BoardMember::Table, BoardMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (board_id, user_id) - one membership per user per board
        manager
            .create_index(
                Index::create()
                    .name("idx_board_member_board_user")
                    .table(BoardMember::Table)
                    .col(BoardMember::BoardId)
                    .col(BoardMember::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: user_id
        manager
            .create_index(
                Index::create()
                    .name("idx_board_member_user_id")
                    .table(BoardMember::Table)
                    .col(BoardMember::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BoardPin::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BoardPin::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(BoardPin::BoardId).string_len(32).not_null())
                    .col(ColumnDef::new(BoardPin::PinId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(BoardPin::DisplayOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(BoardPin::BoardNotes).text())
                    .col(ColumnDef::new(BoardPin::Relevance).string_len(32))
                    .col(ColumnDef::new(BoardPin::AddedBy).string_len(32).not_null())
                    .col(
                        ColumnDef::new(BoardPin::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_pin_board")
                            .from(BoardPin::Table, BoardPin::BoardId)
                            .to(Board::Table, Board::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_pin_pin")
                            .from(BoardPin::Table, BoardPin::PinId)
                            .to(Pin::Table, Pin::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (board_id, pin_id) - a pin appears once per board
        manager
            .create_index(
                Index::create()
                    .name("idx_board_pin_board_pin")
                    .table(BoardPin::Table)
                    .col(BoardPin::BoardId)
                    .col(BoardPin::PinId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (board_id, display_order) for ordered listing
        manager
            .create_index(
                Index::create()
                    .name("idx_board_pin_board_order")
                    .table(BoardPin::Table)
                    .col(BoardPin::BoardId)
                    .col(BoardPin::DisplayOrder)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BoardPin::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BoardMember::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Board::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Board {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    Category,
    CoverImageUrl,
    Visibility,
    Layout,
    IsArchived,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BoardMember {
    Table,
    Id,
    BoardId,
    UserId,
    Role,
    InvitedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BoardPin {
    Table,
    Id,
    BoardId,
    PinId,
    DisplayOrder,
    BoardNotes,
    Relevance,
    AddedBy,
    CreatedAt,
}
