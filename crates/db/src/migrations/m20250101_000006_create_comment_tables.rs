//! Create board_comment and comment_reaction tables migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_user_table::User;
use super::m20250101_000003_create_board_tables::Board;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BoardComment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BoardComment::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BoardComment::BoardId).string_len(32).not_null())
                    .col(ColumnDef::new(BoardComment::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(BoardComment::Content).text().not_null())
                    .col(
                        ColumnDef::new(BoardComment::IsPinned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BoardComment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_comment_board")
                            .from(BoardComment::Table, BoardComment::BoardId)
                            .to(Board::Table, Board::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_board_comment_user")
                            .from(BoardComment::Table, BoardComment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (board_id, created_at)
        manager
            .create_index(
                Index::create()
                    .name("idx_board_comment_board_created")
                    .table(BoardComment::Table)
                    .col(BoardComment::BoardId)
                    .col(BoardComment::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CommentReaction::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CommentReaction::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CommentReaction::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(CommentReaction::CommentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CommentReaction::Emoji).string_len(64).not_null())
                    .col(
                        ColumnDef::new(CommentReaction::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_reaction_user")
                            .from(CommentReaction::Table, CommentReaction::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_reaction_comment")
                            .from(CommentReaction::Table, CommentReaction::CommentId)
                            .to(BoardComment::Table, BoardComment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, comment_id, emoji)
        manager
            .create_index(
                Index::create()
                    .name("idx_comment_reaction_user_comment_emoji")
                    .table(CommentReaction::Table)
                    .col(CommentReaction::UserId)
                    .col(CommentReaction::CommentId)
                    .col(CommentReaction::Emoji)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comment_reaction_comment_id")
                    .table(CommentReaction::Table)
                    .col(CommentReaction::CommentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CommentReaction::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BoardComment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BoardComment {
    Table,
    Id,
    BoardId,
    UserId,
    Content,
    IsPinned,
    CreatedAt,
}

#[derive(Iden)]
enum CommentReaction {
    Table,
    Id,
    UserId,
    CommentId,
    Emoji,
    CreatedAt,
}
