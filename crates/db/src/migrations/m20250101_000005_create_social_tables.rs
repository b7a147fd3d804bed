//! Create pin_like, pin_save, follow and pin_report tables migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_user_table::User;
use super::m20250101_000002_create_pin_tables::Pin;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// `(user_id, pin_id)` relation table with a unique pair index.
fn user_pin_table<T: Iden + Copy + 'static>(
    table: T,
    id: T,
    user_id: T,
    pin_id: T,
    created_at: T,
    name: &str,
) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(ColumnDef::new(id).string_len(32).not_null().primary_key())
        .col(ColumnDef::new(user_id).string_len(32).not_null())
        .col(ColumnDef::new(pin_id).string_len(32).not_null())
        .col(
            ColumnDef::new(created_at)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{name}_user"))
                .from(table, user_id)
                .to(User::Table, User::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{name}_pin"))
                .from(table, pin_id)
                .to(Pin::Table, Pin::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(user_pin_table(
                PinLike::Table,
                PinLike::Id,
                PinLike::UserId,
                PinLike::PinId,
                PinLike::CreatedAt,
                "pin_like",
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pin_like_user_pin")
                    .table(PinLike::Table)
                    .col(PinLike::UserId)
                    .col(PinLike::PinId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pin_like_pin_id")
                    .table(PinLike::Table)
                    .col(PinLike::PinId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(user_pin_table(
                PinSave::Table,
                PinSave::Id,
                PinSave::UserId,
                PinSave::PinId,
                PinSave::CreatedAt,
                "pin_save",
            ))
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pin_save_user_pin")
                    .table(PinSave::Table)
                    .col(PinSave::UserId)
                    .col(PinSave::PinId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_pin_save_pin_id")
                    .table(PinSave::Table)
                    .col(PinSave::PinId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                user_pin_table(
                    PinReport::Table,
                    PinReport::Id,
                    PinReport::UserId,
                    PinReport::PinId,
                    PinReport::CreatedAt,
                    "pin_report",
                )
                .col(ColumnDef::new(PinReport::Reason).text())
                .to_owned(),
            )
            .await?;

        // Unique index: (user_id, pin_id) - one report per user per pin
        manager
            .create_index(
                Index::create()
                    .name("idx_pin_report_user_pin")
                    .table(PinReport::Table)
                    .col(PinReport::UserId)
                    .col(PinReport::PinId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Follow::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Follow::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Follow::FollowerId).string_len(32).not_null())
                    .col(ColumnDef::new(Follow::FolloweeId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Follow::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .check(
                        Expr::col(Follow::FollowerId).ne(Expr::col(Follow::FolloweeId)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_follower")
                            .from(Follow::Table, Follow::FollowerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_follow_followee")
                            .from(Follow::Table, Follow::FolloweeId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (follower_id, followee_id)
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_follower_followee")
                    .table(Follow::Table)
                    .col(Follow::FollowerId)
                    .col(Follow::FolloweeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: followee_id (follower counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_follow_followee_id")
                    .table(Follow::Table)
                    .col(Follow::FolloweeId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Follow::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PinReport::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PinSave::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PinLike::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
enum PinLike {
    Table,
    Id,
    UserId,
    PinId,
    CreatedAt,
}

#[derive(Iden, Clone, Copy)]
enum PinSave {
    Table,
    Id,
    UserId,
    PinId,
    CreatedAt,
}

#[derive(Iden, Clone, Copy)]
enum PinReport {
    Table,
    Id,
    UserId,
    PinId,
    Reason,
    CreatedAt,
}

#[derive(Iden)]
enum Follow {
    Table,
    Id,
    FollowerId,
    FolloweeId,
    CreatedAt,
}
