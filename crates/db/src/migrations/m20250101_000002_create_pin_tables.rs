//! Create pin, tag and pin_tag tables migration.

use sea_orm_migration::prelude::*;

use super::m20250101_000001_create_user_table::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pin::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Pin::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Pin::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Pin::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Pin::Description).text())
                    .col(ColumnDef::new(Pin::Location).string_len(512))
                    .col(ColumnDef::new(Pin::ImageUrl).string_len(1024))
                    .col(ColumnDef::new(Pin::Link).string_len(2048))
                    .col(
                        ColumnDef::new(Pin::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Pin::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pin_user")
                            .from(Pin::Table, Pin::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for listing a user's pins)
        manager
            .create_index(
                Index::create()
                    .name("idx_pin_user_id")
                    .table(Pin::Table)
                    .col(Pin::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: created_at (newest-first search ordering)
        manager
            .create_index(
                Index::create()
                    .name("idx_pin_created_at")
                    .table(Pin::Table)
                    .col(Pin::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tag::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Tag::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Tag::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: name
        manager
            .create_index(
                Index::create()
                    .name("idx_tag_name")
                    .table(Tag::Table)
                    .col(Tag::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PinTag::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PinTag::PinId).string_len(32).not_null())
                    .col(ColumnDef::new(PinTag::TagId).string_len(32).not_null())
                    .primary_key(Index::create().col(PinTag::PinId).col(PinTag::TagId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pin_tag_pin")
                            .from(PinTag::Table, PinTag::PinId)
                            .to(Pin::Table, Pin::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pin_tag_tag")
                            .from(PinTag::Table, PinTag::TagId)
                            .to(Tag::Table, Tag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: tag_id (popularity counts)
        manager
            .create_index(
                Index::create()
                    .name("idx_pin_tag_tag_id")
                    .table(PinTag::Table)
                    .col(PinTag::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PinTag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tag::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pin::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Pin {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Location,
    ImageUrl,
    Link,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Tag {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum PinTag {
    Table,
    PinId,
    TagId,
}
