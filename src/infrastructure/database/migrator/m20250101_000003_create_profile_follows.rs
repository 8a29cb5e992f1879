//! Create profile_follows table migration

use sea_orm_migration::prelude::*;

use super::m20250101_000002_create_profiles::Profiles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProfileFollows::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProfileFollows::FollowerId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProfileFollows::FollowedId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProfileFollows::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ProfileFollows::FollowerId)
                            .col(ProfileFollows::FollowedId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_follows_follower")
                            .from(ProfileFollows::Table, ProfileFollows::FollowerId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_profile_follows_followed")
                            .from(ProfileFollows::Table, ProfileFollows::FollowedId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Reverse lookups (followers of a profile) scan by followed_id
        manager
            .create_index(
                Index::create()
                    .name("idx_profile_follows_followed_id")
                    .table(ProfileFollows::Table)
                    .col(ProfileFollows::FollowedId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProfileFollows::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ProfileFollows {
    Table,
    FollowerId,
    FollowedId,
    CreatedAt,
}
