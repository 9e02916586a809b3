/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScheduleEntry::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ScheduleEntry::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ScheduleEntry::User).uuid().not_null())
                    .col(ColumnDef::new(ScheduleEntry::Resource).uuid().not_null())
                    .col(
                        ColumnDef::new(ScheduleEntry::StartTime)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScheduleEntry::EndTime)
                            .date_time()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScheduleEntry::Notes).text().not_null())
                    .col(
                        ColumnDef::new(ScheduleEntry::Status)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ScheduleEntry::CreatedBy).uuid().not_null())
                    .col(
                        ColumnDef::new(ScheduleEntry::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ScheduleEntry::UpdatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-schedule_entry-user")
                            .from(ScheduleEntry::Table, ScheduleEntry::User)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-schedule_entry-resource")
                            .from(ScheduleEntry::Table, ScheduleEntry::Resource)
                            .to(Resource::Table, Resource::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-schedule_entry-created_by")
                            .from(ScheduleEntry::Table, ScheduleEntry::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-schedule_entry-user-start_time")
                    .table(ScheduleEntry::Table)
                    .col(ScheduleEntry::User)
                    .col(ScheduleEntry::StartTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-schedule_entry-resource")
                    .table(ScheduleEntry::Table)
                    .col(ScheduleEntry::Resource)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduleEntry::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScheduleEntry {
    Table,
    Id,
    User,
    Resource,
    StartTime,
    EndTime,
    Notes,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Resource {
    Table,
    Id,
}
