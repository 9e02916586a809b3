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
                    .table(ResourceHours::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResourceHours::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ResourceHours::Resource).uuid().not_null())
                    .col(
                        ColumnDef::new(ResourceHours::Weekday)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResourceHours::Enabled).boolean().not_null())
                    .col(ColumnDef::new(ResourceHours::StartTime).time().not_null())
                    .col(ColumnDef::new(ResourceHours::EndTime).time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-resource_hours-resource")
                            .from(ResourceHours::Table, ResourceHours::Resource)
                            .to(Resource::Table, Resource::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx-resource_hours-resource-weekday")
                    .table(ResourceHours::Table)
                    .col(ResourceHours::Resource)
                    .col(ResourceHours::Weekday)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResourceHours::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ResourceHours {
    Table,
    Id,
    Resource,
    Weekday,
    Enabled,
    StartTime,
    EndTime,
}

#[derive(DeriveIden)]
enum Resource {
    Table,
    Id,
}
