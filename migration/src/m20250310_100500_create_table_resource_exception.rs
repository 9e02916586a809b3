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
                    .table(ResourceException::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ResourceException::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ResourceException::Resource)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResourceException::Date).date().not_null())
                    .col(
                        ColumnDef::new(ResourceException::Closed)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ResourceException::StartTime).time())
                    .col(ColumnDef::new(ResourceException::EndTime).time())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-resource_exception-resource")
                            .from(ResourceException::Table, ResourceException::Resource)
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
                    .name("idx-resource_exception-resource-date")
                    .table(ResourceException::Table)
                    .col(ResourceException::Resource)
                    .col(ResourceException::Date)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ResourceException::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ResourceException {
    Table,
    Id,
    Resource,
    Date,
    Closed,
    StartTime,
    EndTime,
}

#[derive(DeriveIden)]
enum Resource {
    Table,
    Id,
}
