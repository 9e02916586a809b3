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
                    .table(Resource::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Resource::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Resource::Organization).uuid().not_null())
                    .col(ColumnDef::new(Resource::Name).string().not_null())
                    .col(ColumnDef::new(Resource::Description).text().not_null())
                    .col(ColumnDef::new(Resource::Color).string_len(7).not_null())
                    .col(ColumnDef::new(Resource::AlwaysOpen).boolean().not_null())
                    .col(ColumnDef::new(Resource::CreatedBy).uuid().not_null())
                    .col(ColumnDef::new(Resource::CreatedAt).date_time().not_null())
                    .col(ColumnDef::new(Resource::UpdatedAt).date_time().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-resource-organization")
                            .from(Resource::Table, Resource::Organization)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-resource-created_by")
                            .from(Resource::Table, Resource::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Resource::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Resource {
    Table,
    Id,
    Organization,
    Name,
    Description,
    Color,
    AlwaysOpen,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organization {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}
