/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub use sea_orm_migration::prelude::*;

mod m20250310_100000_create_table_user;
mod m20250310_100100_create_table_organization;
mod m20250310_100200_create_table_organization_user;
mod m20250310_100300_create_table_resource;
mod m20250310_100400_create_table_resource_hours;
mod m20250310_100500_create_table_resource_exception;
mod m20250310_100600_create_table_schedule_entry;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250310_100000_create_table_user::Migration),
            Box::new(m20250310_100100_create_table_organization::Migration),
            Box::new(m20250310_100200_create_table_organization_user::Migration),
            Box::new(m20250310_100300_create_table_resource::Migration),
            Box::new(m20250310_100400_create_table_resource_hours::Migration),
            Box::new(m20250310_100500_create_table_resource_exception::Migration),
            Box::new(m20250310_100600_create_table_schedule_entry::Migration),
        ]
    }
}
