/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::NaiveTime;

/// One row per weekday of a resource's weekly opening template.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "resource_hours")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: Uuid,
    pub resource: Uuid,
    /// 0 = Monday .. 6 = Sunday.
    pub weekday: i16,
    pub enabled: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::resource::Entity",
        from = "Column::Resource",
        to = "super::resource::Column::Id"
    )]
    Resource,
}

impl ActiveModelBehavior for ActiveModel {}
