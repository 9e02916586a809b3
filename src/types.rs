/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::input::greater_than_zero;
use chrono::{NaiveDate, NaiveTime};
use clap::Parser;
use entity::*;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "Rota", display_name = "Rota", bin_name = "rota-server", author = "Rota Contributors", version, about, long_about = None)]
pub struct Cli {
    #[arg(long, env = "ROTA_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "ROTA_DATABASE_URL")]
    pub database_url: Option<String>,
    #[arg(long, env = "ROTA_DATABASE_URL_FILE")]
    pub database_url_file: Option<String>,
    #[arg(long, env = "ROTA_DATABASE_MAX_CONNECTIONS", value_parser = greater_than_zero::<u32>, default_value = "100")]
    pub database_max_connections: u32,
    #[arg(long, env = "ROTA_DATABASE_MIN_CONNECTIONS", value_parser = greater_than_zero::<u32>, default_value = "5")]
    pub database_min_connections: u32,
}

/// Injected store handle. Constructed once in `init_state` and passed to
/// every store operation; nothing in the core keeps process-wide state.
#[derive(Debug)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub cli: Cli,
}

/// One weekday row of the weekly opening template. `weekday` counts
/// 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayHours {
    pub weekday: u8,
    pub enabled: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Date-specific override; wins over the weekly template for its date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateOverride {
    pub date: NaiveDate,
    pub closed: bool,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

/// Full availability rules of one resource: either always open, or a weekly
/// template of 7 weekday windows plus a set of date overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityDescriptor {
    pub always_open: bool,
    pub week: Vec<WeekdayHours>,
    pub overrides: Vec<DateOverride>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrganizationDetail {
    pub organization: MOrganization,
    pub children_count: u64,
}

pub type EOrganization = organization::Entity;
pub type EOrganizationUser = organization_user::Entity;
pub type EResource = resource::Entity;
pub type EResourceException = resource_exception::Entity;
pub type EResourceHours = resource_hours::Entity;
pub type EScheduleEntry = schedule_entry::Entity;
pub type EUser = user::Entity;

pub type MOrganization = organization::Model;
pub type MOrganizationUser = organization_user::Model;
pub type MResource = resource::Model;
pub type MResourceException = resource_exception::Model;
pub type MResourceHours = resource_hours::Model;
pub type MScheduleEntry = schedule_entry::Model;
pub type MUser = user::Model;

pub type AOrganization = organization::ActiveModel;
pub type AOrganizationUser = organization_user::ActiveModel;
pub type AResource = resource::ActiveModel;
pub type AResourceException = resource_exception::ActiveModel;
pub type AResourceHours = resource_hours::ActiveModel;
pub type AScheduleEntry = schedule_entry::ActiveModel;
pub type AUser = user::ActiveModel;

pub type COrganization = organization::Column;
pub type COrganizationUser = organization_user::Column;
pub type CResource = resource::Column;
pub type CResourceException = resource_exception::Column;
pub type CResourceHours = resource_hours::Column;
pub type CScheduleEntry = schedule_entry::Column;
pub type CUser = user::Column;

pub type ROrganization = organization::Relation;
pub type ROrganizationUser = organization_user::Relation;
pub type RResource = resource::Relation;
pub type RResourceException = resource_exception::Relation;
pub type RResourceHours = resource_hours::Relation;
pub type RScheduleEntry = schedule_entry::Relation;
pub type RUser = user::Relation;
