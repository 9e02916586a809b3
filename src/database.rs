/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectOptions, Database, DatabaseConnection, DbErr, EntityTrait, JoinType,
    Order, QueryFilter, QueryOrder, QuerySelect,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::log::LevelFilter;
use uuid::Uuid;

use super::consts::LEGACY_ROLE_ALIASES;
use super::error::CoreResult;
use super::types::*;

pub async fn connect_db(cli: &Cli) -> Result<DatabaseConnection> {
    let db_url = if let Some(file) = &cli.database_url_file {
        std::fs::read_to_string(file)
            .context("Failed to read database url from file")?
            .trim()
            .to_string()
    } else if let Some(url) = &cli.database_url {
        url.clone()
    } else {
        anyhow::bail!("No database url provided")
    };

    let mut opt = ConnectOptions::new(db_url);

    // Only enable SQL logging at debug level
    if cli.log_level == "debug" {
        opt.sqlx_logging(true)
            .sqlx_logging_level(LevelFilter::Debug);
    } else {
        opt.sqlx_logging(false);
    }

    opt.max_connections(cli.database_max_connections)
        .min_connections(cli.database_min_connections)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8));

    let db = Database::connect(opt)
        .await
        .context("Failed to connect to database")?;
    Migrator::up(&db, None)
        .await
        .context("Failed to run database migrations")?;
    update_db(&db).await.context("Failed to update database")?;
    Ok(db)
}

/// One-off data maintenance on startup. Imported data may still carry role
/// spellings from before the rename; rewrite them to the closed enumeration
/// here so no lookup ever has to alias.
async fn update_db(db: &DatabaseConnection) -> Result<(), DbErr> {
    for (legacy, canonical) in LEGACY_ROLE_ALIASES {
        let res = EOrganizationUser::update_many()
            .col_expr(COrganizationUser::Role, Expr::value(canonical))
            .filter(COrganizationUser::Role.eq(legacy))
            .exec(db)
            .await?;

        if res.rows_affected > 0 {
            tracing::info!(
                "Rewrote {} role rows from '{}' to '{}'",
                res.rows_affected,
                legacy,
                canonical
            );
        }
    }

    Ok(())
}

pub async fn get_user(state: Arc<ServerState>, id: Uuid) -> CoreResult<Option<MUser>> {
    Ok(EUser::find_by_id(id).one(&state.db).await?)
}

pub async fn get_organization(
    state: Arc<ServerState>,
    id: Uuid,
) -> CoreResult<Option<MOrganization>> {
    Ok(EOrganization::find_by_id(id).one(&state.db).await?)
}

pub async fn get_resource(state: Arc<ServerState>, id: Uuid) -> CoreResult<Option<MResource>> {
    Ok(EResource::find_by_id(id).one(&state.db).await?)
}

pub async fn get_schedule_entry(
    state: Arc<ServerState>,
    id: Uuid,
) -> CoreResult<Option<MScheduleEntry>> {
    Ok(EScheduleEntry::find_by_id(id).one(&state.db).await?)
}

/// Organizations the user holds any role in, for the request layer's
/// membership listing.
pub async fn get_organizations_for_user(
    state: Arc<ServerState>,
    user_id: Uuid,
) -> CoreResult<Vec<MOrganization>> {
    Ok(EOrganization::find()
        .join_rev(
            JoinType::InnerJoin,
            EOrganizationUser::belongs_to(entity::organization::Entity)
                .from(COrganizationUser::Organization)
                .to(COrganization::Id)
                .into(),
        )
        .filter(COrganizationUser::User.eq(user_id))
        .order_by(COrganization::Name, Order::Asc)
        .all(&state.db)
        .await?)
}
