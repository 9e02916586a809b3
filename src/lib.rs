/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod consts;
pub mod database;
pub mod error;
pub mod input;
pub mod organization;
pub mod permission;
pub mod resource;
pub mod schedule;
pub mod types;

use anyhow::Result;
use clap::Parser;
use database::connect_db;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use types::*;

/// Parse configuration, initialise tracing and connect to the store. The
/// returned state is the handle every store operation takes; the request
/// layer owns it for the lifetime of the process.
pub async fn init_state() -> Result<Arc<ServerState>> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Rota core");

    let db = connect_db(&cli).await?;
    Ok(Arc::new(ServerState { db, cli }))
}
