/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod tests;

pub mod organization;
pub mod organization_user;
pub mod resource;
pub mod resource_exception;
pub mod resource_hours;
pub mod schedule_entry;
pub mod user;
