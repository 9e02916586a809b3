/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter,
};
use std::sync::Arc;
use uuid::Uuid;

pub use entity::organization_user::UserRole;

use super::error::{CoreError, CoreResult};
use super::types::*;

/// Operations the request layer asks the gate about before touching a
/// store. Grouped by the minimum role they demand within the target
/// organization.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Action {
    ViewSchedules,
    EditOwnSchedule,
    ScheduleOthers,
    ManageResources,
    ManageOrganizations,
    ManageRoles,
    LockEntries,
}

impl Action {
    pub fn required_role(&self) -> UserRole {
        match self {
            Action::ViewSchedules | Action::EditOwnSchedule => UserRole::Base,
            Action::ScheduleOthers | Action::ManageResources => UserRole::Scheduler,
            Action::ManageOrganizations | Action::ManageRoles | Action::LockEntries => {
                UserRole::Admin
            }
        }
    }
}

async fn find_assignment(
    state: &Arc<ServerState>,
    user: Uuid,
    organization: Uuid,
) -> CoreResult<Option<MOrganizationUser>> {
    Ok(EOrganizationUser::find()
        .filter(
            Condition::all()
                .add(COrganizationUser::Organization.eq(organization))
                .add(COrganizationUser::User.eq(user)),
        )
        .one(&state.db)
        .await?)
}

/// Upsert: creates the assignment row when absent, otherwise overwrites the
/// role.
pub async fn assign_role(
    state: Arc<ServerState>,
    user: Uuid,
    organization: Uuid,
    role: UserRole,
) -> CoreResult<MOrganizationUser> {
    match find_assignment(&state, user, organization).await? {
        Some(existing) => {
            if existing.role == role {
                return Ok(existing);
            }

            let mut assignment = existing.into_active_model();
            assignment.role = Set(role);
            Ok(assignment.update(&state.db).await?)
        }
        None => {
            let assignment = AOrganizationUser {
                id: Set(Uuid::new_v4()),
                organization: Set(organization),
                user: Set(user),
                role: Set(role),
            };

            Ok(assignment.insert(&state.db).await?)
        }
    }
}

pub async fn unassign_role(
    state: Arc<ServerState>,
    user: Uuid,
    organization: Uuid,
) -> CoreResult<()> {
    let assignment = find_assignment(&state, user, organization)
        .await?
        .ok_or_else(|| CoreError::not_found("Role assignment"))?;

    assignment.into_active_model().delete(&state.db).await?;
    Ok(())
}

/// The user's role in the organization, or `None` when no row exists. No
/// row means no access; the core never substitutes a default role.
pub async fn role_of(
    state: Arc<ServerState>,
    user: Uuid,
    organization: Uuid,
) -> CoreResult<Option<UserRole>> {
    Ok(find_assignment(&state, user, organization)
        .await?
        .map(|assignment| assignment.role))
}

pub async fn has_at_least(
    state: Arc<ServerState>,
    user: Uuid,
    organization: Uuid,
    min: UserRole,
) -> CoreResult<bool> {
    Ok(role_of(state, user, organization)
        .await?
        .map(|role| role >= min)
        .unwrap_or(false))
}

/// Gate a mutation before it reaches a store. `Unauthorized` both for an
/// insufficient role and for no role at all.
pub async fn authorize(
    state: Arc<ServerState>,
    user: Uuid,
    organization: Uuid,
    action: Action,
) -> CoreResult<()> {
    let required = action.required_role();

    if has_at_least(state, user, organization, required).await? {
        Ok(())
    } else {
        Err(CoreError::Unauthorized(format!(
            "{:?} requires at least the {:?} role in this organization",
            action, required
        )))
    }
}
