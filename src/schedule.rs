/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{NaiveDateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, Order, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub use entity::schedule_entry::ScheduleStatus;

use super::database::{get_resource, get_schedule_entry, get_user};
use super::error::{CoreError, CoreResult};
use super::types::*;

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateScheduleEntry {
    pub user: Uuid,
    pub resource: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub notes: Option<String>,
    pub status: Option<ScheduleStatus>,
    pub created_by: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct UpdateScheduleEntry {
    pub resource: Option<Uuid>,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub notes: Option<String>,
    pub status: Option<ScheduleStatus>,
}

/// Booking treats both interval ends as inclusive, so an entry ending
/// exactly when another starts still conflicts. Kept bug-compatible with
/// the data this system inherits; the update path below is looser.
fn conflicts_on_create(existing: &MScheduleEntry, start: NaiveDateTime, end: NaiveDateTime) -> bool {
    (existing.start_time <= start && existing.end_time >= start)
        || (existing.start_time <= end && existing.end_time >= end)
        || (start <= existing.start_time && end >= existing.end_time)
}

/// Rescheduling lets an entry butt up against a neighbour: a shared
/// endpoint does not conflict here, unlike on create.
fn conflicts_on_update(existing: &MScheduleEntry, start: NaiveDateTime, end: NaiveDateTime) -> bool {
    (existing.start_time <= start && start < existing.end_time)
        || (existing.start_time < end && end <= existing.end_time)
        || (start <= existing.start_time && end >= existing.end_time)
}

pub async fn create_schedule_entry(
    state: Arc<ServerState>,
    input: CreateScheduleEntry,
) -> CoreResult<MScheduleEntry> {
    if input.start_time >= input.end_time {
        return Err(CoreError::invalid_time_range());
    }

    get_user(Arc::clone(&state), input.user)
        .await?
        .ok_or_else(|| CoreError::not_found("User"))?;
    get_resource(Arc::clone(&state), input.resource)
        .await?
        .ok_or_else(|| CoreError::not_found("Resource"))?;

    let txn = state.db.begin().await?;

    // Lock the user's rows so a concurrent insert cannot slip between the
    // conflict scan and our insert.
    let existing = EScheduleEntry::find()
        .filter(CScheduleEntry::User.eq(input.user))
        .lock_exclusive()
        .all(&txn)
        .await?;

    if let Some(conflict) = existing
        .iter()
        .find(|entry| conflicts_on_create(entry, input.start_time, input.end_time))
    {
        return Err(CoreError::overlap_conflict(conflict.id));
    }

    let now = Utc::now().naive_utc();
    let entry = AScheduleEntry {
        id: Set(Uuid::new_v4()),
        user: Set(input.user),
        resource: Set(input.resource),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        notes: Set(input.notes.unwrap_or_default()),
        status: Set(input.status.unwrap_or(ScheduleStatus::Scheduled)),
        created_by: Set(input.created_by),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(entry)
}

pub async fn update_schedule_entry(
    state: Arc<ServerState>,
    id: Uuid,
    changes: UpdateScheduleEntry,
) -> CoreResult<MScheduleEntry> {
    let entry = get_schedule_entry(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Schedule entry"))?;

    let start_time = changes.start_time.unwrap_or(entry.start_time);
    let end_time = changes.end_time.unwrap_or(entry.end_time);

    if start_time >= end_time {
        return Err(CoreError::invalid_time_range());
    }

    if let Some(resource) = changes.resource {
        if resource != entry.resource {
            get_resource(Arc::clone(&state), resource)
                .await?
                .ok_or_else(|| CoreError::not_found("Resource"))?;
        }
    }

    let bounds_changed = start_time != entry.start_time || end_time != entry.end_time;

    let txn = state.db.begin().await?;

    if bounds_changed {
        let others = EScheduleEntry::find()
            .filter(CScheduleEntry::User.eq(entry.user))
            .filter(CScheduleEntry::Id.ne(id))
            .lock_exclusive()
            .all(&txn)
            .await?;

        if let Some(conflict) = others
            .iter()
            .find(|other| conflicts_on_update(other, start_time, end_time))
        {
            return Err(CoreError::overlap_conflict(conflict.id));
        }
    }

    let mut aentry = entry.into_active_model();
    if let Some(resource) = changes.resource {
        aentry.resource = Set(resource);
    }
    if bounds_changed {
        aentry.start_time = Set(start_time);
        aentry.end_time = Set(end_time);
    }
    if let Some(notes) = changes.notes {
        aentry.notes = Set(notes);
    }
    if let Some(status) = changes.status {
        // status is advisory; any transition is allowed here and gated by
        // role at the request layer
        aentry.status = Set(status);
    }
    aentry.updated_at = Set(Utc::now().naive_utc());

    let entry = aentry.update(&txn).await?;
    txn.commit().await?;
    Ok(entry)
}

pub async fn delete_schedule_entry(state: Arc<ServerState>, id: Uuid) -> CoreResult<()> {
    let entry = get_schedule_entry(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Schedule entry"))?;

    entry.into_active_model().delete(&state.db).await?;
    Ok(())
}

pub async fn list_by_resource(
    state: Arc<ServerState>,
    resource: Uuid,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> CoreResult<Vec<MScheduleEntry>> {
    let mut query = EScheduleEntry::find().filter(CScheduleEntry::Resource.eq(resource));

    if let Some(start) = start {
        query = query.filter(CScheduleEntry::StartTime.gte(start));
    }
    if let Some(end) = end {
        query = query.filter(CScheduleEntry::EndTime.lte(end));
    }

    Ok(query
        .order_by(CScheduleEntry::StartTime, Order::Asc)
        .all(&state.db)
        .await?)
}

pub async fn list_by_user(
    state: Arc<ServerState>,
    user: Uuid,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> CoreResult<Vec<MScheduleEntry>> {
    let mut query = EScheduleEntry::find().filter(CScheduleEntry::User.eq(user));

    if let Some(start) = start {
        query = query.filter(CScheduleEntry::StartTime.gte(start));
    }
    if let Some(end) = end {
        query = query.filter(CScheduleEntry::EndTime.lte(end));
    }

    Ok(query
        .order_by(CScheduleEntry::StartTime, Order::Asc)
        .all(&state.db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn mock_cli() -> Cli {
        Cli {
            log_level: "info".to_string(),
            database_url: Some("mock://test".to_string()),
            database_url_file: None,
            database_max_connections: 10,
            database_min_connections: 1,
        }
    }

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 17)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn entry(start: NaiveDateTime, end: NaiveDateTime) -> MScheduleEntry {
        let user = Uuid::new_v4();
        MScheduleEntry {
            id: Uuid::new_v4(),
            user,
            resource: Uuid::new_v4(),
            start_time: start,
            end_time: end,
            notes: String::new(),
            status: ScheduleStatus::Scheduled,
            created_by: user,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    fn user_row(id: Uuid) -> MUser {
        MUser {
            id,
            username: "lisa".to_string(),
            name: "Lisa Nilsson".to_string(),
            email: "lisa@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    fn resource_row(id: Uuid) -> MResource {
        MResource {
            id,
            organization: Uuid::new_v4(),
            name: "Exam room 1".to_string(),
            description: String::new(),
            color: "#4f6df5".to_string(),
            always_open: true,
            created_by: Uuid::new_v4(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn touching_entries_conflict_on_create() {
        let existing = entry(at(10, 0), at(11, 0));

        assert!(conflicts_on_create(&existing, at(11, 0), at(12, 0)));
        assert!(conflicts_on_create(&existing, at(9, 0), at(10, 0)));
    }

    #[test]
    fn touching_entries_do_not_conflict_on_update() {
        let existing = entry(at(10, 0), at(11, 0));

        assert!(!conflicts_on_update(&existing, at(11, 0), at(12, 0)));
        assert!(!conflicts_on_update(&existing, at(9, 0), at(10, 0)));
    }

    #[test]
    fn real_overlaps_conflict_on_both_paths() {
        let existing = entry(at(10, 0), at(12, 0));

        // partial overlap from either side
        assert!(conflicts_on_create(&existing, at(11, 0), at(13, 0)));
        assert!(conflicts_on_update(&existing, at(11, 0), at(13, 0)));
        assert!(conflicts_on_create(&existing, at(9, 0), at(10, 30)));
        assert!(conflicts_on_update(&existing, at(9, 0), at(10, 30)));

        // candidate fully containing the existing entry
        assert!(conflicts_on_create(&existing, at(9, 0), at(13, 0)));
        assert!(conflicts_on_update(&existing, at(9, 0), at(13, 0)));

        // candidate fully inside the existing entry
        assert!(conflicts_on_create(&existing, at(10, 30), at(11, 30)));
        assert!(conflicts_on_update(&existing, at(10, 30), at(11, 30)));
    }

    #[test]
    fn disjoint_entries_never_conflict() {
        let existing = entry(at(10, 0), at(11, 0));

        assert!(!conflicts_on_create(&existing, at(12, 0), at(13, 0)));
        assert!(!conflicts_on_update(&existing, at(12, 0), at(13, 0)));
        assert!(!conflicts_on_create(&existing, at(8, 0), at(9, 30)));
    }

    #[tokio::test]
    async fn create_rejects_inverted_ranges_before_any_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = Arc::new(ServerState { db, cli: mock_cli() });

        let err = create_schedule_entry(
            state,
            CreateScheduleEntry {
                user: Uuid::new_v4(),
                resource: Uuid::new_v4(),
                start_time: at(11, 0),
                end_time: at(10, 0),
                notes: None,
                status: None,
                created_by: Uuid::new_v4(),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "invalid_time_range");
    }

    #[tokio::test]
    async fn create_rejects_unknown_users() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<MUser>::new()])
            .into_connection();
        let state = Arc::new(ServerState { db, cli: mock_cli() });

        let err = create_schedule_entry(
            state,
            CreateScheduleEntry {
                user: Uuid::new_v4(),
                resource: Uuid::new_v4(),
                start_time: at(10, 0),
                end_time: at(11, 0),
                notes: None,
                status: None,
                created_by: Uuid::new_v4(),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn create_rejects_an_overlapping_entry() {
        let user = Uuid::new_v4();
        let resource = Uuid::new_v4();
        let mut existing = entry(at(10, 0), at(11, 0));
        existing.user = user;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(user)]])
            .append_query_results([vec![resource_row(resource)]])
            .append_query_results([vec![existing]])
            .into_connection();
        let state = Arc::new(ServerState { db, cli: mock_cli() });

        let err = create_schedule_entry(
            state,
            CreateScheduleEntry {
                user,
                resource,
                // touching boundary counts as a conflict on create
                start_time: at(11, 0),
                end_time: at(12, 0),
                notes: None,
                status: None,
                created_by: user,
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "overlap_conflict");
    }

    #[tokio::test]
    async fn create_inserts_when_the_calendar_is_clear() {
        let user = Uuid::new_v4();
        let resource = Uuid::new_v4();

        let mut inserted = entry(at(13, 0), at(14, 0));
        inserted.user = user;
        inserted.resource = resource;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user_row(user)]])
            .append_query_results([vec![resource_row(resource)]])
            .append_query_results([Vec::<MScheduleEntry>::new()])
            .append_query_results([vec![inserted.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let state = Arc::new(ServerState { db, cli: mock_cli() });

        let created = create_schedule_entry(
            state,
            CreateScheduleEntry {
                user,
                resource,
                start_time: at(13, 0),
                end_time: at(14, 0),
                notes: None,
                status: None,
                created_by: user,
            },
        )
        .await
        .unwrap();

        assert_eq!(created.start_time, inserted.start_time);
        assert_eq!(created.status, ScheduleStatus::Scheduled);
    }
}
