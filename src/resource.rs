/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::{Datelike, NaiveDateTime, NaiveTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use super::consts::DEFAULT_RESOURCE_COLOR;
use super::database::{get_organization, get_resource};
use super::error::{CoreError, CoreResult};
use super::input::{check_color, check_display_name};
use super::types::*;

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateResource {
    pub organization: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub availability: AvailabilityDescriptor,
    pub created_by: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct UpdateResource {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

pub async fn create_resource(
    state: Arc<ServerState>,
    input: CreateResource,
) -> CoreResult<MResource> {
    check_display_name(&input.name).map_err(CoreError::Validation)?;

    let color = input
        .color
        .unwrap_or_else(|| DEFAULT_RESOURCE_COLOR.to_string());
    check_color(&color).map_err(CoreError::Validation)?;
    validate_descriptor(&input.availability)?;

    get_organization(Arc::clone(&state), input.organization)
        .await?
        .ok_or_else(|| CoreError::not_found("Organization"))?;

    let id = Uuid::new_v4();
    let now = Utc::now().naive_utc();

    let txn = state.db.begin().await?;

    let resource = AResource {
        id: Set(id),
        organization: Set(input.organization),
        name: Set(input.name),
        description: Set(input.description.unwrap_or_default()),
        color: Set(color),
        always_open: Set(input.availability.always_open),
        created_by: Set(input.created_by),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    insert_availability_rows(&txn, id, &input.availability).await?;

    txn.commit().await?;
    Ok(resource)
}

pub async fn update_resource(
    state: Arc<ServerState>,
    id: Uuid,
    changes: UpdateResource,
) -> CoreResult<MResource> {
    let resource = get_resource(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Resource"))?;

    let mut aresource = resource.into_active_model();

    if let Some(name) = changes.name {
        check_display_name(&name).map_err(CoreError::Validation)?;
        aresource.name = Set(name);
    }

    if let Some(description) = changes.description {
        aresource.description = Set(description);
    }

    if let Some(color) = changes.color {
        check_color(&color).map_err(CoreError::Validation)?;
        aresource.color = Set(color);
    }

    aresource.updated_at = Set(Utc::now().naive_utc());
    Ok(aresource.update(&state.db).await?)
}

/// Deletion is hard-blocked while any schedule entry still references the
/// resource; callers must move or delete those entries first.
pub async fn delete_resource(state: Arc<ServerState>, id: Uuid) -> CoreResult<()> {
    let resource = get_resource(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Resource"))?;

    let references = EScheduleEntry::find()
        .filter(CScheduleEntry::Resource.eq(id))
        .count(&state.db)
        .await?;

    if references > 0 {
        return Err(CoreError::in_use("Resource"));
    }

    resource.into_active_model().delete(&state.db).await?;
    Ok(())
}

pub async fn get_availability(
    state: Arc<ServerState>,
    id: Uuid,
) -> CoreResult<AvailabilityDescriptor> {
    let resource = get_resource(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Resource"))?;

    let hours = EResourceHours::find()
        .filter(CResourceHours::Resource.eq(id))
        .all(&state.db)
        .await?;

    let exceptions = EResourceException::find()
        .filter(CResourceException::Resource.eq(id))
        .all(&state.db)
        .await?;

    Ok(descriptor_from_rows(resource.always_open, hours, exceptions))
}

/// Replace the whole weekly template and override set. Delete-then-insert
/// under one transaction; a validation failure commits nothing.
pub async fn set_availability(
    state: Arc<ServerState>,
    id: Uuid,
    descriptor: AvailabilityDescriptor,
) -> CoreResult<()> {
    validate_descriptor(&descriptor)?;

    let resource = get_resource(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Resource"))?;

    let txn = state.db.begin().await?;

    let mut aresource = resource.into_active_model();
    aresource.always_open = Set(descriptor.always_open);
    aresource.updated_at = Set(Utc::now().naive_utc());
    aresource.update(&txn).await?;

    EResourceHours::delete_many()
        .filter(CResourceHours::Resource.eq(id))
        .exec(&txn)
        .await?;
    EResourceException::delete_many()
        .filter(CResourceException::Resource.eq(id))
        .exec(&txn)
        .await?;

    insert_availability_rows(&txn, id, &descriptor).await?;

    txn.commit().await?;
    Ok(())
}

/// Whether the resource can be booked at `instant`. Always-open resources
/// short-circuit; otherwise a date override wins over the weekday row.
pub async fn is_available(
    state: Arc<ServerState>,
    id: Uuid,
    instant: NaiveDateTime,
) -> CoreResult<bool> {
    let resource = get_resource(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Resource"))?;

    if resource.always_open {
        return Ok(true);
    }

    let exception = EResourceException::find()
        .filter(
            Condition::all()
                .add(CResourceException::Resource.eq(id))
                .add(CResourceException::Date.eq(instant.date())),
        )
        .one(&state.db)
        .await?;

    let hours = if exception.is_none() {
        EResourceHours::find()
            .filter(
                Condition::all()
                    .add(CResourceHours::Resource.eq(id))
                    .add(CResourceHours::Weekday.eq(weekday_index(instant))),
            )
            .one(&state.db)
            .await?
    } else {
        None
    };

    Ok(evaluate_availability(
        &resource,
        exception.as_ref(),
        hours.as_ref(),
        instant,
    ))
}

fn weekday_index(instant: NaiveDateTime) -> i16 {
    instant.weekday().num_days_from_monday() as i16
}

fn in_window(start: NaiveTime, end: NaiveTime, at: NaiveTime) -> bool {
    start <= at && at < end
}

fn evaluate_availability(
    resource: &MResource,
    exception: Option<&MResourceException>,
    hours: Option<&MResourceHours>,
    instant: NaiveDateTime,
) -> bool {
    if resource.always_open {
        return true;
    }

    if let Some(exception) = exception {
        if exception.closed {
            return false;
        }

        return match (exception.start_time, exception.end_time) {
            (Some(start), Some(end)) => in_window(start, end, instant.time()),
            _ => false,
        };
    }

    match hours {
        Some(hours) if hours.enabled => in_window(hours.start_time, hours.end_time, instant.time()),
        _ => false,
    }
}

fn validate_descriptor(descriptor: &AvailabilityDescriptor) -> Result<(), CoreError> {
    if !descriptor.always_open {
        if descriptor.week.len() != 7 {
            return Err(CoreError::Validation(
                "weekly template must have exactly 7 entries".to_string(),
            ));
        }

        let mut seen = [false; 7];
        for entry in &descriptor.week {
            if entry.weekday > 6 {
                return Err(CoreError::Validation(format!(
                    "weekday {} is out of range 0..=6",
                    entry.weekday
                )));
            }

            if seen[entry.weekday as usize] {
                return Err(CoreError::Validation(format!(
                    "duplicate entry for weekday {}",
                    entry.weekday
                )));
            }
            seen[entry.weekday as usize] = true;

            if entry.enabled && entry.start_time >= entry.end_time {
                return Err(CoreError::Validation(format!(
                    "weekday {} window must start before it ends",
                    entry.weekday
                )));
            }
        }
    }

    let mut dates = HashSet::new();
    for exception in &descriptor.overrides {
        if !dates.insert(exception.date) {
            return Err(CoreError::Validation(format!(
                "duplicate override for {}",
                exception.date
            )));
        }

        if !exception.closed {
            match (exception.start_time, exception.end_time) {
                (Some(start), Some(end)) if start < end => {}
                (Some(_), Some(_)) => {
                    return Err(CoreError::Validation(format!(
                        "override for {} must start before it ends",
                        exception.date
                    )));
                }
                _ => {
                    return Err(CoreError::Validation(format!(
                        "override for {} needs either closed or both times",
                        exception.date
                    )));
                }
            }
        }
    }

    Ok(())
}

fn descriptor_from_rows(
    always_open: bool,
    mut hours: Vec<MResourceHours>,
    mut exceptions: Vec<MResourceException>,
) -> AvailabilityDescriptor {
    hours.sort_by_key(|h| h.weekday);
    exceptions.sort_by_key(|e| e.date);

    AvailabilityDescriptor {
        always_open,
        week: hours
            .into_iter()
            .map(|h| WeekdayHours {
                weekday: h.weekday as u8,
                enabled: h.enabled,
                start_time: h.start_time,
                end_time: h.end_time,
            })
            .collect(),
        overrides: exceptions
            .into_iter()
            .map(|e| DateOverride {
                date: e.date,
                closed: e.closed,
                start_time: e.start_time,
                end_time: e.end_time,
            })
            .collect(),
    }
}

async fn insert_availability_rows<C: ConnectionTrait>(
    db: &C,
    resource: Uuid,
    descriptor: &AvailabilityDescriptor,
) -> Result<(), DbErr> {
    if !descriptor.always_open {
        for entry in &descriptor.week {
            AResourceHours {
                id: Set(Uuid::new_v4()),
                resource: Set(resource),
                weekday: Set(entry.weekday as i16),
                enabled: Set(entry.enabled),
                start_time: Set(entry.start_time),
                end_time: Set(entry.end_time),
            }
            .insert(db)
            .await?;
        }
    }

    for exception in &descriptor.overrides {
        AResourceException {
            id: Set(Uuid::new_v4()),
            resource: Set(resource),
            date: Set(exception.date),
            closed: Set(exception.closed),
            start_time: Set(exception.start_time),
            end_time: Set(exception.end_time),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn week() -> Vec<WeekdayHours> {
        (0..7)
            .map(|weekday| WeekdayHours {
                weekday,
                enabled: weekday < 5,
                start_time: t(8, 0),
                end_time: t(17, 0),
            })
            .collect()
    }

    fn template() -> AvailabilityDescriptor {
        AvailabilityDescriptor {
            always_open: false,
            week: week(),
            overrides: Vec::new(),
        }
    }

    fn resource(always_open: bool) -> MResource {
        MResource {
            id: Uuid::new_v4(),
            organization: Uuid::new_v4(),
            name: "Exam room 1".to_string(),
            description: String::new(),
            color: "#4f6df5".to_string(),
            always_open,
            created_by: Uuid::new_v4(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    fn at(date: (i32, u32, u32), h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn descriptor_needs_all_seven_weekdays() {
        let mut descriptor = template();
        descriptor.week.pop();
        assert!(validate_descriptor(&descriptor).is_err());

        let mut descriptor = template();
        descriptor.week[6].weekday = 0;
        assert!(validate_descriptor(&descriptor).is_err());

        assert!(validate_descriptor(&template()).is_ok());
    }

    #[test]
    fn always_open_skips_the_weekly_template_check() {
        let descriptor = AvailabilityDescriptor {
            always_open: true,
            week: Vec::new(),
            overrides: Vec::new(),
        };

        assert!(validate_descriptor(&descriptor).is_ok());
    }

    #[test]
    fn enabled_windows_must_be_ordered() {
        let mut descriptor = template();
        descriptor.week[2].start_time = t(18, 0);
        assert!(validate_descriptor(&descriptor).is_err());

        // a disabled day may carry any times
        let mut descriptor = template();
        descriptor.week[5].start_time = t(18, 0);
        assert!(validate_descriptor(&descriptor).is_ok());
    }

    #[test]
    fn overrides_need_closed_or_a_full_window() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

        let mut descriptor = template();
        descriptor.overrides.push(DateOverride {
            date,
            closed: false,
            start_time: Some(t(9, 0)),
            end_time: None,
        });
        assert!(validate_descriptor(&descriptor).is_err());

        let mut descriptor = template();
        descriptor.overrides.push(DateOverride {
            date,
            closed: true,
            start_time: None,
            end_time: None,
        });
        assert!(validate_descriptor(&descriptor).is_ok());

        let mut descriptor = template();
        descriptor.overrides.push(DateOverride {
            date,
            closed: false,
            start_time: Some(t(10, 0)),
            end_time: Some(t(14, 0)),
        });
        descriptor.overrides.push(DateOverride {
            date,
            closed: true,
            start_time: None,
            end_time: None,
        });
        assert!(validate_descriptor(&descriptor).is_err());
    }

    #[test]
    fn always_open_resources_are_available_any_time() {
        // 2025-03-16 is a Sunday
        assert!(evaluate_availability(
            &resource(true),
            None,
            None,
            at((2025, 3, 16), 3, 30)
        ));
    }

    #[test]
    fn weekday_window_is_half_open() {
        let hours = MResourceHours {
            id: Uuid::new_v4(),
            resource: Uuid::new_v4(),
            weekday: 0,
            enabled: true,
            start_time: t(8, 0),
            end_time: t(17, 0),
        };
        let resource = resource(false);
        // 2025-03-17 is a Monday
        assert!(evaluate_availability(&resource, None, Some(&hours), at((2025, 3, 17), 8, 0)));
        assert!(evaluate_availability(&resource, None, Some(&hours), at((2025, 3, 17), 16, 59)));
        assert!(!evaluate_availability(&resource, None, Some(&hours), at((2025, 3, 17), 17, 0)));
        assert!(!evaluate_availability(&resource, None, Some(&hours), at((2025, 3, 17), 7, 59)));
    }

    #[test]
    fn disabled_weekday_is_closed_all_day() {
        let hours = MResourceHours {
            id: Uuid::new_v4(),
            resource: Uuid::new_v4(),
            weekday: 5,
            enabled: false,
            start_time: t(8, 0),
            end_time: t(17, 0),
        };

        assert!(!evaluate_availability(
            &resource(false),
            None,
            Some(&hours),
            at((2025, 3, 22), 10, 0)
        ));
    }

    #[test]
    fn override_wins_over_the_weekly_template() {
        let resource = resource(false);
        let closed = MResourceException {
            id: Uuid::new_v4(),
            resource: resource.id,
            date: NaiveDate::from_ymd_opt(2025, 3, 17).unwrap(),
            closed: true,
            start_time: None,
            end_time: None,
        };

        assert!(!evaluate_availability(
            &resource,
            Some(&closed),
            None,
            at((2025, 3, 17), 10, 0)
        ));

        let shortened = MResourceException {
            closed: false,
            start_time: Some(t(12, 0)),
            end_time: Some(t(15, 0)),
            ..closed
        };

        assert!(evaluate_availability(
            &resource,
            Some(&shortened),
            None,
            at((2025, 3, 17), 12, 30)
        ));
        assert!(!evaluate_availability(
            &resource,
            Some(&shortened),
            None,
            at((2025, 3, 17), 10, 0)
        ));
    }

    #[test]
    fn rows_round_trip_to_a_semantically_equal_descriptor() {
        let resource_id = Uuid::new_v4();
        let descriptor = AvailabilityDescriptor {
            always_open: false,
            week: week(),
            overrides: vec![
                DateOverride {
                    date: NaiveDate::from_ymd_opt(2025, 4, 18).unwrap(),
                    closed: true,
                    start_time: None,
                    end_time: None,
                },
                DateOverride {
                    date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                    closed: false,
                    start_time: Some(t(10, 0)),
                    end_time: Some(t(13, 0)),
                },
            ],
        };

        // rows arrive from the store in arbitrary order
        let mut hours: Vec<MResourceHours> = descriptor
            .week
            .iter()
            .map(|entry| MResourceHours {
                id: Uuid::new_v4(),
                resource: resource_id,
                weekday: entry.weekday as i16,
                enabled: entry.enabled,
                start_time: entry.start_time,
                end_time: entry.end_time,
            })
            .collect();
        hours.reverse();

        let exceptions: Vec<MResourceException> = descriptor
            .overrides
            .iter()
            .map(|exception| MResourceException {
                id: Uuid::new_v4(),
                resource: resource_id,
                date: exception.date,
                closed: exception.closed,
                start_time: exception.start_time,
                end_time: exception.end_time,
            })
            .collect();

        let rebuilt = descriptor_from_rows(false, hours, exceptions);

        assert_eq!(rebuilt.week, descriptor.week);

        let mut expected_overrides = descriptor.overrides.clone();
        expected_overrides.sort_by_key(|e| e.date);
        assert_eq!(rebuilt.overrides, expected_overrides);
    }
}
