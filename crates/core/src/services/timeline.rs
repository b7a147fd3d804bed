//! Timeline days and the pins scheduled on them.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use travelboard_common::{AppError, AppResult, IdGenerator};
use travelboard_db::entities::{pin, timeline_day, timeline_pin};
use travelboard_db::repositories::{BoardPinRepository, TimelineRepository};
use validator::Validate;

use super::permission::{Capability, PermissionService};

/// Maximum day title length.
const MAX_TITLE_LENGTH: usize = 128;
/// Maximum day notes length.
const MAX_NOTES_LENGTH: usize = 2048;

/// Input for creating a timeline day.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDayInput {
    pub board_id: String,
    #[validate(range(min = 1))]
    pub day_number: i32,
    #[validate(length(max = 128))]
    pub title: Option<String>,
    #[validate(length(max = 2048))]
    pub notes: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Input for updating a timeline day.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDayInput {
    pub day_id: String,
    #[validate(range(min = 1))]
    pub day_number: Option<i32>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub date: Option<Option<NaiveDate>>,
}

/// A day assignment with its pin.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPinEntry {
    pub assignment: timeline_pin::Model,
    pub pin: Option<pin::Model>,
}

/// A day with its pins in display order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDayView {
    pub day: timeline_day::Model,
    pub pins: Vec<DayPinEntry>,
}

/// Manages timeline days and per-day pin ordering.
#[derive(Clone)]
pub struct TimelineService {
    timeline_repo: TimelineRepository,
    board_pin_repo: BoardPinRepository,
    permissions: PermissionService,
    id_gen: IdGenerator,
}

impl TimelineService {
    /// Create a new timeline service.
    #[must_use]
    pub const fn new(
        timeline_repo: TimelineRepository,
        board_pin_repo: BoardPinRepository,
        permissions: PermissionService,
    ) -> Self {
        Self {
            timeline_repo,
            board_pin_repo,
            permissions,
            id_gen: IdGenerator::new(),
        }
    }

    /// Days of a board by day number, each with its ordered pins.
    pub async fn list(
        &self,
        board_id: &str,
        viewer_id: Option<&str>,
    ) -> AppResult<Vec<TimelineDayView>> {
        self.permissions.viewable(board_id, viewer_id).await?;

        let days = self.timeline_repo.find_days_by_board(board_id).await?;
        let day_ids: Vec<String> = days.iter().map(|d| d.id.clone()).collect();

        let mut by_day: HashMap<String, Vec<DayPinEntry>> = HashMap::new();
        for (assignment, pin) in self.timeline_repo.find_pins_by_days(&day_ids).await? {
            by_day
                .entry(assignment.day_id.clone())
                .or_default()
                .push(DayPinEntry { assignment, pin });
        }

        Ok(days
            .into_iter()
            .map(|day| {
                let pins = by_day.remove(&day.id).unwrap_or_default();
                TimelineDayView { day, pins }
            })
            .collect())
    }

    /// Create a day. Day numbers are unique per board.
    pub async fn create_day(
        &self,
        user_id: &str,
        input: CreateDayInput,
    ) -> AppResult<timeline_day::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.permissions
            .require(&input.board_id, user_id, Capability::ManageTimelineDays)
            .await?;

        if self
            .timeline_repo
            .day_number_taken(&input.board_id, input.day_number, None)
            .await?
        {
            return Err(AppError::Validation(format!(
                "Day {} already exists on this board",
                input.day_number
            )));
        }

        let model = timeline_day::ActiveModel {
            id: Set(self.id_gen.generate()),
            board_id: Set(input.board_id),
            day_number: Set(input.day_number),
            title: Set(input.title),
            notes: Set(input.notes),
            date: Set(input.date),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        self.timeline_repo.create_day(model).await
    }

    /// Update a day's number, title, notes or date.
    pub async fn update_day(
        &self,
        user_id: &str,
        input: UpdateDayInput,
    ) -> AppResult<timeline_day::Model> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if let Some(Some(ref title)) = input.title
            && title.chars().count() > MAX_TITLE_LENGTH
        {
            return Err(AppError::Validation(format!(
                "Day title must be at most {MAX_TITLE_LENGTH} characters"
            )));
        }
        if let Some(Some(ref notes)) = input.notes
            && notes.chars().count() > MAX_NOTES_LENGTH
        {
            return Err(AppError::Validation(format!(
                "Day notes must be at most {MAX_NOTES_LENGTH} characters"
            )));
        }

        let day = self.timeline_repo.get_day(&input.day_id).await?;
        self.permissions
            .require(&day.board_id, user_id, Capability::ManageTimelineDays)
            .await?;

        if let Some(day_number) = input.day_number
            && day_number != day.day_number
            && self
                .timeline_repo
                .day_number_taken(&day.board_id, day_number, Some(&day.id))
                .await?
        {
            return Err(AppError::Validation(format!(
                "Day {day_number} already exists on this board"
            )));
        }

        let mut active: timeline_day::ActiveModel = day.into();
        if let Some(day_number) = input.day_number {
            active.day_number = Set(day_number);
        }
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        if let Some(date) = input.date {
            active.date = Set(date);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        self.timeline_repo.update_day(active).await
    }

    /// Delete a day and its assignments.
    pub async fn delete_day(&self, user_id: &str, day_id: &str) -> AppResult<()> {
        let day = self.timeline_repo.get_day(day_id).await?;
        self.permissions
            .require(&day.board_id, user_id, Capability::ManageTimelineDays)
            .await?;
        self.timeline_repo.delete_day(day_id).await
    }

    /// Schedule a board pin on a day, at the tail.
    pub async fn assign(
        &self,
        user_id: &str,
        day_id: &str,
        pin_id: &str,
    ) -> AppResult<timeline_pin::Model> {
        let day = self.timeline_repo.get_day(day_id).await?;
        self.permissions
            .require(&day.board_id, user_id, Capability::ManageTimelineContent)
            .await?;

        if self.board_pin_repo.find(&day.board_id, pin_id).await?.is_none() {
            return Err(AppError::Validation(
                "Pin must be on the board before it can be scheduled".to_string(),
            ));
        }

        if self
            .timeline_repo
            .find_assignment(day_id, pin_id)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(
                "Pin is already scheduled on this day".to_string(),
            ));
        }

        self.timeline_repo
            .assign(self.id_gen.generate(), day_id, pin_id)
            .await
    }

    /// Take a pin off a day.
    pub async fn unassign(&self, user_id: &str, day_id: &str, pin_id: &str) -> AppResult<()> {
        let day = self.timeline_repo.get_day(day_id).await?;
        self.permissions
            .require(&day.board_id, user_id, Capability::ManageTimelineContent)
            .await?;

        if !self.timeline_repo.unassign(day_id, pin_id).await? {
            return Err(AppError::NotFound(format!("Pin {pin_id} on day {day_id}")));
        }
        Ok(())
    }

    /// Reorder a day's pins by assignment ID.
    pub async fn reorder(
        &self,
        user_id: &str,
        day_id: &str,
        ordered_ids: &[String],
    ) -> AppResult<u64> {
        let day = self.timeline_repo.get_day(day_id).await?;
        self.permissions
            .require(&day.board_id, user_id, Capability::ManageTimelineContent)
            .await?;

        self.timeline_repo.reorder_day(day_id, ordered_ids).await
    }
}
