//! Day-of schedule derivation.
//!
//! Every slot is an offset from the ceremony anchor. Slots are collected
//! unordered from a forward chain (after the ceremony) and a backward chain
//! (before it), sorted once by instant, and only then rendered to clock
//! strings.

use chrono::{NaiveDateTime, TimeDelta};

use super::clock::{ceremony_anchor, render_clock};
use super::item::{GenerationParameters, ScheduleItem};
use crate::error::{Result, TimelineError};

// Durations and buffers, in minutes.
pub const CEREMONY_MINUTES: i64 = 30;
pub const FIRST_LOOK_MINUTES: i64 = 10;
pub const COUPLE_PORTRAITS_MINUTES: i64 = 25;
pub const WEDDING_PARTY_MINUTES: i64 = 20;
pub const MINUTES_PER_FAMILY_GROUP: i64 = 2;
pub const MIN_FAMILY_FORMALS_MINUTES: i64 = 20;
pub const GETTING_READY_BUFFER_MINUTES: i64 = 60;
pub const ARRIVAL_BUFFER_MINUTES: i64 = 60;
/// Gap between the end of wedding party photos and the ceremony.
pub const TUCK_AWAY_MINUTES: i64 = 10;
/// Slack before the ceremony when nothing is shot beforehand.
pub const PRE_CEREMONY_BUFFER_MINUTES: i64 = 15;
pub const FAMILY_GAP_AFTER_FIRST_LOOK_MINUTES: i64 = 5;
pub const FAMILY_GAP_MINUTES: i64 = 10;

pub const ARRIVAL_LABEL: &str = "Photographer arrives & detail photos";
pub const READY_LABEL: &str = "Getting ready wraps up";
pub const FIRST_LOOK_LABEL: &str = "First look";
pub const COUPLE_PORTRAITS_LABEL: &str = "Couple portraits";
pub const WEDDING_PARTY_LABEL: &str = "Wedding party photos";
pub const TUCK_AWAY_LABEL: &str = "Wedding party tucked away before ceremony";
pub const CEREMONY_BEGINS_LABEL: &str = "Ceremony begins";
pub const CEREMONY_ENDS_LABEL: &str = "Ceremony ends";
pub const COCKTAIL_HOUR_LABEL: &str = "Cocktail hour begins";

/// Upper bound on family groupings: two minutes each fills a whole day.
pub const MAX_GROUP_PHOTO_COUNT: i32 = 720;
/// Upper bound on travel between locations: one day.
pub const MAX_TRAVEL_MINUTES: i32 = 24 * 60;

/// A schedule slot before rendering, still carrying its absolute instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedSlot {
    pub at: NaiveDateTime,
    pub label: String,
}

/// Minutes reserved for family formals: two per group, never under twenty.
///
/// Counts are clamped to `0..=MAX_GROUP_PHOTO_COUNT`.
pub fn family_formals_minutes(group_photo_count: i32) -> i64 {
    let groups = i64::from(group_photo_count.clamp(0, MAX_GROUP_PHOTO_COUNT));
    (groups * MINUTES_PER_FAMILY_GROUP).max(MIN_FAMILY_FORMALS_MINUTES)
}

/// Generate the rendered, time-ordered schedule.
pub fn generate(params: &GenerationParameters) -> Result<Vec<ScheduleItem>> {
    Ok(plan_day(params)?
        .into_iter()
        .map(|slot| ScheduleItem::generated(render_clock(slot.at), slot.label))
        .collect())
}

/// Compute the day's slots in absolute time, sorted ascending.
///
/// Slots sharing an instant keep the order they were planned in. Fails with
/// `InvalidArgument` only when the event date sits so close to the end of
/// the calendar that the day's offsets leave it.
pub fn plan_day(params: &GenerationParameters) -> Result<Vec<PlannedSlot>> {
    let inputs = &params.inputs;
    let ceremony = ceremony_anchor(params.event_date, &inputs.ceremony_time);
    let groups = inputs.group_photo_count.clamp(0, MAX_GROUP_PHOTO_COUNT);
    let travel = i64::from(inputs.travel_minutes.clamp(0, MAX_TRAVEL_MINUTES));

    let mut day = Day::default();
    if inputs.first_look {
        day.first_look(ceremony, groups, travel)
    } else {
        day.portraits_after_ceremony(ceremony, groups, travel)
    }
    .map_err(|_| {
        TimelineError::InvalidArgument(format!(
            "event date {} is outside the schedulable range",
            params.event_date
        ))
    })?;

    let mut slots = day.slots;
    slots.sort_by_key(|slot| slot.at);
    Ok(slots)
}

/// Left the representable calendar.
struct OutOfRange;

fn later(at: NaiveDateTime, mins: i64) -> Result<NaiveDateTime, OutOfRange> {
    at.checked_add_signed(TimeDelta::minutes(mins)).ok_or(OutOfRange)
}

fn earlier(at: NaiveDateTime, mins: i64) -> Result<NaiveDateTime, OutOfRange> {
    at.checked_sub_signed(TimeDelta::minutes(mins)).ok_or(OutOfRange)
}

fn family_label(groups: i32) -> String {
    match groups {
        1 => "Family formals (1 group)".to_owned(),
        n => format!("Family formals ({n} groups)"),
    }
}

fn travel_label(travel: i64) -> String {
    format!("Travel to ceremony location ({travel} min)")
}

#[derive(Default)]
struct Day {
    slots: Vec<PlannedSlot>,
}

impl Day {
    fn push(&mut self, at: NaiveDateTime, label: impl Into<String>) {
        self.slots.push(PlannedSlot {
            at,
            label: label.into(),
        });
    }

    /// Portraits front-loaded before the ceremony, family formals and
    /// cocktail hour after it.
    fn first_look(
        &mut self,
        ceremony: NaiveDateTime,
        groups: i32,
        travel: i64,
    ) -> Result<(), OutOfRange> {
        let ceremony_end = later(ceremony, CEREMONY_MINUTES)?;
        let family = later(ceremony_end, FAMILY_GAP_AFTER_FIRST_LOOK_MINUTES)?;
        let cocktail = later(family, family_formals_minutes(groups))?;

        self.push(ceremony, CEREMONY_BEGINS_LABEL);
        self.push(ceremony_end, CEREMONY_ENDS_LABEL);
        self.push(family, family_label(groups));
        self.push(cocktail, COCKTAIL_HOUR_LABEL);

        let wedding_party = earlier(ceremony, WEDDING_PARTY_MINUTES + TUCK_AWAY_MINUTES)?;
        let tucked_away = earlier(ceremony, TUCK_AWAY_MINUTES)?;
        let couple = earlier(wedding_party, COUPLE_PORTRAITS_MINUTES)?;
        let first_look = earlier(couple, FIRST_LOOK_MINUTES)?;

        self.push(wedding_party, WEDDING_PARTY_LABEL);
        self.push(tucked_away, TUCK_AWAY_LABEL);
        self.push(couple, COUPLE_PORTRAITS_LABEL);
        self.push(first_look, FIRST_LOOK_LABEL);

        let ready = if travel > 0 {
            let departure = earlier(first_look, travel)?;
            self.push(departure, travel_label(travel));
            earlier(departure, GETTING_READY_BUFFER_MINUTES)?
        } else {
            earlier(first_look, GETTING_READY_BUFFER_MINUTES)?
        };
        self.push(ready, READY_LABEL);
        self.push(earlier(ready, ARRIVAL_BUFFER_MINUTES)?, ARRIVAL_LABEL);
        Ok(())
    }

    /// Every portrait session after the ceremony; before it only arrival
    /// logistics.
    fn portraits_after_ceremony(
        &mut self,
        ceremony: NaiveDateTime,
        groups: i32,
        travel: i64,
    ) -> Result<(), OutOfRange> {
        let ceremony_end = later(ceremony, CEREMONY_MINUTES)?;
        let family = later(ceremony_end, FAMILY_GAP_MINUTES)?;
        let wedding_party = later(family, family_formals_minutes(groups))?;
        let couple = later(wedding_party, WEDDING_PARTY_MINUTES)?;

        self.push(ceremony, CEREMONY_BEGINS_LABEL);
        self.push(ceremony_end, CEREMONY_ENDS_LABEL);
        self.push(family, family_label(groups));
        self.push(wedding_party, WEDDING_PARTY_LABEL);
        self.push(couple, COUPLE_PORTRAITS_LABEL);

        let ready = if travel > 0 {
            let departure = earlier(ceremony, travel + PRE_CEREMONY_BUFFER_MINUTES)?;
            self.push(departure, travel_label(travel));
            earlier(departure, GETTING_READY_BUFFER_MINUTES)?
        } else {
            earlier(ceremony, GETTING_READY_BUFFER_MINUTES + PRE_CEREMONY_BUFFER_MINUTES)?
        };
        self.push(ready, READY_LABEL);
        self.push(earlier(ready, ARRIVAL_BUFFER_MINUTES)?, ARRIVAL_LABEL);
        Ok(())
    }
}
