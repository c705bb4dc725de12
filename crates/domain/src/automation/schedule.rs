//! Schedule configuration and a minute-resolution matcher for five-field
//! cron expressions.
//!
//! The matcher supports `*`, lists, ranges and steps in each field.
//! Day-of-month and day-of-week combine the usual cron way: when both are
//! restricted, a timestamp matching either one is due.

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::time::Timestamp;

/// Preset frequencies a schedule trigger can use instead of raw cron.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    /// Raw five-field cron expression in `cron_expression`.
    Custom,
}

impl std::fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Custom => "custom",
        })
    }
}

/// Declarative configuration of a schedule trigger.
///
/// Only the fields relevant to `schedule_type` are consulted; the rest are
/// carried but ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub schedule_type: ScheduleType,
    /// Fire time (`"HH:MM"`, UTC) for daily, weekly and monthly schedules.
    /// Defaults to midnight when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Day of week for weekly schedules, Sunday = 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,
    /// Day of month for monthly schedules, 1 to 31.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
}

impl Schedule {
    /// Lower this configuration to a parsed cron expression.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidSchedule`] when a referenced field
    /// is missing or out of range, or
    /// [`ValidationError::InvalidCronExpression`] when a custom expression
    /// does not parse.
    pub fn to_cron(&self) -> Result<CronSchedule, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidSchedule { reason };

        let expression = match self.schedule_type {
            ScheduleType::Hourly => "0 * * * *".to_string(),
            ScheduleType::Daily => {
                let (hour, minute) = self.fire_time()?;
                format!("{minute} {hour} * * *")
            }
            ScheduleType::Weekly => {
                let (hour, minute) = self.fire_time()?;
                let day = self.day_of_week.unwrap_or(0);
                if day > 6 {
                    return Err(invalid(format!("day of week out of range: {day}")));
                }
                format!("{minute} {hour} * * {day}")
            }
            ScheduleType::Monthly => {
                let (hour, minute) = self.fire_time()?;
                let day = self.day_of_month.unwrap_or(1);
                if !(1..=31).contains(&day) {
                    return Err(invalid(format!("day of month out of range: {day}")));
                }
                format!("{minute} {hour} {day} * *")
            }
            ScheduleType::Custom => self
                .cron_expression
                .clone()
                .ok_or_else(|| invalid("custom schedule without cron expression".to_string()))?,
        };
        CronSchedule::parse(&expression)
    }

    /// Parse the `"HH:MM"` fire time, defaulting to midnight.
    fn fire_time(&self) -> Result<(u8, u8), ValidationError> {
        let Some(time) = self.time.as_deref() else {
            return Ok((0, 0));
        };
        let parsed = time.split_once(':').and_then(|(hour, minute)| {
            let hour: u8 = hour.parse().ok()?;
            let minute: u8 = minute.parse().ok()?;
            (hour < 24 && minute < 60).then_some((hour, minute))
        });
        parsed.ok_or_else(|| ValidationError::InvalidSchedule {
            reason: format!("invalid time of day: {time}"),
        })
    }
}

/// A parsed cron expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronSchedule {
    expression: String,
    minute: CronField,
    hour: CronField,
    day_of_month: CronField,
    month: CronField,
    day_of_week: CronField,
}

impl CronSchedule {
    /// Parse a five-field cron expression.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCronExpression`] when the expression
    /// does not have five fields or a field is out of range.
    pub fn parse(expression: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidCronExpression {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let fields: Vec<&str> = expression.split_whitespace().collect();
        if fields.len() != 5 {
            return Err(invalid("expected 5 fields"));
        }

        Ok(Self {
            expression: expression.to_string(),
            minute: CronField::parse(fields[0], 0, 59).map_err(|r| invalid(&r))?,
            hour: CronField::parse(fields[1], 0, 23).map_err(|r| invalid(&r))?,
            day_of_month: CronField::parse(fields[2], 1, 31).map_err(|r| invalid(&r))?,
            month: CronField::parse(fields[3], 1, 12).map_err(|r| invalid(&r))?,
            day_of_week: CronField::parse(fields[4], 0, 7).map_err(|r| invalid(&r))?,
        })
    }

    /// The original expression text.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Whether this schedule fires at the given instant (UTC, minute
    /// resolution).
    #[must_use]
    pub fn is_due(&self, at: Timestamp) -> bool {
        if !self.minute.matches(at.minute() as u8)
            || !self.hour.matches(at.hour() as u8)
            || !self.month.matches(at.month() as u8)
        {
            return false;
        }
        // Sunday maps to both 0 and 7.
        let weekday = at.weekday().num_days_from_sunday() as u8;
        let dom = self.day_of_month.matches(at.day() as u8);
        let dow = self.day_of_week.matches(weekday)
            || (weekday == 0 && self.day_of_week.matches(7));
        if self.day_of_month.is_wildcard() || self.day_of_week.is_wildcard() {
            dom && dow
        } else {
            dom || dow
        }
    }
}

impl std::fmt::Display for CronSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Allowed values for one cron field, as a bitmask over 0..=63.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
struct CronField {
    mask: u64,
    wildcard: bool,
}

impl CronField {
    fn parse(text: &str, min: u8, max: u8) -> Result<Self, String> {
        let mut mask = 0u64;
        let mut wildcard = true;
        for part in text.split(',') {
            let (range, step) = match part.split_once('/') {
                Some((range, step)) => {
                    let step: u8 = step
                        .parse()
                        .map_err(|_| format!("invalid step in `{part}`"))?;
                    if step == 0 {
                        return Err(format!("zero step in `{part}`"));
                    }
                    (range, step)
                }
                None => (part, 1),
            };
            let (lo, hi) = if range == "*" {
                (min, max)
            } else {
                wildcard = false;
                match range.split_once('-') {
                    Some((lo, hi)) => (
                        lo.parse().map_err(|_| format!("invalid value in `{part}`"))?,
                        hi.parse().map_err(|_| format!("invalid value in `{part}`"))?,
                    ),
                    None => {
                        let value: u8 = range
                            .parse()
                            .map_err(|_| format!("invalid value in `{part}`"))?;
                        (value, value)
                    }
                }
            };
            if lo < min || hi > max || lo > hi {
                return Err(format!("value out of range in `{part}`"));
            }
            // A step over `*` restricts the field too.
            if step > 1 {
                wildcard = false;
            }
            let mut value = u16::from(lo);
            while value <= u16::from(hi) {
                mask |= 1 << value;
                value += u16::from(step);
            }
        }
        Ok(Self { mask, wildcard })
    }

    fn matches(self, value: u8) -> bool {
        value < 64 && self.mask & (1 << value) != 0
    }

    fn is_wildcard(self) -> bool {
        self.wildcard
    }
}
