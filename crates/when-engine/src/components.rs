//! The certain/implied field model.
//!
//! Every extraction module builds a [`ParsingComponents`] value: a set of
//! temporal fields where each value is either *certain* (written in the text)
//! or *implied* (filled in from context or defaults). The two mutators keep
//! the distinction honest:
//!
//! - [`ParsingComponents::assign`] always writes, and marks the field certain.
//! - [`ParsingComponents::imply`] only writes into an unset field.
//!
//! Once a field is assigned, no later `imply` can change or demote it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::Serialize;

/// A temporal field a component can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Year,
    Month,
    Day,
    /// Index of the weekday relative to the locale's first day of the week.
    Weekday,
    Hour,
    Minute,
    Second,
    Millisecond,
    /// 0 = AM, 1 = PM (see [`Meridiem`]).
    Meridiem,
    /// Minutes east of UTC.
    TimezoneOffset,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Year,
        Field::Month,
        Field::Day,
        Field::Weekday,
        Field::Hour,
        Field::Minute,
        Field::Second,
        Field::Millisecond,
        Field::Meridiem,
        Field::TimezoneOffset,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Year => "year",
            Field::Month => "month",
            Field::Day => "day",
            Field::Weekday => "weekday",
            Field::Hour => "hour",
            Field::Minute => "minute",
            Field::Second => "second",
            Field::Millisecond => "millisecond",
            Field::Meridiem => "meridiem",
            Field::TimezoneOffset => "timezone_offset",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a field value was read from the text or filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Certainty {
    Certain,
    Implied,
}

/// Half of a 12-hour clock day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Meridiem {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Meridiem {
    pub fn value(self) -> i32 {
        match self {
            Meridiem::Am => 0,
            Meridiem::Pm => 1,
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Meridiem::Am),
            1 => Some(Meridiem::Pm),
            _ => None,
        }
    }

    /// The meridiem a 24-hour clock hour falls in.
    pub fn of_hour(hour: u32) -> Self {
        if hour < 12 {
            Meridiem::Am
        } else {
            Meridiem::Pm
        }
    }
}

/// A single field value together with its certainty tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldValue {
    pub value: i32,
    pub certainty: Certainty,
}

/// The working value built by one extraction module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParsingComponents {
    fields: BTreeMap<Field, FieldValue>,
}

impl ParsingComponents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `field` to `value` as certain, replacing whatever was there.
    pub fn assign(&mut self, field: Field, value: i32) -> &mut Self {
        self.fields.insert(
            field,
            FieldValue {
                value,
                certainty: Certainty::Certain,
            },
        );
        self
    }

    /// Set `field` to `value` as implied, but only when the field is unset.
    pub fn imply(&mut self, field: Field, value: i32) -> &mut Self {
        self.fields.entry(field).or_insert(FieldValue {
            value,
            certainty: Certainty::Implied,
        });
        self
    }

    pub fn get(&self, field: Field) -> Option<i32> {
        self.fields.get(&field).map(|v| v.value)
    }

    pub fn is_certain(&self, field: Field) -> bool {
        self.certainty(field) == Some(Certainty::Certain)
    }

    pub fn certainty(&self, field: Field) -> Option<Certainty> {
        self.fields.get(&field).map(|v| v.certainty)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldValue)> + '_ {
        self.fields.iter().map(|(k, v)| (*k, *v))
    }

    pub fn certain_fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields
            .iter()
            .filter(|(_, v)| v.certainty == Certainty::Certain)
            .map(|(k, _)| *k)
    }

    pub fn meridiem(&self) -> Option<Meridiem> {
        self.get(Field::Meridiem).and_then(Meridiem::from_value)
    }

    /// No time-of-day field was read from the text.
    pub fn is_only_date(&self) -> bool {
        !self.is_certain(Field::Hour)
            && !self.is_certain(Field::Minute)
            && !self.is_certain(Field::Second)
    }

    /// No calendar field was read from the text.
    pub fn is_only_time(&self) -> bool {
        !self.is_certain(Field::Weekday)
            && !self.is_certain(Field::Day)
            && !self.is_certain(Field::Month)
            && !self.is_certain(Field::Year)
    }

    /// Only the weekday was read from the text (e.g. a bare "tisdag").
    pub fn is_only_weekday(&self) -> bool {
        self.is_certain(Field::Weekday)
            && !self.is_certain(Field::Day)
            && !self.is_certain(Field::Month)
            && !self.is_certain(Field::Year)
    }

    pub fn has_certain_date(&self) -> bool {
        self.is_certain(Field::Year) || self.is_certain(Field::Month) || self.is_certain(Field::Day)
    }

    /// The calendar date, when year, month and day are all set.
    pub fn date(&self) -> Option<NaiveDate> {
        let year = self.get(Field::Year)?;
        let month = u32::try_from(self.get(Field::Month)?).ok()?;
        let day = u32::try_from(self.get(Field::Day)?).ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    pub fn assign_date(&mut self, date: NaiveDate) -> &mut Self {
        self.assign(Field::Day, date.day() as i32)
            .assign(Field::Month, date.month() as i32)
            .assign(Field::Year, date.year())
    }

    pub fn imply_date(&mut self, date: NaiveDate) -> &mut Self {
        self.imply(Field::Day, date.day() as i32)
            .imply(Field::Month, date.month() as i32)
            .imply(Field::Year, date.year())
    }

    /// Assign the time of day, including the meridiem it falls in.
    pub fn assign_time(&mut self, time: NaiveTime) -> &mut Self {
        self.assign(Field::Hour, time.hour() as i32)
            .assign(Field::Minute, time.minute() as i32)
            .assign(Field::Second, time.second() as i32)
            .assign(Field::Millisecond, millis_of(time))
            .assign(Field::Meridiem, Meridiem::of_hour(time.hour()).value())
    }

    pub fn imply_time(&mut self, time: NaiveTime) -> &mut Self {
        self.imply(Field::Hour, time.hour() as i32)
            .imply(Field::Minute, time.minute() as i32)
            .imply(Field::Second, time.second() as i32)
            .imply(Field::Millisecond, millis_of(time))
    }

    /// Set `field` to an implied `value`, replacing an earlier implied value.
    ///
    /// A certain field is left alone.
    pub fn replace_implied(&mut self, field: Field, value: i32) -> &mut Self {
        if !self.is_certain(field) {
            self.fields.insert(
                field,
                FieldValue {
                    value,
                    certainty: Certainty::Implied,
                },
            );
        }
        self
    }

    /// Imply every certain field of `other` into `self`.
    ///
    /// Certain fields of `self` are left alone; implied ones are replaced.
    pub fn imply_certain_from(&mut self, other: &ParsingComponents) -> &mut Self {
        for field in other.certain_fields() {
            if let Some(value) = other.get(field) {
                self.replace_implied(field, value);
            }
        }
        self
    }

    /// Union of two component sets.
    ///
    /// A certain value from either side beats an implied one; when both sides
    /// carry the same certainty, `self` wins.
    pub fn merge_with(&self, other: &ParsingComponents) -> ParsingComponents {
        let mut fields = self.fields.clone();
        for (field, theirs) in &other.fields {
            match fields.get(field) {
                Some(ours)
                    if ours.certainty == Certainty::Implied
                        && theirs.certainty == Certainty::Certain =>
                {
                    fields.insert(*field, *theirs);
                }
                Some(_) => {}
                None => {
                    fields.insert(*field, *theirs);
                }
            }
        }
        ParsingComponents { fields }
    }

    /// A copy without the implied time-of-day fields.
    pub fn without_implied_time(&self) -> ParsingComponents {
        self.without_implied(is_time_of_day)
    }

    /// A copy without the implied values of the fields `drop` selects.
    pub fn without_implied(&self, drop: impl Fn(Field) -> bool) -> ParsingComponents {
        let fields = self
            .fields
            .iter()
            .filter(|(field, value)| !(value.certainty == Certainty::Implied && drop(**field)))
            .map(|(k, v)| (*k, *v))
            .collect();
        ParsingComponents { fields }
    }
}

impl fmt::Display for ParsingComponents {
    /// `year=2012 month=8 hour~12`: `=` marks certain values, `~` implied ones.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, value) in &self.fields {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            let sep = match value.certainty {
                Certainty::Certain => '=',
                Certainty::Implied => '~',
            };
            write!(f, "{field}{sep}{}", value.value)?;
        }
        Ok(())
    }
}

pub(crate) fn is_time_of_day(field: Field) -> bool {
    matches!(
        field,
        Field::Hour | Field::Minute | Field::Second | Field::Millisecond | Field::Meridiem
    )
}

pub(crate) fn is_date_field(field: Field) -> bool {
    matches!(field, Field::Year | Field::Month | Field::Day | Field::Weekday)
}

fn millis_of(time: NaiveTime) -> i32 {
    (time.nanosecond() / 1_000_000).min(999) as i32
}

/// One recognized expression: where it is, what it says.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsingResult {
    /// Byte offset of the match in the input text.
    pub index: usize,
    /// The matched text.
    pub text: String,
    pub start: ParsingComponents,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<ParsingComponents>,
}

impl ParsingResult {
    pub fn new(index: usize, text: impl Into<String>, start: ParsingComponents) -> Self {
        Self {
            index,
            text: text.into(),
            start,
            end: None,
        }
    }

    pub fn with_end(mut self, end: ParsingComponents) -> Self {
        self.end = Some(end);
        self
    }

    /// Byte offset just past the match.
    pub fn end_index(&self) -> usize {
        self.index + self.text.len()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
