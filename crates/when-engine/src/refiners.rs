//! Post-processing passes over the sorted result list.
//!
//! Each refiner walks the list once, looking only at immediate neighbours.
//! A merged pair becomes the current entry for the next comparison, but the
//! pass is never repeated.

use chrono::{Datelike, NaiveDateTime};
use regex::Regex;

use crate::calendar::add_days;
use crate::components::{Field, ParsingComponents, ParsingResult};
use crate::error::WhenError;
use crate::pattern::compile;
use crate::reference::ReferenceInstant;

/// What a refiner may look at besides the results themselves.
#[derive(Debug, Clone, Copy)]
pub struct RefinerContext<'a> {
    pub text: &'a str,
    pub reference: &'a ReferenceInstant,
}

#[derive(Debug, Clone)]
pub enum Refiner {
    /// Among overlapping neighbours keep the longer match (the earlier on a tie).
    OverlapRemoval,
    /// Fuse "A {connector} B" into one result with `end = B.start`.
    MergeDateRange { connector: Regex },
    /// Fuse a date-only and a time-only neighbour.
    MergeDateTime { connector: Regex },
}

impl Refiner {
    /// `connector` must match the whole text between the two results.
    pub fn merge_date_range(connector: &str) -> Result<Self, WhenError> {
        Ok(Refiner::MergeDateRange {
            connector: compile("date range connector", connector)?,
        })
    }

    pub fn merge_date_time(connector: &str) -> Result<Self, WhenError> {
        Ok(Refiner::MergeDateTime {
            connector: compile("date time connector", connector)?,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Refiner::OverlapRemoval => "overlap_removal",
            Refiner::MergeDateRange { .. } => "merge_date_range",
            Refiner::MergeDateTime { .. } => "merge_date_time",
        }
    }

    pub fn apply(&self, context: &RefinerContext<'_>, results: Vec<ParsingResult>) -> Vec<ParsingResult> {
        match self {
            Refiner::OverlapRemoval => remove_overlaps(results),
            Refiner::MergeDateRange { connector } => merge_neighbours(context, results, |between, left, right| {
                (left.end.is_none() && right.end.is_none() && connector.is_match(between))
                    .then(|| merge_range(context.text, left, right))
            }),
            Refiner::MergeDateTime { connector } => merge_neighbours(context, results, |between, left, right| {
                let pair = (left.start.is_only_date() && right.start.is_only_time())
                    || (right.start.is_only_date() && left.start.is_only_time());
                (pair && connector.is_match(between)).then(|| merge_date_time(context.text, left, right))
            }),
        }
    }
}

fn remove_overlaps(results: Vec<ParsingResult>) -> Vec<ParsingResult> {
    let mut kept: Vec<ParsingResult> = Vec::with_capacity(results.len());
    for result in results {
        let Some(previous) = kept.last_mut() else {
            kept.push(result);
            continue;
        };
        if result.index >= previous.end_index() {
            kept.push(result);
            continue;
        }
        if result.text.chars().count() > previous.text.chars().count() {
            tracing::debug!(removed = %previous.text, kept = %result.text, "overlapping result removed");
            *previous = result;
        } else {
            tracing::debug!(removed = %result.text, kept = %previous.text, "overlapping result removed");
        }
    }
    kept
}

/// Single pass over neighbours; `merge` sees the text between the two.
fn merge_neighbours(
    context: &RefinerContext<'_>,
    results: Vec<ParsingResult>,
    merge: impl Fn(&str, &ParsingResult, &ParsingResult) -> Option<ParsingResult>,
) -> Vec<ParsingResult> {
    let mut merged: Vec<ParsingResult> = Vec::with_capacity(results.len());
    let mut results = results.into_iter();
    let Some(mut current) = results.next() else {
        return merged;
    };

    for next in results {
        let fused = context
            .text
            .get(current.end_index()..next.index)
            .and_then(|between| merge(between, &current, &next));
        match fused {
            Some(fused) => {
                tracing::debug!(left = %current.text, right = %next.text, merged = %fused.text, "results merged");
                current = fused;
            }
            None => merged.push(std::mem::replace(&mut current, next)),
        }
    }
    merged.push(current);
    merged
}

/// Imply each side's certain fields into the other.
///
/// Skipped when either side is only a weekday.
pub(crate) fn backfill_range(start: &mut ParsingComponents, end: &mut ParsingComponents) {
    if start.is_only_weekday() || end.is_only_weekday() {
        return;
    }
    start.imply_certain_from(end);
    end.imply_certain_from(start);
}

fn merge_range(text: &str, left: &ParsingResult, right: &ParsingResult) -> ParsingResult {
    let mut start = left.start.clone();
    let mut end = right.start.clone();
    backfill_range(&mut start, &mut end);
    let span = &text[left.index..right.end_index()];
    ParsingResult::new(left.index, span, start).with_end(end)
}

fn merge_date_time(text: &str, left: &ParsingResult, right: &ParsingResult) -> ParsingResult {
    let (date, time) = if left.start.is_only_date() {
        (left, right)
    } else {
        (right, left)
    };

    let start = date.start.merge_with(&time.start);
    let end = if date.end.is_some() || time.end.is_some() {
        let end_date = date.end.as_ref().unwrap_or(&date.start);
        let end_time = time.end.as_ref().unwrap_or(&time.start);
        let mut end = end_date.merge_with(end_time);
        // "21:00 - 01:00" on one date ends the day after.
        if date.end.is_none() && earlier(&end, &start) {
            roll_to_next_day(&mut end);
        }
        Some(end)
    } else {
        None
    };

    let span = &text[left.index..right.end_index()];
    let result = ParsingResult::new(left.index, span, start);
    match end {
        Some(end) => result.with_end(end),
        None => result,
    }
}

fn local_datetime(components: &ParsingComponents) -> Option<NaiveDateTime> {
    let hour = components.get(Field::Hour).unwrap_or(12);
    let minute = components.get(Field::Minute).unwrap_or(0);
    let second = components.get(Field::Second).unwrap_or(0);
    components
        .date()?
        .and_hms_opt(u32::try_from(hour).ok()?, u32::try_from(minute).ok()?, u32::try_from(second).ok()?)
}

fn earlier(a: &ParsingComponents, b: &ParsingComponents) -> bool {
    matches!((local_datetime(a), local_datetime(b)), (Some(a), Some(b)) if a < b)
}

/// Advance the date by one day, keeping each field's certainty.
fn roll_to_next_day(components: &mut ParsingComponents) {
    let Some(next) = components.date().and_then(|date| add_days(date, 1)) else {
        return;
    };
    let values = [
        (Field::Day, next.day() as i32),
        (Field::Month, next.month() as i32),
        (Field::Year, next.year()),
    ];
    for (field, value) in values {
        if components.is_certain(field) {
            components.assign(field, value);
        } else {
            components.replace_implied(field, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn anchor() -> ReferenceInstant {
        ReferenceInstant::utc(Utc.with_ymd_and_hms(2012, 8, 10, 12, 0, 0).unwrap())
    }

    fn range_refiner() -> Refiner {
        Refiner::merge_date_range(r"^\s*(till(?:\s*(?:kl|klockan))?|-)\s*$").unwrap()
    }

    fn date_time_refiner() -> Refiner {
        Refiner::merge_date_time(r"^\s*(T|em|fm|,|-)?\s*$").unwrap()
    }

    fn date_result(text: &str, needle: &str, y: i32, m: i32, d: i32) -> ParsingResult {
        let mut c = ParsingComponents::new();
        c.assign(Field::Year, y).assign(Field::Month, m).assign(Field::Day, d);
        ParsingResult::new(text.find(needle).unwrap(), needle, c)
    }

    fn time_result(text: &str, needle: &str, hour: i32, minute: i32) -> ParsingResult {
        let mut c = ParsingComponents::new();
        c.assign(Field::Hour, hour).assign(Field::Minute, minute);
        ParsingResult::new(text.find(needle).unwrap(), needle, c)
    }

    #[test]
    fn test_date_time_fusion_across_comma() {
        let text = "10 augusti 2012, 14:30:15";
        let context = RefinerContext { text, reference: &anchor() };
        let mut time = time_result(text, "14:30:15", 14, 30);
        time.start.assign(Field::Second, 15);
        let results = vec![date_result(text, "10 augusti 2012", 2012, 8, 10), time];
        let merged = date_time_refiner().apply(&context, results);
        assert_eq!(merged.len(), 1);
        let result = &merged[0];
        assert_eq!(result.index, 0);
        assert_eq!(result.text, text);
        for (field, value) in [
            (Field::Year, 2012),
            (Field::Month, 8),
            (Field::Day, 10),
            (Field::Hour, 14),
            (Field::Minute, 30),
            (Field::Second, 15),
        ] {
            assert_eq!(result.start.get(field), Some(value), "{field}");
            assert!(result.start.is_certain(field), "{field}");
        }
    }

    #[test]
    fn test_time_before_date_also_fuses() {
        let text = "14:30 10 augusti 2012";
        let context = RefinerContext { text, reference: &anchor() };
        let results = vec![
            time_result(text, "14:30", 14, 30),
            date_result(text, "10 augusti 2012", 2012, 8, 10),
        ];
        let merged = date_time_refiner().apply(&context, results);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].start.get(Field::Day), Some(10));
        assert_eq!(merged[0].start.get(Field::Hour), Some(14));
    }

    #[test]
    fn test_no_false_merge() {
        let text = "10 augusti 2012 och sedan 14:30";
        let context = RefinerContext { text, reference: &anchor() };
        let results = vec![
            date_result(text, "10 augusti 2012", 2012, 8, 10),
            time_result(text, "14:30", 14, 30),
        ];
        let after_range = range_refiner().apply(&context, results);
        let after_both = date_time_refiner().apply(&context, after_range);
        assert_eq!(after_both.len(), 2);
        assert!(after_both.iter().all(|r| r.end.is_none()));
    }

    #[test]
    fn test_range_merge_backfills_both_sides() {
        let text = "10 augusti till 22 september 2013";
        let context = RefinerContext { text, reference: &anchor() };
        let mut left = ParsingComponents::new();
        left.assign(Field::Month, 8).assign(Field::Day, 10).imply(Field::Year, 2012);
        let results = vec![
            ParsingResult::new(0, "10 augusti", left),
            date_result(text, "22 september 2013", 2013, 9, 22),
        ];
        let merged = range_refiner().apply(&context, results);
        assert_eq!(merged.len(), 1);
        let result = &merged[0];
        assert_eq!(result.text, text);
        assert_eq!(result.start.get(Field::Year), Some(2013));
        assert!(!result.start.is_certain(Field::Year));
        let end = result.end.as_ref().unwrap();
        assert_eq!(end.get(Field::Month), Some(9));
    }

    #[test]
    fn test_range_with_existing_end_is_not_merged() {
        let text = "10 - 12 augusti till 14 augusti";
        let context = RefinerContext { text, reference: &anchor() };
        let first = date_result(text, "10 - 12 augusti", 2012, 8, 10).with_end(ParsingComponents::new());
        let results = vec![first, date_result(text, "14 augusti", 2012, 8, 14)];
        assert_eq!(range_refiner().apply(&context, results).len(), 2);
    }

    #[test]
    fn test_evening_range_ends_next_day() {
        let text = "10 augusti 2012 21:00 - 01:00";
        let context = RefinerContext { text, reference: &anchor() };
        let range = time_result(text, "21:00 - 01:00", 21, 0).with_end({
            let mut end = ParsingComponents::new();
            end.assign(Field::Hour, 1).assign(Field::Minute, 0);
            end
        });
        let results = vec![date_result(text, "10 augusti 2012", 2012, 8, 10), range];
        let merged = date_time_refiner().apply(&context, results);
        assert_eq!(merged.len(), 1);
        let end = merged[0].end.as_ref().unwrap();
        assert_eq!(end.get(Field::Day), Some(11));
        assert!(end.is_certain(Field::Day));
        assert_eq!(end.get(Field::Hour), Some(1));
    }

    #[test]
    fn test_overlap_keeps_longer() {
        let text = "i morgon kväll";
        let context = RefinerContext { text, reference: &anchor() };
        let results = vec![
            ParsingResult::new(0, "i morgon kväll", ParsingComponents::new()),
            ParsingResult::new(2, "morgon", ParsingComponents::new()),
            ParsingResult::new(9, "kväll", ParsingComponents::new()),
        ];
        let kept = Refiner::OverlapRemoval.apply(&context, results);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].text, "i morgon kväll");
    }

    #[test]
    fn test_overlap_tie_keeps_earlier_entry() {
        let text = "kl 8";
        let context = RefinerContext { text, reference: &anchor() };
        let mut first = ParsingComponents::new();
        first.assign(Field::Hour, 8);
        let results = vec![
            ParsingResult::new(0, "kl 8", first),
            ParsingResult::new(0, "kl 8", ParsingComponents::new()),
        ];
        let kept = Refiner::OverlapRemoval.apply(&context, results);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].start.get(Field::Hour), Some(8));
    }

    #[test]
    fn test_short_lists_pass_through() {
        let context = RefinerContext { text: "", reference: &anchor() };
        assert!(range_refiner().apply(&context, Vec::new()).is_empty());
        let single = vec![ParsingResult::new(0, "x", ParsingComponents::new())];
        assert_eq!(date_time_refiner().apply(&context, single).len(), 1);
    }
}
