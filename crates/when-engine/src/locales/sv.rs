//! Swedish (`sv`).
//!
//! Little-endian dates ("10 augusti 2012", "ti, 10 jan", "10/8/2012"), ISO
//! 8601 dates, 24-hour and
//! 12-hour times ("kl 14:30", "8 på kvällen"), casual words ("imorgon
//! kväll"), weekdays and relative durations ("om 2 dagar", "3 timmar sedan").
//!
//! Weekday indices count from Sunday unless the options say otherwise.

use chrono::Weekday;

use crate::calendar::WeekStartDay;
use crate::casual::{CasualDate, CasualTime, PartOfDay, RelativeDay};
use crate::components::{Field, Meridiem};
use crate::duration::{DurationPattern, RelativeDuration, RelativeDurationWords, TimeUnit};
use crate::error::WhenError;
use crate::numeric::{IsoDateTime, SlashDate};
use crate::pattern::{match_any_pattern, Dictionary, Numerals, VagueQuantity, WordTable};
use crate::pipeline::{Extractor, Locale, LocaleOptions};
use crate::primary::{LiteralVocabulary, PrimaryExpression, PrimaryPattern};
use crate::refiners::Refiner;
use crate::weekday::{WeekdayExpression, WeekdayModifier};
use crate::year::EraMarkers;

// ── Dictionaries ────────────────────────────────────────────────────────────

const WEEKDAYS: Dictionary<Weekday> = &[
    ("söndag", Weekday::Sun),
    ("sön", Weekday::Sun),
    ("sö", Weekday::Sun),
    ("måndag", Weekday::Mon),
    ("mån", Weekday::Mon),
    ("må", Weekday::Mon),
    ("tisdag", Weekday::Tue),
    ("tis", Weekday::Tue),
    ("ti", Weekday::Tue),
    ("onsdag", Weekday::Wed),
    ("ons", Weekday::Wed),
    ("on", Weekday::Wed),
    ("torsdag", Weekday::Thu),
    ("tor", Weekday::Thu),
    ("to", Weekday::Thu),
    ("fredag", Weekday::Fri),
    ("fre", Weekday::Fri),
    ("fr", Weekday::Fri),
    ("lördag", Weekday::Sat),
    ("lör", Weekday::Sat),
    ("lö", Weekday::Sat),
];

const MONTHS: Dictionary<u32> = &[
    ("januari", 1),
    ("jan", 1),
    ("jan.", 1),
    ("februari", 2),
    ("feb", 2),
    ("feb.", 2),
    ("mars", 3),
    ("mar", 3),
    ("april", 4),
    ("apr", 4),
    ("apr.", 4),
    ("maj", 5),
    ("juni", 6),
    ("jun", 6),
    ("jun.", 6),
    ("juli", 7),
    ("jul", 7),
    ("jul.", 7),
    ("augusti", 8),
    ("aug", 8),
    ("aug.", 8),
    ("september", 9),
    ("sep", 9),
    ("sep.", 9),
    ("sept", 9),
    ("sept.", 9),
    ("oktober", 10),
    ("okt", 10),
    ("okt.", 10),
    ("november", 11),
    ("nov", 11),
    ("nov.", 11),
    ("december", 12),
    ("dec", 12),
    ("dec.", 12),
];

const INTEGER_WORDS: Dictionary<u32> = &[
    ("en", 1),
    ("ett", 1),
    ("första", 1),
    ("två", 2),
    ("andra", 2),
    ("tre", 3),
    ("tredje", 3),
    ("fyra", 4),
    ("fjärde", 4),
    ("fem", 5),
    ("femte", 5),
    ("sex", 6),
    ("sjätte", 6),
    ("sju", 7),
    ("sjunde", 7),
    ("åtta", 8),
    ("åttonde", 8),
    ("nio", 9),
    ("nionde", 9),
    ("tio", 10),
    ("tionde", 10),
    ("elva", 11),
    ("elfte", 11),
    ("tolv", 12),
    ("tolfte", 12),
];

const VAGUE: &[VagueQuantity] = &[
    VagueQuantity { pattern: r"ett\s+par", value: 2.0 },
    VagueQuantity { pattern: r"några", value: 3.0 },
    VagueQuantity { pattern: r"flera", value: 7.0 },
    VagueQuantity { pattern: r"en\s+halv|halv", value: 0.5 },
];

const TIME_UNITS: Dictionary<TimeUnit> = &[
    ("sec", TimeUnit::Second),
    ("second", TimeUnit::Second),
    ("seconds", TimeUnit::Second),
    ("sek", TimeUnit::Second),
    ("sekund", TimeUnit::Second),
    ("sekunder", TimeUnit::Second),
    ("min", TimeUnit::Minute),
    ("mins", TimeUnit::Minute),
    ("minute", TimeUnit::Minute),
    ("minutes", TimeUnit::Minute),
    ("minut", TimeUnit::Minute),
    ("minuter", TimeUnit::Minute),
    ("h", TimeUnit::Hour),
    ("hr", TimeUnit::Hour),
    ("hrs", TimeUnit::Hour),
    ("hour", TimeUnit::Hour),
    ("hours", TimeUnit::Hour),
    ("tim", TimeUnit::Hour),
    ("timme", TimeUnit::Hour),
    ("timmar", TimeUnit::Hour),
    ("day", TimeUnit::Day),
    ("days", TimeUnit::Day),
    ("dag", TimeUnit::Day),
    ("dagar", TimeUnit::Day),
    ("week", TimeUnit::Week),
    ("weeks", TimeUnit::Week),
    ("vecka", TimeUnit::Week),
    ("veckor", TimeUnit::Week),
    ("month", TimeUnit::Month),
    ("months", TimeUnit::Month),
    ("månad", TimeUnit::Month),
    ("månader", TimeUnit::Month),
    ("y", TimeUnit::Year),
    ("yr", TimeUnit::Year),
    ("year", TimeUnit::Year),
    ("years", TimeUnit::Year),
    ("år", TimeUnit::Year),
];

const MERIDIEMS: Dictionary<Meridiem> = &[
    ("am", Meridiem::Am),
    ("a.m.", Meridiem::Am),
    ("fm", Meridiem::Am),
    ("f.m.", Meridiem::Am),
    ("pm", Meridiem::Pm),
    ("p.m.", Meridiem::Pm),
    ("em", Meridiem::Pm),
    ("e.m.", Meridiem::Pm),
];

/// Stems that put a 1–11 hour in the morning or the evening.
const DAY_PERIODS: Dictionary<Meridiem> = &[
    ("morgon", Meridiem::Am),
    ("förmiddag", Meridiem::Am),
    ("natt", Meridiem::Am),
    ("eftermiddag", Meridiem::Pm),
    ("kväll", Meridiem::Pm),
];

const RELATIVE_DAYS: Dictionary<RelativeDay> = &[
    ("nu", RelativeDay::Now),
    ("idag", RelativeDay::Today),
    ("i dag", RelativeDay::Today),
    ("imorgon", RelativeDay::Tomorrow),
    ("i morgon", RelativeDay::Tomorrow),
    ("övermorgon", RelativeDay::DayAfterTomorrow),
    ("i övermorgon", RelativeDay::DayAfterTomorrow),
    ("igår", RelativeDay::Yesterday),
    ("i går", RelativeDay::Yesterday),
    ("förrgår", RelativeDay::DayBeforeYesterday),
    ("i förrgår", RelativeDay::DayBeforeYesterday),
    ("inatt", RelativeDay::LastNight),
    ("i natt", RelativeDay::LastNight),
];

const PARTS_OF_DAY: Dictionary<PartOfDay> = &[
    ("morgon", PartOfDay::Morning),
    ("förmiddag", PartOfDay::Forenoon),
    ("lunch", PartOfDay::Noon),
    ("lunchtid", PartOfDay::Noon),
    ("middag", PartOfDay::Noon),
    ("eftermiddag", PartOfDay::Afternoon),
    ("kväll", PartOfDay::Evening),
    ("kvällstid", PartOfDay::Evening),
    ("sen kväll", PartOfDay::LateEvening),
    ("natt", PartOfDay::Night),
    ("midnatt", PartOfDay::Midnight),
];

const DEMONSTRATIVES: &[&str] = &["denna", "den här", "på", "i"];

const WEEKDAY_MODIFIERS: Dictionary<WeekdayModifier> = &[
    ("denna", WeekdayModifier::This),
    ("den här", WeekdayModifier::This),
    ("nästa", WeekdayModifier::Next),
    ("kommande", WeekdayModifier::Next),
    ("förra", WeekdayModifier::Last),
];

const INTENSITY_WORDS: &[&str] = &["runt", "cirka", "ungefär", "about", "roughly"];

// ── Pattern fragments ───────────────────────────────────────────────────────

const ERA_BEFORE: &str = r"f\.?\s*kr";
const ERA_AFTER: &str = r"e\.?\s*kr";

const TIME_PREFIX: &str = r"(?:(?:på|den)\s*)?(?:(?P<anchor>klockan|kl\.?)\s*)?";
const TIME_CONNECTOR: &str = r"\s*(?:-|–|~|〜|till|tills)\s*";
/// "i morgon" is tomorrow, so "i" only leads the other parts of the day.
const TIME_SUFFIX: &str = r"(?:\s*klockan)?(?:\s*(?:i\s+(?:förmiddag|eftermiddag|kvällstid|kväll|nattetid|natt)|(?:på\s+)?(?:morgon|förmiddag|eftermiddag|kvällstid|kväll|nattetid|natt))(?:en)?)?";

const DATE_CONNECTOR: &str = r"\s*(?:-|–|till|tills)\s*";

const RANGE_CONNECTOR: &str = r"^\s*(till(?:\s*(?:kl|klockan))?|-)\s*$";
const DATE_TIME_CONNECTOR: &str = r"^\s*(T|em|fm|,|-)?\s*$";

const TIME_ANCHORS: &[Field] = &[Field::Minute, Field::Meridiem];
const DATE_ANCHORS: &[Field] = &[Field::Month];

// ── Configurations ──────────────────────────────────────────────────────────

/// Casual configuration: everything, including keywords like "imorgon".
pub fn casual() -> Result<Locale, WhenError> {
    configuration(&LocaleOptions {
        strict: false,
        little_endian: true,
        week_start: WeekStartDay::Sunday,
    })
}

/// Strict configuration: explicit dates, times, weekdays and durations only.
pub fn strict() -> Result<Locale, WhenError> {
    configuration(&LocaleOptions {
        strict: true,
        little_endian: true,
        week_start: WeekStartDay::Sunday,
    })
}

pub fn configuration(options: &LocaleOptions) -> Result<Locale, WhenError> {
    let vocabulary = vocabulary(options.week_start)?;

    let mut extractors = Vec::new();
    if !options.strict {
        extractors.push(Extractor::CasualDate(CasualDate::new(RELATIVE_DAYS, PARTS_OF_DAY)?));
        extractors.push(Extractor::CasualTime(CasualTime::new(PARTS_OF_DAY, DEMONSTRATIVES)?));
    }
    extractors.push(Extractor::IsoDateTime(IsoDateTime::new()?));
    extractors.push(Extractor::SlashDate(SlashDate::new(options.little_endian)?));
    extractors.push(Extractor::Primary(time_expression(&vocabulary)?));
    extractors.push(Extractor::Primary(month_name_date(&vocabulary)?));
    extractors.push(Extractor::Weekday(weekday(options.week_start)?));
    extractors.push(Extractor::RelativeDuration(relative_duration(&vocabulary.numerals)?));

    let refiners = vec![
        Refiner::OverlapRemoval,
        Refiner::merge_date_range(RANGE_CONNECTOR)?,
        Refiner::merge_date_time(DATE_TIME_CONNECTOR)?,
        Refiner::OverlapRemoval,
    ];

    let name = if options.strict { "sv-strict" } else { "sv" };
    Locale::new(name, extractors, refiners)
}

pub(crate) fn vocabulary(week_start: WeekStartDay) -> Result<LiteralVocabulary, WhenError> {
    Ok(LiteralVocabulary {
        weekdays: WordTable::new(WEEKDAYS),
        months: WordTable::new(MONTHS),
        meridiems: WordTable::new(MERIDIEMS),
        numerals: Numerals::new(INTEGER_WORDS, VAGUE)?,
        era: EraMarkers::new(ERA_BEFORE, ERA_AFTER)?,
        week_start,
    })
}

/// "kl 8", "14:30", "8 på kvällen", "8:00 - 10:30".
pub(crate) fn time_expression(vocabulary: &LiteralVocabulary) -> Result<PrimaryExpression, WhenError> {
    let literal = format!(
        r"(?P<hour>[0-9]{{1,2}})(?:[.:](?P<minute>[0-5][0-9])(?:[.:](?P<second>[0-5][0-9])(?:[.,](?P<millisecond>[0-9]{{1,6}}))?)?)?(?:\s*(?P<meridiem>{}))?",
        vocabulary.meridiems.pattern()
    );
    PrimaryExpression::new(
        PrimaryPattern {
            name: "sv time expression",
            prefix: TIME_PREFIX,
            literal: &literal,
            connector: Some(TIME_CONNECTOR),
            suffix: TIME_SUFFIX,
            anchors: TIME_ANCHORS,
            day_periods: DAY_PERIODS,
        },
        vocabulary,
    )
}

/// "10 augusti 2012", "tisdag den 10 januari", "10 - 22 augusti 2012".
pub(crate) fn month_name_date(vocabulary: &LiteralVocabulary) -> Result<PrimaryExpression, WhenError> {
    let day_words = match_any_pattern(INTEGER_WORDS.iter().map(|(word, _)| *word));
    let literal = format!(
        r"(?:(?P<weekday>{weekdays})\s*,?\s*)?(?:den\s+)?(?P<day>[0-9]{{1,2}}|{day_words})(?:\.|:e|:a)?(?:\s*(?P<month>{months}))?(?:\s*,?\s*(?P<year>{year}))?",
        weekdays = vocabulary.weekdays.pattern(),
        months = vocabulary.months.pattern(),
        year = vocabulary.era.year_pattern(),
    );
    PrimaryExpression::new(
        PrimaryPattern {
            name: "sv month name date",
            prefix: "",
            literal: &literal,
            connector: Some(DATE_CONNECTOR),
            suffix: "",
            anchors: DATE_ANCHORS,
            day_periods: &[],
        },
        vocabulary,
    )
}

/// Standalone weekdays. Two-letter abbreviations ("to", "on") only count
/// inside a date literal.
fn weekday(week_start: WeekStartDay) -> Result<WeekdayExpression, WhenError> {
    let names: Vec<(&str, Weekday)> = WEEKDAYS
        .iter()
        .copied()
        .filter(|(word, _)| word.chars().count() >= 3)
        .collect();
    WeekdayExpression::new(&names, WEEKDAY_MODIFIERS, week_start)
}

/// "om 2 dagar", "inom en timme", "för 3 veckor sedan".
fn relative_duration(numerals: &Numerals) -> Result<RelativeDuration, WhenError> {
    let duration = DurationPattern::new(numerals, TIME_UNITS, INTENSITY_WORDS)?;
    RelativeDuration::new(
        duration,
        &RelativeDurationWords {
            future_prefix: r"(?:om|inom)",
            past_prefix: r"för",
            past_suffix: r"sedan",
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configurations_load() {
        let casual = casual().unwrap();
        let strict = strict().unwrap();
        assert_eq!(casual.name(), "sv");
        assert_eq!(strict.name(), "sv-strict");
        assert_eq!(casual.extractors().len(), strict.extractors().len() + 2);
        assert_eq!(casual.refiners().len(), 4);
    }

    #[test]
    fn test_dictionaries_have_no_blank_words() {
        assert!(WEEKDAYS.iter().all(|(w, _)| !w.trim().is_empty()));
        assert!(MONTHS.iter().all(|(w, _)| !w.trim().is_empty()));
        assert!(TIME_UNITS.iter().all(|(w, _)| !w.trim().is_empty()));
    }

    #[test]
    fn test_swedish_vague_quantities() {
        let numerals = Numerals::new(INTEGER_WORDS, VAGUE).unwrap();
        assert_eq!(numerals.parse("ett par"), Some(2.0));
        assert_eq!(numerals.parse("några"), Some(3.0));
        assert_eq!(numerals.parse("flera"), Some(7.0));
        assert_eq!(numerals.parse("en halv"), Some(0.5));
        assert_eq!(numerals.parse("en"), Some(1.0));
    }

    #[test]
    fn test_every_month_resolves() {
        let months = WordTable::new(MONTHS);
        for (word, month) in MONTHS {
            assert_eq!(months.get(&word.to_uppercase()), Some(*month), "{word}");
        }
    }
}
