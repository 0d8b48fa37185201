//! The parse driver: run every extractor over the text, sort, refine.

use serde::Serialize;
use tracing::{debug, trace};

use crate::calendar::WeekStartDay;
use crate::casual::{CasualDate, CasualTime};
use crate::components::{Field, ParsingComponents, ParsingResult};
use crate::duration::RelativeDuration;
use crate::error::WhenError;
use crate::numeric::{IsoDateTime, SlashDate};
use crate::primary::PrimaryExpression;
use crate::reference::ReferenceInstant;
use crate::refiners::{Refiner, RefinerContext};
use crate::weekday::WeekdayExpression;

/// Options for building a locale configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocaleOptions {
    /// Leave out the casual keyword parsers.
    pub strict: bool,
    /// Read numeric dates day first ("10/8" is August 10th).
    pub little_endian: bool,
    /// Which weekday gets index 0 in the `weekday` field.
    pub week_start: WeekStartDay,
}

impl Default for LocaleOptions {
    fn default() -> Self {
        Self {
            strict: false,
            little_endian: true,
            week_start: WeekStartDay::default(),
        }
    }
}

/// One extraction module.
#[derive(Debug, Clone)]
pub enum Extractor {
    IsoDateTime(IsoDateTime),
    SlashDate(SlashDate),
    Primary(PrimaryExpression),
    CasualDate(CasualDate),
    CasualTime(CasualTime),
    Weekday(WeekdayExpression),
    RelativeDuration(RelativeDuration),
}

impl Extractor {
    pub fn name(&self) -> &'static str {
        match self {
            Extractor::IsoDateTime(_) => "iso date",
            Extractor::SlashDate(_) => "slash date",
            Extractor::Primary(expression) => expression.name(),
            Extractor::CasualDate(_) => "casual date",
            Extractor::CasualTime(_) => "casual time",
            Extractor::Weekday(_) => "weekday",
            Extractor::RelativeDuration(_) => "relative duration",
        }
    }

    /// The first match at or after byte `offset`.
    pub fn try_match(
        &self,
        text: &str,
        offset: usize,
        reference: &ReferenceInstant,
    ) -> Option<ParsingResult> {
        match self {
            Extractor::IsoDateTime(e) => e.try_match(text, offset, reference),
            Extractor::SlashDate(e) => e.try_match(text, offset, reference),
            Extractor::Primary(e) => e.try_match(text, offset, reference),
            Extractor::CasualDate(e) => e.try_match(text, offset, reference),
            Extractor::CasualTime(e) => e.try_match(text, offset, reference),
            Extractor::Weekday(e) => e.try_match(text, offset, reference),
            Extractor::RelativeDuration(e) => e.try_match(text, offset, reference),
        }
    }
}

/// An ordered set of extractors and refiners for one language.
#[derive(Debug, Clone)]
pub struct Locale {
    name: &'static str,
    extractors: Vec<Extractor>,
    refiners: Vec<Refiner>,
}

impl Locale {
    /// # Errors
    ///
    /// Returns [`WhenError::InvalidLocale`] if `extractors` is empty.
    pub fn new(
        name: &'static str,
        extractors: Vec<Extractor>,
        refiners: Vec<Refiner>,
    ) -> Result<Self, WhenError> {
        if extractors.is_empty() {
            return Err(WhenError::InvalidLocale(format!("'{name}' has no extractors")));
        }
        debug!(
            locale = name,
            extractors = extractors.len(),
            refiners = refiners.len(),
            "locale loaded"
        );
        Ok(Self {
            name,
            extractors,
            refiners,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn extractors(&self) -> &[Extractor] {
        &self.extractors
    }

    pub fn refiners(&self) -> &[Refiner] {
        &self.refiners
    }
}

/// Parses text with one locale. Immutable, so it can be shared across threads.
#[derive(Debug, Clone)]
pub struct Parser {
    locale: Locale,
}

impl Parser {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Every expression found in `text`, in text order, without overlaps.
    ///
    /// # Examples
    ///
    /// ```
    /// use when_engine::{locales::sv, Field, Parser, ReferenceInstant};
    ///
    /// let parser = Parser::new(sv::casual().unwrap());
    /// let reference = ReferenceInstant::parse("2012-08-10T12:00:00Z", "UTC").unwrap();
    ///
    /// let results = parser.parse("Din deadline är den 10 augusti", &reference);
    /// assert_eq!(results.len(), 1);
    /// assert_eq!(results[0].text, "den 10 augusti");
    /// assert_eq!(results[0].start.get(Field::Month), Some(8));
    /// ```
    pub fn parse(&self, text: &str, reference: &ReferenceInstant) -> Vec<ParsingResult> {
        let mut results: Vec<ParsingResult> = self
            .locale
            .extractors
            .iter()
            .flat_map(|extractor| execute(extractor, text, reference))
            .collect();
        results.sort_by_key(|result| result.index);

        let context = RefinerContext { text, reference };
        for refiner in &self.locale.refiners {
            let before = results.len();
            results = refiner.apply(&context, results);
            trace!(refiner = refiner.name(), before, after = results.len(), "refiner applied");
        }

        for result in &mut results {
            imply_defaults(&mut result.start, reference);
            if let Some(end) = result.end.as_mut() {
                imply_defaults(end, reference);
            }
        }
        debug!(locale = self.locale.name, results = results.len(), "parsed");
        results
    }

    pub fn parse_first(&self, text: &str, reference: &ReferenceInstant) -> Option<ParsingResult> {
        self.parse(text, reference).into_iter().next()
    }
}

/// Every match of one extractor, scanning left to right.
fn execute(extractor: &Extractor, text: &str, reference: &ReferenceInstant) -> Vec<ParsingResult> {
    let mut results = Vec::new();
    let mut offset = 0;
    while offset < text.len() {
        let Some(result) = extractor.try_match(text, offset, reference) else {
            break;
        };
        trace!(
            extractor = extractor.name(),
            index = result.index,
            text = %result.text,
            components = %result.start,
            "matched"
        );
        offset = result.end_index().max(offset + 1);
        results.push(result);
    }
    results
}

/// Fill whatever is still unset: the reference date at noon.
fn imply_defaults(components: &mut ParsingComponents, reference: &ReferenceInstant) {
    components
        .imply_date(reference.date())
        .imply(Field::Hour, 12)
        .imply(Field::Minute, 0)
        .imply(Field::Second, 0)
        .imply(Field::Millisecond, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locales::sv;
    use chrono::{TimeZone, Utc};

    fn anchor() -> ReferenceInstant {
        ReferenceInstant::utc(Utc.with_ymd_and_hms(2012, 8, 10, 12, 0, 0).unwrap())
    }

    fn casual() -> Parser {
        Parser::new(sv::casual().unwrap())
    }

    #[test]
    fn test_parser_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Parser>();
        assert_send_sync::<Locale>();
    }

    #[test]
    fn test_empty_locale_is_rejected() {
        let err = Locale::new("empty", Vec::new(), Vec::new()).unwrap_err();
        assert!(err.to_string().contains("Invalid locale"), "got: {err}");
    }

    #[test]
    fn test_no_expression_yields_nothing() {
        assert!(casual().parse("Det finns inget datum här", &anchor()).is_empty());
        assert!(casual().parse("", &anchor()).is_empty());
    }

    #[test]
    fn test_defaults_fill_noon_on_date() {
        let result = casual().parse_first("31 mars 2016", &anchor()).unwrap();
        assert_eq!(result.start.get(Field::Hour), Some(12));
        assert_eq!(result.start.get(Field::Minute), Some(0));
        assert!(!result.start.is_certain(Field::Hour));
    }

    #[test]
    fn test_date_and_time_are_merged() {
        let result = casual().parse_first("10 augusti 2012, 14:30", &anchor()).unwrap();
        assert_eq!(result.text, "10 augusti 2012, 14:30");
        assert_eq!(result.start.get(Field::Day), Some(10));
        assert_eq!(result.start.get(Field::Hour), Some(14));
        assert!(result.start.is_certain(Field::Minute));
    }

    #[test]
    fn test_results_are_in_text_order() {
        let results = casual().parse("imorgon eller 31 mars 2016", &anchor());
        assert_eq!(results.len(), 2);
        assert!(results[0].index < results[1].index);
        assert_eq!(results[0].text, "imorgon");
    }

    #[test]
    fn test_strict_ignores_casual_words() {
        let parser = Parser::new(sv::strict().unwrap());
        assert!(parser.parse("imorgon", &anchor()).is_empty());
        assert_eq!(parser.parse("10 augusti 2012", &anchor()).len(), 1);
    }

    #[test]
    fn test_week_start_option() {
        let options = LocaleOptions {
            week_start: WeekStartDay::Monday,
            ..LocaleOptions::default()
        };
        let parser = Parser::new(sv::configuration(&options).unwrap());
        let result = parser.parse_first("tisdag", &anchor()).unwrap();
        assert_eq!(result.start.get(Field::Weekday), Some(1));
    }

    #[test]
    fn test_relative_duration_through_parser() {
        let result = casual().parse_first("Mötet är om 3 dagar", &anchor()).unwrap();
        assert_eq!(result.text, "om 3 dagar");
        assert_eq!(result.start.get(Field::Day), Some(13));
    }

    #[test]
    fn test_clock_time_before_tomorrow_keeps_date() {
        let result = casual().parse_first("kl 8 i morgon", &anchor()).unwrap();
        assert_eq!(result.text, "kl 8 i morgon");
        assert_eq!(result.start.get(Field::Day), Some(11));
        assert!(result.start.is_certain(Field::Day));
        assert_eq!(result.start.get(Field::Hour), Some(8));
        assert!(result.start.is_certain(Field::Hour));

        let evening = casual().parse_first("kl 8 i kväll", &anchor()).unwrap();
        assert_eq!(evening.text, "kl 8 i kväll");
        assert_eq!(evening.start.get(Field::Hour), Some(20));
    }

    #[test]
    fn test_oversized_duration_yields_nothing() {
        assert!(casual()
            .parse("för 99999999999999999999 dagar sedan", &anchor())
            .is_empty());
    }

    #[test]
    fn test_iso_date_through_parser() {
        let result = casual().parse_first("Levereras 2012-08-20T09:15:00Z", &anchor()).unwrap();
        assert_eq!(result.text, "2012-08-20T09:15:00Z");
        assert_eq!(result.start.get(Field::Day), Some(20));
        assert_eq!(result.start.get(Field::Hour), Some(9));
        assert_eq!(result.start.get(Field::TimezoneOffset), Some(0));

        let results = casual().parse("2012-08-20", &anchor());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].start.get(Field::Hour), Some(12));
        assert!(!results[0].start.is_certain(Field::Hour));
    }

    #[test]
    fn test_slash_date_through_parser() {
        let result = casual().parse_first("Mötet är 10/8/2012 kl 9", &anchor()).unwrap();
        assert_eq!(result.text, "10/8/2012 kl 9");
        assert_eq!(result.start.get(Field::Day), Some(10));
        assert_eq!(result.start.get(Field::Month), Some(8));
        assert_eq!(result.start.get(Field::Hour), Some(9));

        let strict = Parser::new(sv::strict().unwrap());
        let result = strict.parse_first("10.08.2012", &anchor()).unwrap();
        assert_eq!(result.start.get(Field::Day), Some(10));
    }

    #[test]
    fn test_month_first_option() {
        let options = LocaleOptions {
            little_endian: false,
            ..LocaleOptions::default()
        };
        let parser = Parser::new(sv::configuration(&options).unwrap());
        let result = parser.parse_first("8/10/2012", &anchor()).unwrap();
        assert_eq!(result.start.get(Field::Month), Some(8));
        assert_eq!(result.start.get(Field::Day), Some(10));
    }

    #[test]
    fn test_results_serialize() {
        let results = casual().parse("10 augusti 2012", &anchor());
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json[0]["text"], "10 augusti 2012");
        assert_eq!(json[0]["start"]["day"]["certainty"], "certain");
        assert_eq!(json[0]["start"]["hour"]["certainty"], "implied");
    }
}
