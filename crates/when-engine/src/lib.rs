//! # when-engine
//!
//! Finds date and time expressions in natural-language text.
//!
//! Each expression comes back as a [`ParsingResult`]: where it sits in the
//! text and a field-level description of what it says. Every field is either
//! *certain* (written in the text) or *implied* (filled in from the reference
//! instant or a default). Turning the fields into a wall-clock value is left
//! to the caller.
//!
//! Languages are plugged in as locale packs of word lists and pattern
//! fragments; scanning, disambiguation and merging are shared.
//!
//! ## Modules
//!
//! - [`components`]: fields, certainty, parsing results
//! - [`reference`]: the reference instant relative expressions resolve against
//! - [`calendar`]: date arithmetic and year heuristics over `chrono`
//! - [`pattern`]: dictionaries, alternations, numerals
//! - [`primary`]: explicit date and time literals
//! - [`numeric`]: ISO 8601 and slash dates
//! - [`casual`]: "today", "tomorrow evening", "midnight"
//! - [`weekday`]: weekday names and modifiers
//! - [`duration`]: "2 days 3 hours", "in 2 days", "3 hours ago"
//! - [`year`]: era markers and two-digit years
//! - [`refiners`]: overlap removal, range merge, date-time merge
//! - [`pipeline`]: locale configuration and the parse driver
//! - [`locales`]: language packs (Swedish)
//! - [`error`]: error types
//!
//! ```
//! use when_engine::{locales::sv, Field, Parser, ReferenceInstant};
//!
//! let parser = Parser::new(sv::casual().unwrap());
//! let reference = ReferenceInstant::parse("2012-08-10T12:00:00Z", "Europe/Stockholm").unwrap();
//!
//! let result = parser.parse_first("Vi ses imorgon kväll", &reference).unwrap();
//! assert_eq!(result.text, "imorgon kväll");
//! assert_eq!(result.start.get(Field::Day), Some(11));
//! assert_eq!(result.start.get(Field::Hour), Some(18));
//! assert!(!result.start.is_certain(Field::Hour));
//! ```

pub mod calendar;
pub mod casual;
pub mod components;
pub mod duration;
pub mod error;
pub mod locales;
pub mod numeric;
pub mod pattern;
pub mod pipeline;
pub mod primary;
pub mod reference;
pub mod refiners;
pub mod weekday;
pub mod year;

pub use calendar::WeekStartDay;
pub use components::{Certainty, Field, FieldValue, Meridiem, ParsingComponents, ParsingResult};
pub use duration::{TimeUnit, TimeUnits};
pub use error::WhenError;
pub use numeric::{IsoDateTime, SlashDate};
pub use pipeline::{Extractor, Locale, LocaleOptions, Parser};
pub use reference::ReferenceInstant;
pub use refiners::Refiner;
