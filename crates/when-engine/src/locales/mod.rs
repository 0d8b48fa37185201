//! Locale packs: the word lists and pattern fragments of one language,
//! assembled into a [`Locale`](crate::Locale).

pub mod sv;
