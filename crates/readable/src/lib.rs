//! Human-readable numbers, durations and relative times.
//!
//! Formatting is fixed to English unit names and `.` as the decimal separator.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod number;
mod time;

pub use number::{abbreviation, abbreviation_with, remove_trailing_zeros, Abbreviate};
pub use time::{duration, is_in_past, relative, time_ago};
