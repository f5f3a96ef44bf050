#![doc = include_str!("./lib.md")]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod breakdown;
pub mod clock;
pub mod format;
mod timestamp;

pub use self::{
    breakdown::{Breakdown, OutOfRangeError},
    clock::{Clock, ManualClock, SystemClock},
    format::{Format, Formatted},
    timestamp::*,
};
