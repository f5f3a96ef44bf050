//! Human-readable rendering of [`Timestamp`]s.
use core::fmt;

use crate::{Breakdown, Timestamp};

bitflags::bitflags! {
    /// Selects the components rendered by [`Timestamp::to_string_with`].
    ///
    /// The components always appear in the order `DATE`, `TIME`, `MS`,
    /// `MCS` regardless of how the flags are combined.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Format: u8 {
        /// `H:M:S`
        const TIME = 1 << 0;
        /// `[D/M/Y]`
        const DATE = 1 << 1;
        /// `.mmm`, the milliseconds within the current second.
        const MS = 1 << 2;
        /// `[uuu]`, the microseconds within the current millisecond.
        const MCS = 1 << 3;

        /// `H:M:S.mmm`
        const TIME_MS = Self::TIME.bits() | Self::MS.bits();
        /// `[D/M/Y] H:M:S`
        const DATETIME = Self::TIME.bits() | Self::DATE.bits();
        /// `[D/M/Y] H:M:S.mmm`
        const DATETIME_MS = Self::DATETIME.bits() | Self::MS.bits();
        /// `[D/M/Y] H:M:S.mmm[uuu]`
        const ALL = Self::DATETIME_MS.bits() | Self::MCS.bits();
    }
}

impl Default for Format {
    fn default() -> Self {
        Self::DATETIME
    }
}

/// A [`Display`](fmt::Display) adapter returned by [`Timestamp::formatted`].
#[derive(Debug, Clone, Copy)]
pub struct Formatted {
    timestamp: Timestamp,
    format: Format,
    local: bool,
}

impl Formatted {
    pub(crate) const fn new(timestamp: Timestamp, format: Format, local: bool) -> Self {
        Self {
            timestamp,
            format,
            local,
        }
    }
}

impl fmt::Display for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Self {
            timestamp,
            format,
            local,
        } = *self;

        // Only consult the calendar (and possibly the time zone database)
        // if a calendar segment was requested
        let fields = format
            .intersects(Format::DATE | Format::TIME)
            .then(|| Breakdown::from_secs_clamped(timestamp.as_secs(), local));

        if let Some(fields) = fields.filter(|_| format.contains(Format::DATE)) {
            write!(f, "[{}/{}/{}]", fields.day, fields.month, fields.year)?;

            // Separate the date from whatever follows it
            if format.bits() > Format::DATE.bits() {
                f.write_str(" ")?;
            }
        }

        if let Some(fields) = fields.filter(|_| format.contains(Format::TIME)) {
            write!(f, "{}:{}:{}", fields.hour, fields.minute, fields.second)?;
        }

        if format.contains(Format::MS) {
            write!(f, ".{}", timestamp.subsec_millis())?;
        }

        if format.contains(Format::MCS) {
            write!(f, "[{}]", timestamp.submilli_micros())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_0p4::{DateTime, Datelike, Local, TimeZone, Timelike};

    fn utc(micros: i64, format: Format) -> String {
        Timestamp::from_micros(micros).to_string_with(format, false)
    }

    #[test]
    fn presets() {
        assert_eq!(Format::TIME_MS, Format::TIME | Format::MS);
        assert_eq!(Format::DATETIME, Format::TIME | Format::DATE);
        assert_eq!(Format::DATETIME_MS.bits(), 7);
        assert_eq!(Format::ALL.bits(), 15);
        assert_eq!(Format::default(), Format::DATETIME);
    }

    #[test]
    fn date_only_matches_reference_calendar() {
        let micros = 90_061_000_000;
        let reference = DateTime::from_timestamp(micros / 1_000_000, 0).unwrap();
        assert_eq!(
            utc(micros, Format::DATE),
            format!(
                "[{}/{}/{}]",
                reference.day(),
                reference.month(),
                reference.year()
            )
        );
        assert_eq!(utc(micros, Format::DATE), "[2/1/1970]");
    }

    #[test]
    fn segments() {
        let micros = 90_061_250_042;
        assert_eq!(utc(micros, Format::TIME), "1:1:1");
        assert_eq!(utc(micros, Format::TIME_MS), "1:1:1.250");
        assert_eq!(utc(micros, Format::DATETIME), "[2/1/1970] 1:1:1");
        assert_eq!(utc(micros, Format::DATETIME_MS), "[2/1/1970] 1:1:1.250");
        assert_eq!(utc(micros, Format::ALL), "[2/1/1970] 1:1:1.250[42]");
        assert_eq!(utc(micros, Format::MS), ".250");
        assert_eq!(utc(micros, Format::MCS), "[42]");
        assert_eq!(utc(micros, Format::MS | Format::MCS), ".250[42]");
    }

    #[test]
    fn date_separator() {
        // The space is emitted whenever anything follows the date
        assert_eq!(utc(0, Format::DATE | Format::MS), "[1/1/1970] .0");
        assert_eq!(utc(0, Format::DATE | Format::MCS), "[1/1/1970] [0]");
        assert_eq!(utc(0, Format::DATE), "[1/1/1970]");
    }

    #[test]
    fn empty_format() {
        assert_eq!(utc(123_456_789, Format::empty()), "");
    }

    #[test]
    fn millis_past_second_boundary() {
        assert_eq!(utc(2_500_000, Format::TIME_MS), "0:0:2.500");
    }

    #[test]
    fn no_zero_padding() {
        assert_eq!(utc(3_723_005_007, Format::ALL), "[1/1/1970] 1:2:3.5[7]");
    }

    #[test]
    fn negative() {
        // The calendar uses the truncated seconds (-1), the remainders keep
        // their sign
        assert_eq!(utc(-1_500_000, Format::ALL), "[31/12/1969] 23:59:59.-500[0]");
        assert_eq!(utc(-1_234, Format::TIME_MS | Format::MCS), "0:0:0.-1[-234]");
    }

    #[test]
    fn out_of_range_does_not_panic() {
        let _ = env_logger::builder().is_test(true).try_init();
        for &micros in &[i64::MIN, i64::MAX] {
            for &local in &[false, true] {
                let s = Timestamp::from_micros(micros).to_string_with(Format::ALL, local);
                log::debug!("{micros} → {s:?}");
                assert!(s.starts_with('['), "{s:?}");
            }
        }
        assert_eq!(utc(i64::MAX, Format::MS | Format::MCS), ".775[807]");
    }

    #[test]
    fn local_time() {
        let micros = 1_709_210_096_123_456;
        let reference = Local.timestamp_opt(micros / 1_000_000, 0).unwrap();
        assert_eq!(
            Timestamp::from_micros(micros).to_string_with(Format::ALL, true),
            format!(
                "[{}/{}/{}] {}:{}:{}.123[456]",
                reference.day(),
                reference.month(),
                reference.year(),
                reference.hour(),
                reference.minute(),
                reference.second(),
            )
        );
    }

    #[test]
    fn display_is_utc_datetime() {
        let ts = Timestamp::from_micros(1_709_210_096_123_456);
        assert_eq!(ts.to_string(), "[29/2/2024] 12:34:56");
        assert_eq!(ts.to_string(), ts.formatted(Format::default(), false).to_string());
        assert_eq!(format!("{}", ts.formatted(Format::TIME, false)), "12:34:56");
    }

    #[test]
    fn concurrent_formatting() {
        let samples: Vec<Timestamp> = (0..64)
            .map(|i| Timestamp::from_micros(i * 7_919_000_123_457))
            .collect();
        let expected: Vec<(String, String)> = samples
            .iter()
            .map(|ts| {
                (
                    ts.to_string_with(Format::ALL, false),
                    ts.to_string_with(Format::ALL, true),
                )
            })
            .collect();

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..16 {
                        for (ts, (utc, local)) in samples.iter().zip(&expected) {
                            assert_eq!(&ts.to_string_with(Format::ALL, false), utc);
                            assert_eq!(&ts.to_string_with(Format::ALL, true), local);
                        }
                    }
                });
            }
        });
    }
}
