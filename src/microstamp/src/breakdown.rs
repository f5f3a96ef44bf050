//! Calendar breakdown of epoch seconds.
//!
//! Both conversions are delegated to `chrono`, which keeps no shared
//! `struct tm`-style buffer, so they can be called from any thread.
use chrono_0p4::{DateTime, Datelike, Local, TimeZone, Timelike, Utc};
use core::fmt;

/// The calendar fields of an instant, either in UTC or in the local time
/// zone of the executing machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Breakdown {
    /// The proleptic Gregorian year, e.g., `1970`.
    pub year: i32,
    /// The month, starting from `1`.
    pub month: u32,
    /// The day of the month, starting from `1`.
    pub day: u32,
    /// The hour, `0..=23`.
    pub hour: u32,
    /// The minute, `0..=59`.
    pub minute: u32,
    /// The second, `0..=59`.
    pub second: u32,
}

/// Error type returned when an instant lies outside the calendar range
/// supported by the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRangeError(pub(crate) ());

impl fmt::Display for OutOfRangeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("instant is outside the representable calendar range")
    }
}

impl std::error::Error for OutOfRangeError {}

impl Breakdown {
    /// Break down `secs` seconds since the UNIX epoch into calendar fields.
    /// The fields are computed in the local time zone if `local` is `true`
    /// and in UTC otherwise.
    ///
    /// Returns an error if `secs` is too far away from the epoch for the
    /// calendar (roughly ±262,000 years).
    ///
    /// # Examples
    ///
    /// ```
    /// use microstamp::Breakdown;
    ///
    /// let fields = Breakdown::from_secs(90_061, false).unwrap();
    /// assert_eq!((fields.day, fields.month, fields.year), (2, 1, 1970));
    /// assert_eq!((fields.hour, fields.minute, fields.second), (1, 1, 1));
    /// ```
    pub fn from_secs(secs: i64, local: bool) -> Result<Self, OutOfRangeError> {
        let utc = utc_datetime(secs).ok_or(OutOfRangeError(()))?;
        Ok(Self::from_utc(&utc, local))
    }

    /// Like [`Self::from_secs`], but an out-of-range `secs` is clamped to the
    /// nearest supported instant instead of failing.
    pub fn from_secs_clamped(secs: i64, local: bool) -> Self {
        let utc = utc_datetime(secs).unwrap_or_else(|| {
            let (min, max) = bounds();
            let clamped = if secs < 0 { min } else { max };
            log::warn!(
                "{secs} seconds since the epoch is outside the calendar range, \
                 clamping to {clamped}"
            );
            clamped
        });
        Self::from_utc(&utc, local)
    }

    fn from_utc(utc: &DateTime<Utc>, local: bool) -> Self {
        if local {
            Self::from_tz(utc, &Local)
        } else {
            Self::from_tz(utc, &Utc)
        }
    }

    fn from_tz<Tz: TimeZone>(utc: &DateTime<Utc>, tz: &Tz) -> Self {
        let datetime = utc.with_timezone(tz);
        Self {
            year: datetime.year(),
            month: datetime.month(),
            day: datetime.day(),
            hour: datetime.hour(),
            minute: datetime.minute(),
            second: datetime.second(),
        }
    }
}

/// The range of instants accepted by the conversion. One day is shaved off
/// each end of `chrono`'s range so that any UTC offset can still be applied.
fn bounds() -> (DateTime<Utc>, DateTime<Utc>) {
    let headroom = chrono_0p4::Duration::days(1);
    (
        DateTime::<Utc>::MIN_UTC + headroom,
        DateTime::<Utc>::MAX_UTC - headroom,
    )
}

fn utc_datetime(secs: i64) -> Option<DateTime<Utc>> {
    let (min, max) = bounds();
    DateTime::from_timestamp(secs, 0).filter(|utc| (min..=max).contains(utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch() {
        assert_eq!(
            Breakdown::from_secs(0, false),
            Ok(Breakdown {
                year: 1970,
                month: 1,
                day: 1,
                hour: 0,
                minute: 0,
                second: 0,
            })
        );
    }

    #[test]
    fn before_epoch() {
        assert_eq!(
            Breakdown::from_secs(-1, false),
            Ok(Breakdown {
                year: 1969,
                month: 12,
                day: 31,
                hour: 23,
                minute: 59,
                second: 59,
            })
        );
    }

    #[test]
    fn leap_day() {
        // 2024-02-29T12:34:56Z
        let fields = Breakdown::from_secs(1_709_210_096, false).unwrap();
        assert_eq!((fields.day, fields.month, fields.year), (29, 2, 2024));
        assert_eq!((fields.hour, fields.minute, fields.second), (12, 34, 56));
    }

    #[test]
    fn local_matches_chrono() {
        for &secs in &[0, 86_399, 1_000_000_000, 1_709_210_096, -86_400 * 365] {
            let expected = Local.timestamp_opt(secs, 0).unwrap();
            let got = Breakdown::from_secs(secs, true).unwrap();
            assert_eq!(got.year, expected.year(), "secs = {secs}");
            assert_eq!(got.month, expected.month(), "secs = {secs}");
            assert_eq!(got.day, expected.day(), "secs = {secs}");
            assert_eq!(got.hour, expected.hour(), "secs = {secs}");
            assert_eq!(got.minute, expected.minute(), "secs = {secs}");
            assert_eq!(got.second, expected.second(), "secs = {secs}");
        }
    }

    #[test]
    fn fixed_offset() {
        let ist = chrono_0p4::FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let epoch = utc_datetime(0).unwrap();
        assert_eq!(
            Breakdown::from_tz(&epoch, &ist),
            Breakdown {
                year: 1970,
                month: 1,
                day: 1,
                hour: 5,
                minute: 30,
                second: 0,
            }
        );

        let west = chrono_0p4::FixedOffset::west_opt(3600).unwrap();
        let fields = Breakdown::from_tz(&epoch, &west);
        assert_eq!((fields.day, fields.month, fields.year), (31, 12, 1969));
        assert_eq!((fields.hour, fields.minute, fields.second), (23, 0, 0));
    }

    #[test]
    fn local_flag_selects_local_zone() {
        for &secs in &[0, 1_000_000_000, 1_709_210_096] {
            let utc = utc_datetime(secs).unwrap();
            let local = Breakdown::from_secs(secs, true).unwrap();
            assert_eq!(local, Breakdown::from_tz(&utc, &Local), "secs = {secs}");
            assert_eq!(
                Breakdown::from_secs(secs, false).unwrap(),
                Breakdown::from_tz(&utc, &Utc),
                "secs = {secs}"
            );

            let offset = utc.with_timezone(&Local).offset().local_minus_utc();
            log::debug!("secs = {secs}, local offset = {offset}s");
            if offset != 0 {
                assert_ne!(local, Breakdown::from_secs(secs, false).unwrap());
            }
        }
    }

    #[test]
    fn out_of_range() {
        let _ = env_logger::builder().is_test(true).try_init();

        assert_eq!(Breakdown::from_secs(i64::MAX, false), Err(OutOfRangeError(())));
        assert_eq!(Breakdown::from_secs(i64::MIN, true), Err(OutOfRangeError(())));

        let max = Breakdown::from_secs_clamped(i64::MAX, false);
        assert!(max.year > 200_000, "{max:?}");
        let min = Breakdown::from_secs_clamped(i64::MIN, false);
        assert!(min.year < -200_000, "{min:?}");

        // Clamping must not fail for the local time zone either
        Breakdown::from_secs_clamped(i64::MAX, true);
        Breakdown::from_secs_clamped(i64::MIN, true);
    }

    #[test]
    fn clamped_in_range_is_exact() {
        for &secs in &[-1, 0, 90_061, 4_102_444_800] {
            assert_eq!(
                Ok(Breakdown::from_secs_clamped(secs, false)),
                Breakdown::from_secs(secs, false)
            );
        }
    }
}
