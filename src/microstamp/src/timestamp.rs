use core::{fmt, ops};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    breakdown::{Breakdown, OutOfRangeError},
    clock::{Clock, SystemClock},
    format::{Format, Formatted},
};

/// A point in time or a span of time with microsecond precision.
///
/// When used as an instant, the origin is the midnight UTC on January 1,
/// 1970 (a.k.a. “UNIX timestamp”). When used as a duration (e.g., the result
/// of subtracting two instants), it's the signed distance between them.
///
/// `Timestamp` is backed by `i64` and can represent about ±292,471 years
/// around the origin. The value is opaque: negative, zero, and very large
/// values are all valid.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct Timestamp {
    micros: i64,
}

impl Timestamp {
    /// Zero (the origin, or an empty interval).
    pub const ZERO: Self = Timestamp { micros: 0 };

    /// The smallest representable value.
    pub const MIN: Self = Timestamp { micros: i64::MIN };

    /// The largest representable value.
    pub const MAX: Self = Timestamp { micros: i64::MAX };

    /// Construct a new `Timestamp` from the specified number of microseconds.
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Self { micros }
    }

    /// Construct a new `Timestamp` from the specified number of milliseconds.
    ///
    /// # Panics
    ///
    /// Panics if `millis` overflows the representable range of `Timestamp`.
    #[inline]
    pub const fn from_millis(millis: i64) -> Self {
        match Self::checked_from_millis(millis) {
            Some(x) => x,
            None => panic!("timestamp overflow"),
        }
    }

    /// Construct a new `Timestamp` from the specified number of seconds.
    ///
    /// # Panics
    ///
    /// Panics if `secs` overflows the representable range of `Timestamp`.
    #[inline]
    pub const fn from_secs(secs: i64) -> Self {
        match Self::checked_from_secs(secs) {
            Some(x) => x,
            None => panic!("timestamp overflow"),
        }
    }

    /// Construct a new `Timestamp` from the specified number of milliseconds,
    /// returning `None` on overflow.
    #[inline]
    pub const fn checked_from_millis(millis: i64) -> Option<Self> {
        // `Option::map` is unusable in `const fn`
        if let Some(micros) = millis.checked_mul(1_000) {
            Some(Self::from_micros(micros))
        } else {
            None
        }
    }

    /// Construct a new `Timestamp` from the specified number of seconds,
    /// returning `None` on overflow.
    #[inline]
    pub const fn checked_from_secs(secs: i64) -> Option<Self> {
        if let Some(micros) = secs.checked_mul(1_000_000) {
            Some(Self::from_micros(micros))
        } else {
            None
        }
    }

    /// Sample the system wall clock.
    ///
    /// This is a plain reading of [`SystemClock`]. No monotonicity is
    /// enforced: two successive calls can go backwards if the system clock is
    /// adjusted in between.
    #[inline]
    pub fn now() -> Self {
        SystemClock.now()
    }

    /// Sample the specified clock.
    #[inline]
    pub fn now_from<C: Clock + ?Sized>(clock: &C) -> Self {
        clock.now()
    }

    /// Get the raw number of microseconds.
    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.micros
    }

    /// Get the number of whole milliseconds, truncated toward zero.
    #[inline]
    pub const fn as_millis(self) -> i64 {
        self.micros / 1_000
    }

    /// Get the number of whole seconds, truncated toward zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use microstamp::Timestamp;
    ///
    /// assert_eq!(Timestamp::from_micros(1_500_000).as_secs(), 1);
    /// assert_eq!(Timestamp::from_micros(-1_500_000).as_secs(), -1);
    /// ```
    #[inline]
    pub const fn as_secs(self) -> i64 {
        self.micros / 1_000_000
    }

    /// Get the milliseconds within the current second. The result has the
    /// same sign as `self`.
    #[inline]
    pub const fn subsec_millis(self) -> i64 {
        self.as_millis() - self.as_secs() * 1_000
    }

    /// Get the microseconds within the current millisecond. The result has
    /// the same sign as `self`.
    #[inline]
    pub const fn submilli_micros(self) -> i64 {
        self.micros - self.as_millis() * 1_000
    }

    /// Get the value as a number of seconds in `f64`.
    ///
    /// Large magnitudes are subject to rounding.
    ///
    /// # Examples
    ///
    /// ```
    /// use microstamp::Timestamp;
    ///
    /// let dur = Timestamp::from_micros(1_201_250_000);
    /// assert_eq!(dur.duration_seconds(), 1201.25);
    /// ```
    #[inline]
    pub fn duration_seconds(self) -> f64 {
        self.micros as f64 / 1_000_000.0
    }

    /// Get the value as a number of seconds in `f32`.
    ///
    /// # Examples
    ///
    /// ```
    /// use microstamp::Timestamp;
    ///
    /// let dur = Timestamp::from_micros(1_201_250_000);
    /// assert_eq!(dur.duration_seconds_f32(), 1201.25);
    /// ```
    #[inline]
    pub fn duration_seconds_f32(self) -> f32 {
        // An integer larger than 16777216 can't be converted to `f32`
        // accurately. Convert the integral and fractional parts separately so
        // that whole seconds survive the conversion.
        (self.micros / 1_000_000) as f32 + (self.micros % 1_000_000) as f32 / 1_000_000.0
    }

    /// Return `true` if and only if the raw value is exactly zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.micros == 0
    }

    /// Return `true` if and only if `self` is positive.
    #[inline]
    pub const fn is_positive(self) -> bool {
        self.micros.is_positive()
    }

    /// Return `true` if and only if `self` is negative.
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.micros.is_negative()
    }

    /// Add `other` to `self`, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        if let Some(x) = self.micros.checked_add(other.micros) {
            Some(Self::from_micros(x))
        } else {
            None
        }
    }

    /// Subtract `other` from `self`, returning `None` on overflow.
    #[inline]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        if let Some(x) = self.micros.checked_sub(other.micros) {
            Some(Self::from_micros(x))
        } else {
            None
        }
    }

    /// Add `other` to `self`, wrapping around on overflow.
    #[inline]
    pub const fn wrapping_add(self, other: Self) -> Self {
        Self::from_micros(self.micros.wrapping_add(other.micros))
    }

    /// Subtract `other` from `self`, wrapping around on overflow.
    #[inline]
    pub const fn wrapping_sub(self, other: Self) -> Self {
        Self::from_micros(self.micros.wrapping_sub(other.micros))
    }

    /// Get the span from `first` to `second`, i.e., `second - first`. The
    /// result is positive if `second` is later than `first`.
    ///
    /// # Examples
    ///
    /// ```
    /// use microstamp::Timestamp;
    ///
    /// let start = Timestamp::from_secs(10);
    /// let end = Timestamp::from_secs(12);
    /// assert_eq!(Timestamp::duration_between(start, end), Timestamp::from_secs(2));
    /// assert_eq!(Timestamp::duration_between(end, start), Timestamp::from_secs(-2));
    /// ```
    #[inline]
    pub const fn duration_between(first: Self, second: Self) -> Self {
        second.wrapping_sub(first)
    }

    /// Get the span from `first` to `second` in seconds.
    #[inline]
    pub fn elapsed_seconds(first: Self, second: Self) -> f64 {
        Self::duration_between(first, second).duration_seconds()
    }

    /// Get `self` as [`core::time::Duration`]. Returns `None` if `self` is
    /// negative.
    #[inline]
    pub const fn to_core_duration(self) -> Option<core::time::Duration> {
        if self.micros < 0 {
            None
        } else {
            Some(core::time::Duration::from_micros(self.micros as u64))
        }
    }

    /// Break the whole seconds of `self` down into calendar fields, either in
    /// the local time zone (`local == true`) or in UTC.
    #[inline]
    pub fn breakdown(self, local: bool) -> Result<Breakdown, OutOfRangeError> {
        Breakdown::from_secs(self.as_secs(), local)
    }

    /// Get an object that renders the components of `self` selected by
    /// `format`, either in the local time zone (`local == true`) or in UTC.
    ///
    /// Instants outside the calendar range are clamped to its nearest end
    /// for the date and time components.
    #[inline]
    pub const fn formatted(self, format: Format, local: bool) -> Formatted {
        Formatted::new(self, format, local)
    }

    /// Render the components of `self` selected by `format`. See
    /// [`Self::formatted`].
    ///
    /// # Examples
    ///
    /// ```
    /// use microstamp::{Format, Timestamp};
    ///
    /// let ts = Timestamp::from_micros(90_061_002_500);
    /// assert_eq!(ts.to_string_with(Format::DATE, false), "[2/1/1970]");
    /// assert_eq!(ts.to_string_with(Format::TIME_MS, false), "1:1:1.2");
    /// assert_eq!(ts.to_string_with(Format::ALL, false), "[2/1/1970] 1:1:1.2[500]");
    /// ```
    pub fn to_string_with(self, format: Format, local: bool) -> String {
        self.formatted(format, local).to_string()
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let abs_dur = core::time::Duration::from_micros(self.micros.unsigned_abs());
        if self.micros < 0 {
            write!(f, "-")?;
        }
        fmt::Debug::fmt(&abs_dur, f)
    }
}

impl fmt::Display for Timestamp {
    /// Render `self` with [`Format::DATETIME`] in UTC.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.formatted(Format::default(), false), f)
    }
}

impl ops::Sub for Timestamp {
    type Output = Self;

    /// Subtract `rhs` from `self`, wrapping around on overflow.
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.wrapping_sub(rhs)
    }
}

impl ops::SubAssign for Timestamp {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl ops::Add for Timestamp {
    type Output = Self;

    /// Add `rhs` to `self`, wrapping around on overflow.
    #[inline]
    fn add(self, rhs: Self) -> Self::Output {
        self.wrapping_add(rhs)
    }
}

impl ops::AddAssign for Timestamp {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl ops::Neg for Timestamp {
    type Output = Self;

    /// Negate `self`. [`Timestamp::MIN`] maps to itself.
    #[inline]
    fn neg(self) -> Self::Output {
        Self::from_micros(self.micros.wrapping_neg())
    }
}

impl PartialEq<i64> for Timestamp {
    /// Compare the raw number of microseconds.
    #[inline]
    fn eq(&self, other: &i64) -> bool {
        self.micros == *other
    }
}

impl PartialEq<Timestamp> for i64 {
    #[inline]
    fn eq(&self, other: &Timestamp) -> bool {
        *self == other.micros
    }
}

impl PartialEq<i32> for Timestamp {
    /// Compare the raw number of microseconds.
    #[inline]
    fn eq(&self, other: &i32) -> bool {
        self.micros == i64::from(*other)
    }
}

impl PartialEq<Timestamp> for i32 {
    #[inline]
    fn eq(&self, other: &Timestamp) -> bool {
        i64::from(*self) == other.micros
    }
}

impl PartialEq<f64> for Timestamp {
    /// Compare [`Timestamp::duration_seconds`] for exact equality. No
    /// tolerance is applied, so computed durations rarely compare equal.
    #[inline]
    fn eq(&self, other: &f64) -> bool {
        self.duration_seconds() == *other
    }
}

impl PartialEq<Timestamp> for f64 {
    #[inline]
    fn eq(&self, other: &Timestamp) -> bool {
        *self == other.duration_seconds()
    }
}

impl PartialEq<f32> for Timestamp {
    /// Compare [`Timestamp::duration_seconds_f32`] for exact equality. No
    /// tolerance is applied, so computed durations rarely compare equal.
    #[inline]
    fn eq(&self, other: &f32) -> bool {
        self.duration_seconds_f32() == *other
    }
}

impl PartialEq<Timestamp> for f32 {
    #[inline]
    fn eq(&self, other: &Timestamp) -> bool {
        *self == other.duration_seconds_f32()
    }
}

impl From<i64> for Timestamp {
    #[inline]
    fn from(micros: i64) -> Self {
        Self::from_micros(micros)
    }
}

impl From<Timestamp> for i64 {
    #[inline]
    fn from(value: Timestamp) -> Self {
        value.micros
    }
}

/// Error type returned when a checked duration type conversion fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryFromDurationError(());

impl fmt::Display for TryFromDurationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("duration is out of the range of `Timestamp`")
    }
}

impl std::error::Error for TryFromDurationError {}

/// Error type returned when a [`SystemTime`] can't be converted to
/// [`Timestamp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TryFromSystemTimeError(());

impl fmt::Display for TryFromSystemTimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("system time is out of the range of `Timestamp`")
    }
}

impl std::error::Error for TryFromSystemTimeError {}

impl TryFrom<core::time::Duration> for Timestamp {
    type Error = TryFromDurationError;

    /// Try to construct a `Timestamp` from the specified
    /// `core::time::Duration`. Returns an error if the specified `Duration`
    /// overflows the representable range of the destination type.
    ///
    /// The sub-microsecond part is rounded by truncating.
    fn try_from(value: core::time::Duration) -> Result<Self, Self::Error> {
        Ok(Self::from_micros(
            value
                .as_micros()
                .try_into()
                .map_err(|_| TryFromDurationError(()))?,
        ))
    }
}

impl TryFrom<SystemTime> for Timestamp {
    type Error = TryFromSystemTimeError;

    /// Try to construct a `Timestamp` from the specified `SystemTime`.
    ///
    /// The sub-microsecond part is rounded toward the epoch.
    fn try_from(value: SystemTime) -> Result<Self, Self::Error> {
        let (since_epoch, negative) = match value.duration_since(UNIX_EPOCH) {
            Ok(x) => (x, false),
            Err(e) => (e.duration(), true),
        };
        let micros: i64 = since_epoch
            .as_micros()
            .try_into()
            .map_err(|_| TryFromSystemTimeError(()))?;
        Ok(Self::from_micros(if negative { -micros } else { micros }))
    }
}

impl TryFrom<chrono_0p4::DateTime<chrono_0p4::Utc>> for Timestamp {
    type Error = OutOfRangeError;

    /// Try to construct a `Timestamp` from the specified
    /// `chrono::DateTime<Utc>`. Returns an error if the specified `DateTime`
    /// overflows the representable range of the destination type.
    ///
    /// The sub-microsecond part is rounded by truncating.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_0p4::{DateTime, Utc};
    /// use microstamp::Timestamp;
    /// assert_eq!(
    ///     Timestamp::try_from(DateTime::from_timestamp(4, 123_456).unwrap()),
    ///     Ok(Timestamp::from_micros(4_000_123)),
    /// );
    /// assert_eq!(
    ///     Timestamp::try_from(DateTime::from_timestamp(-1, 500_000_000).unwrap()),
    ///     Ok(Timestamp::from_micros(-500_000)),
    /// );
    /// ```
    fn try_from(value: chrono_0p4::DateTime<chrono_0p4::Utc>) -> Result<Self, Self::Error> {
        let micros = i64::from(value.timestamp_subsec_micros());
        value
            .timestamp()
            .checked_mul(1_000_000)
            .and_then(|x| x.checked_add(micros))
            .map(Self::from_micros)
            .ok_or(OutOfRangeError(()))
    }
}

impl TryFrom<Timestamp> for chrono_0p4::DateTime<chrono_0p4::Utc> {
    type Error = OutOfRangeError;

    /// Try to construct a `chrono::DateTime<Utc>` from the specified
    /// `Timestamp`. Returns an error if the specified `Timestamp` overflows
    /// the representable range of the destination type.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono_0p4::{DateTime, Utc};
    /// use microstamp::Timestamp;
    /// assert_eq!(
    ///     DateTime::<Utc>::try_from(Timestamp::from_micros(123_456_789)),
    ///     Ok(DateTime::from_timestamp(123, 456_789_000).unwrap()),
    /// );
    /// assert!(DateTime::<Utc>::try_from(Timestamp::MAX).is_err());
    /// ```
    fn try_from(value: Timestamp) -> Result<Self, Self::Error> {
        Self::from_timestamp(
            value.micros.div_euclid(1_000_000),
            value.micros.rem_euclid(1_000_000) as u32 * 1_000,
        )
        .ok_or(OutOfRangeError(()))
    }
}

impl TryFrom<chrono_0p4::Duration> for Timestamp {
    type Error = TryFromDurationError;

    /// Try to construct a `Timestamp` from the specified `chrono::Duration`.
    /// Returns an error if the specified `Duration` overflows the
    /// representable range of the destination type.
    ///
    /// The sub-microsecond part is rounded by truncating.
    fn try_from(value: chrono_0p4::Duration) -> Result<Self, Self::Error> {
        value
            .num_microseconds()
            .map(Self::from_micros)
            .ok_or(TryFromDurationError(()))
    }
}

impl From<Timestamp> for chrono_0p4::Duration {
    /// Construct a `chrono::Duration` from the specified `Timestamp`.
    fn from(value: Timestamp) -> Self {
        Self::microseconds(value.micros)
    }
}
