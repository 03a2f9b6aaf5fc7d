//! Random values on demand, without a column descriptor.
//!
//! Every helper draws from the caller's RNG, so a seeded RNG gives
//! reproducible values. Integer ranges are half-open: `min` is included and
//! `max` is not.

use chrono::{Months, NaiveDate, NaiveDateTime, SubsecRound, TimeDelta};
use rand::Rng;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Characters used by [`string`].
pub const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
/// Widest total digit count [`decimal`] and [`double`] produce.
pub const MAX_NUMERIC_DIGITS: u32 = 18;
/// Length of the window [`date`] and [`date_time`] draw from.
pub const RECENT_WINDOW_MONTHS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnyError {
    #[error("empty range: {min}..{max}")]
    EmptyRange { min: String, max: String },
    #[error("precision must be positive")]
    ZeroPrecision,
    #[error("scale {scale} exceeds precision {precision}")]
    ScaleExceedsPrecision { precision: u32, scale: u32 },
}

fn empty_range(min: impl ToString, max: impl ToString) -> AnyError {
    AnyError::EmptyRange {
        min: min.to_string(),
        max: max.to_string(),
    }
}

/// String of exactly `length` characters from [`CHARSET`].
pub fn string<R: Rng + ?Sized>(length: usize, rng: &mut R) -> String {
    (0..length)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

pub fn int<R: Rng + ?Sized>(min: i32, max: i32, rng: &mut R) -> Result<i32, AnyError> {
    if min >= max {
        return Err(empty_range(min, max));
    }
    Ok(rng.random_range(min..max))
}

pub fn short<R: Rng + ?Sized>(min: i16, max: i16, rng: &mut R) -> Result<i16, AnyError> {
    if min >= max {
        return Err(empty_range(min, max));
    }
    Ok(rng.random_range(min..max))
}

pub fn long<R: Rng + ?Sized>(min: i64, max: i64, rng: &mut R) -> Result<i64, AnyError> {
    if min >= max {
        return Err(empty_range(min, max));
    }
    Ok(rng.random_range(min..max))
}

pub fn boolean<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.random_bool(0.5)
}

/// Version 4 UUID built from the RNG's bytes.
pub fn uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    let bytes: [u8; 16] = rng.random();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// Non-negative decimal with at most `precision - scale` integer digits and exactly `scale`
/// fractional digits.
pub fn decimal<R: Rng + ?Sized>(precision: u32, scale: u32, rng: &mut R) -> Result<Decimal, AnyError> {
    let (mantissa, scale) = fixed_point(precision, scale, rng)?;
    Ok(Decimal::new(mantissa, scale))
}

/// Like [`decimal`], as a float.
pub fn double<R: Rng + ?Sized>(precision: u32, scale: u32, rng: &mut R) -> Result<f64, AnyError> {
    let (mantissa, scale) = fixed_point(precision, scale, rng)?;
    Ok(mantissa as f64 / 10f64.powi(scale as i32))
}

fn fixed_point<R: Rng + ?Sized>(
    precision: u32,
    scale: u32,
    rng: &mut R,
) -> Result<(i64, u32), AnyError> {
    if precision == 0 {
        return Err(AnyError::ZeroPrecision);
    }
    if scale > precision {
        return Err(AnyError::ScaleExceedsPrecision { precision, scale });
    }

    let scale = scale.min(MAX_NUMERIC_DIGITS);
    let integer_digits = (precision - scale).min(MAX_NUMERIC_DIGITS - scale);
    let integer_part = rng.random_range(0..10i64.pow(integer_digits));
    let fraction = rng.random_range(0..10i64.pow(scale));
    Ok((integer_part * 10i64.pow(scale) + fraction, scale))
}

/// Calendar date in the window ending at `today`.
pub fn date<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> NaiveDate {
    let start = today
        .checked_sub_months(Months::new(RECENT_WINDOW_MONTHS))
        .unwrap_or(today);
    let days = (today - start).num_days();
    start + TimeDelta::days(rng.random_range(0..=days))
}

/// Whole-second timestamp in the window ending at `now`.
pub fn date_time<R: Rng + ?Sized>(now: NaiveDateTime, rng: &mut R) -> NaiveDateTime {
    let now = now.trunc_subsecs(0);
    let start = now
        .checked_sub_months(Months::new(RECENT_WINDOW_MONTHS))
        .unwrap_or(now);
    draw_seconds(start, now, rng)
}

/// Whole-second timestamp between `start` and `end`, both inclusive.
pub fn date_time_between<R: Rng + ?Sized>(
    start: NaiveDateTime,
    end: NaiveDateTime,
    rng: &mut R,
) -> Result<NaiveDateTime, AnyError> {
    let start = start.trunc_subsecs(0);
    let end = end.trunc_subsecs(0);
    if end < start {
        return Err(empty_range(start, end));
    }
    Ok(draw_seconds(start, end, rng))
}

fn draw_seconds<R: Rng + ?Sized>(
    start: NaiveDateTime,
    end: NaiveDateTime,
    rng: &mut R,
) -> NaiveDateTime {
    let seconds = (end - start).num_seconds();
    start + TimeDelta::seconds(rng.random_range(0..=seconds))
}

/// One of `choices`, or `None` when there are none.
pub fn pick<'a, T, R: Rng + ?Sized>(choices: &'a [T], rng: &mut R) -> Option<&'a T> {
    if choices.is_empty() {
        return None;
    }
    choices.get(rng.random_range(0..choices.len()))
}
