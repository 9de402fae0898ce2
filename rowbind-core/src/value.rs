use crate::{Error, ParameterType, Result};
use atoi::FromRadix10SignedChecked;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::{
    any,
    fmt::{self, Display, Formatter},
    str::FromStr,
};
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
    format_description::BorrowedFormatItem, macros::format_description,
};

/// A SQL value as it travels between statements and the driver.
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i32),
    Numeric(i64),
    Double(f64),
    Float(f32),
    Decimal(Decimal),
    Date(Date),
    Time(Time),
    Timestamp(PrimitiveDateTime),
    Varchar(String),
    Binary(Box<[u8]>),
}

const DATE_FORMATS: &[&[BorrowedFormatItem<'static>]] =
    &[format_description!("[year]-[month]-[day]")];
const TIME_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[hour]:[minute]:[second].[subsecond]"),
    format_description!("[hour]:[minute]:[second]"),
    format_description!("[hour]:[minute]"),
];
const TIMESTAMP_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
];

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The bind type naturally associated with this value.
    pub fn parameter_type(&self) -> ParameterType {
        match self {
            Value::Null => ParameterType::Null,
            Value::Boolean(..) => ParameterType::Boolean,
            Value::Integer(..) => ParameterType::Integer,
            Value::Numeric(..) => ParameterType::Numeric,
            Value::Double(..) => ParameterType::Double,
            Value::Float(..) => ParameterType::Float,
            Value::Decimal(..) => ParameterType::Decimal,
            Value::Date(..) => ParameterType::Date,
            Value::Time(..) => ParameterType::Time,
            Value::Timestamp(..) => ParameterType::Timestamp,
            Value::Varchar(..) => ParameterType::Varchar,
            Value::Binary(..) => ParameterType::Binary,
        }
    }

    /// Milliseconds elapsed since the Unix epoch, for temporal values.
    pub fn epoch_millis(&self) -> Option<i64> {
        let timestamp = match self {
            Value::Date(v) => v.midnight(),
            Value::Time(v) => PrimitiveDateTime::new(Date::from_ordinal_date(1970, 1).ok()?, *v),
            Value::Timestamp(v) => *v,
            _ => return None,
        };
        let nanos = timestamp.assume_utc().unix_timestamp_nanos();
        i64::try_from(nanos / 1_000_000).ok()
    }
}

fn write_time(f: &mut Formatter<'_>, value: &Time) -> fmt::Result {
    write!(
        f,
        "{:02}:{:02}:{:02}",
        value.hour(),
        value.minute(),
        value.second()
    )?;
    let mut subsecond = value.nanosecond();
    if subsecond != 0 {
        let mut width = 9;
        while subsecond % 10 == 0 {
            subsecond /= 10;
            width -= 1;
        }
        write!(f, ".{:0width$}", subsecond)?;
    }
    Ok(())
}

fn write_date(f: &mut Formatter<'_>, value: &Date) -> fmt::Result {
    write!(
        f,
        "{:04}-{:02}-{:02}",
        value.year(),
        value.month() as u8,
        value.day()
    )
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => f.write_str(["false", "true"][*v as usize]),
            Value::Integer(v) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::Numeric(v) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::Double(v) => f.write_str(ryu::Buffer::new().format(*v)),
            Value::Float(v) => f.write_str(ryu::Buffer::new().format(*v)),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Date(v) => write_date(f, v),
            Value::Time(v) => write_time(f, v),
            Value::Timestamp(v) => {
                write_date(f, &v.date())?;
                f.write_str(" ")?;
                write_time(f, &v.time())
            }
            Value::Varchar(v) => f.write_str(v),
            Value::Binary(v) => f.write_str(&hex::encode_upper(v)),
        }
    }
}

/// Conversion between native Rust types and [`Value`].
///
/// `try_from_value` accepts the canonical variant for the type and, where it is lossless or
/// customary for SQL drivers, the neighbouring variants (numeric widening, textual forms).
/// A `Value::Null` is always a type mismatch here, nullability is handled by `Option<T>`.
pub trait AsValue {
    fn as_value(self) -> Value;
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(value.into())
    }
}

fn mismatch<T>(value: Value) -> Error {
    Error::type_mismatch(value, any::type_name::<T>())
}

fn parse_integer<T: FromRadix10SignedChecked>(value: &str) -> Option<T> {
    let trimmed = value.trim();
    match T::from_radix_10_signed_checked(trimmed.as_bytes()) {
        (Some(v), len) if len == trimmed.len() && len > 0 => Some(v),
        _ => None,
    }
}

fn parse_float<T: fast_float::FastFloat>(value: &str) -> Option<T> {
    let trimmed = value.trim();
    match fast_float::parse_partial::<T, _>(trimmed) {
        Ok((v, len)) if len == trimmed.len() => Some(v),
        _ => None,
    }
}

fn parse_date(value: &str) -> Option<Date> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| Date::parse(value, *format).ok())
        .or_else(|| parse_timestamp(value).map(|v| v.date()))
}

fn parse_time(value: &str) -> Option<Time> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| Time::parse(value, *format).ok())
}

fn parse_timestamp(value: &str) -> Option<PrimitiveDateTime> {
    let value = value.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(value, *format).ok())
}

fn from_epoch_millis(millis: i64) -> Option<PrimitiveDateTime> {
    let instant = OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000).ok()?;
    Some(PrimitiveDateTime::new(instant.date(), instant.time()))
}

impl AsValue for bool {
    fn as_value(self) -> Value {
        Value::Boolean(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(v) => Ok(v),
            Value::Integer(v) => Ok(v != 0),
            Value::Numeric(v) => Ok(v != 0),
            Value::Varchar(ref v) => match v.trim() {
                "1" => Ok(true),
                "0" => Ok(false),
                v if v.eq_ignore_ascii_case("true") => Ok(true),
                v if v.eq_ignore_ascii_case("false") => Ok(false),
                _ => Err(mismatch::<Self>(value)),
            },
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

macro_rules! impl_as_value_integer {
    ($source:ty, $variant:path, $wide:ty) => {
        impl AsValue for $source {
            fn as_value(self) -> Value {
                $variant(self.into())
            }
            fn try_from_value(value: Value) -> Result<Self> {
                let converted = match &value {
                    Value::Integer(v) => Self::try_from(*v).ok(),
                    Value::Numeric(v) => Self::try_from(*v).ok(),
                    Value::Decimal(v) if v.fract().is_zero() => {
                        v.to_i64().and_then(|v| Self::try_from(v).ok())
                    }
                    Value::Double(v) if v.fract() == 0.0 => {
                        <$wide>::from_f64(*v).and_then(|v| Self::try_from(v).ok())
                    }
                    Value::Float(v) if v.fract() == 0.0 => {
                        <$wide>::from_f32(*v).and_then(|v| Self::try_from(v).ok())
                    }
                    Value::Varchar(v) => parse_integer::<Self>(v),
                    _ => None,
                };
                converted.ok_or_else(|| mismatch::<Self>(value))
            }
        }
    };
}
impl_as_value_integer!(i16, Value::Integer, i32);
impl_as_value_integer!(i32, Value::Integer, i32);
impl_as_value_integer!(i64, Value::Numeric, i64);
impl_as_value_integer!(u32, Value::Numeric, i64);

impl AsValue for f64 {
    fn as_value(self) -> Value {
        Value::Double(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Double(v) => Some(*v),
            Value::Float(v) => Some(*v as f64),
            Value::Integer(v) => Some(*v as f64),
            Value::Numeric(v) => Some(*v as f64),
            Value::Decimal(v) => v.to_f64(),
            Value::Varchar(v) => parse_float::<f64>(v),
            _ => None,
        };
        converted.ok_or_else(|| mismatch::<Self>(value))
    }
}

impl AsValue for f32 {
    fn as_value(self) -> Value {
        Value::Float(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Float(v) => Some(*v),
            Value::Double(v) => Some(*v as f32),
            Value::Integer(v) => Some(*v as f32),
            Value::Numeric(v) => Some(*v as f32),
            Value::Decimal(v) => v.to_f32(),
            Value::Varchar(v) => parse_float::<f32>(v),
            _ => None,
        };
        converted.ok_or_else(|| mismatch::<Self>(value))
    }
}

impl AsValue for Decimal {
    fn as_value(self) -> Value {
        Value::Decimal(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Decimal(v) => Some(*v),
            Value::Integer(v) => Some(Decimal::from(*v)),
            Value::Numeric(v) => Some(Decimal::from(*v)),
            Value::Double(v) => Decimal::from_f64(*v),
            Value::Float(v) => Decimal::from_f32(*v),
            Value::Varchar(v) => Decimal::from_str(v.trim()).ok(),
            _ => None,
        };
        converted.ok_or_else(|| mismatch::<Self>(value))
    }
}

impl AsValue for String {
    fn as_value(self) -> Value {
        Value::Varchar(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(v) => Ok(v),
            Value::Null => Err(mismatch::<Self>(value)),
            v => Ok(v.to_string()),
        }
    }
}

impl AsValue for Box<[u8]> {
    fn as_value(self) -> Value {
        Value::Binary(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Binary(v) => Ok(v),
            Value::Varchar(v) => Ok(v.into_bytes().into_boxed_slice()),
            v => Err(mismatch::<Self>(v)),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_value(self) -> Value {
        Value::Binary(self.into_boxed_slice())
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Box::<[u8]>::try_from_value(value).map(Into::into)
    }
}

impl AsValue for Date {
    fn as_value(self) -> Value {
        Value::Date(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Date(v) => Some(*v),
            Value::Timestamp(v) => Some(v.date()),
            Value::Varchar(v) => parse_date(v),
            _ => None,
        };
        converted.ok_or_else(|| mismatch::<Self>(value))
    }
}

impl AsValue for Time {
    fn as_value(self) -> Value {
        Value::Time(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Time(v) => Some(*v),
            Value::Timestamp(v) => Some(v.time()),
            Value::Varchar(v) => parse_time(v),
            _ => None,
        };
        converted.ok_or_else(|| mismatch::<Self>(value))
    }
}

impl AsValue for PrimitiveDateTime {
    fn as_value(self) -> Value {
        Value::Timestamp(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        let converted = match &value {
            Value::Timestamp(v) => Some(*v),
            Value::Date(..) | Value::Time(..) => value.epoch_millis().and_then(from_epoch_millis),
            // Integral values are milliseconds since the epoch
            Value::Numeric(v) => from_epoch_millis(*v),
            Value::Varchar(v) => parse_timestamp(v).or_else(|| parse_date(v).map(|v| v.midnight())),
            _ => None,
        };
        converted.ok_or_else(|| mismatch::<Self>(value))
    }
}

impl AsValue for OffsetDateTime {
    fn as_value(self) -> Value {
        let utc = self.to_offset(UtcOffset::UTC);
        Value::Timestamp(PrimitiveDateTime::new(utc.date(), utc.time()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        PrimitiveDateTime::try_from_value(value).map(PrimitiveDateTime::assume_utc)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => Value::Null,
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::try_from_value(value).map(Some)
        }
    }
}
