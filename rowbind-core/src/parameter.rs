use crate::{AsValue, Result, Value};
use rust_decimal::Decimal;
use std::fmt::{self, Display, Formatter};
use time::{Date, PrimitiveDateTime, Time};

/// Bind type declared for a positional parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Boolean,
    Integer,
    Numeric,
    Double,
    Float,
    Decimal,
    Date,
    Time,
    Timestamp,
    Varchar,
    Binary,
    Null,
}

impl ParameterType {
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ParameterType::Date | ParameterType::Time | ParameterType::Timestamp
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ParameterType::Integer
                | ParameterType::Numeric
                | ParameterType::Double
                | ParameterType::Float
                | ParameterType::Decimal
        )
    }
}

impl Display for ParameterType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParameterType::Boolean => "BOOLEAN",
            ParameterType::Integer => "INTEGER",
            ParameterType::Numeric => "NUMERIC",
            ParameterType::Double => "DOUBLE",
            ParameterType::Float => "FLOAT",
            ParameterType::Decimal => "DECIMAL",
            ParameterType::Date => "DATE",
            ParameterType::Time => "TIME",
            ParameterType::Timestamp => "TIMESTAMP",
            ParameterType::Varchar => "VARCHAR",
            ParameterType::Binary => "BINARY",
            ParameterType::Null => "NULL",
        })
    }
}

/// A typed value box: the declared bind type plus the value itself.
///
/// The declared type does not have to match the value variant, a boolean literal in a predicate for
/// example is bound as `VARCHAR` `"1"`/`"0"`. Accessors convert on demand and return `Ok(None)` for a
/// null value.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub ty: ParameterType,
    pub value: Value,
}

impl Parameter {
    pub fn new(ty: ParameterType, value: impl Into<Value>) -> Self {
        Self {
            ty,
            value: value.into(),
        }
    }

    /// Parameter whose type is the natural one of the value.
    pub fn from_value(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            ty: value.parameter_type(),
            value,
        }
    }

    /// Typed SQL NULL.
    pub fn null(ty: ParameterType) -> Self {
        Self {
            ty,
            value: Value::Null,
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Convert the value to `T`.
    pub fn get<T: AsValue>(&self) -> Result<Option<T>> {
        Option::<T>::try_from_value(self.value.clone())
    }

    pub fn boolean_value(&self) -> Result<Option<bool>> {
        self.get()
    }
    pub fn integer_value(&self) -> Result<Option<i32>> {
        self.get()
    }
    pub fn long_value(&self) -> Result<Option<i64>> {
        self.get()
    }
    pub fn double_value(&self) -> Result<Option<f64>> {
        self.get()
    }
    pub fn float_value(&self) -> Result<Option<f32>> {
        self.get()
    }
    pub fn decimal_value(&self) -> Result<Option<Decimal>> {
        self.get()
    }
    pub fn date_value(&self) -> Result<Option<Date>> {
        self.get()
    }
    pub fn time_value(&self) -> Result<Option<Time>> {
        self.get()
    }
    pub fn timestamp_value(&self) -> Result<Option<PrimitiveDateTime>> {
        self.get()
    }
    pub fn string_value(&self) -> Result<Option<String>> {
        self.get()
    }
    pub fn binary_value(&self) -> Result<Option<Box<[u8]>>> {
        self.get()
    }
}

impl Display for Parameter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.ty, self.value)
    }
}
