use super::statement::driver_error;
use crate::{
    AsValue, Error, ErrorKind, Parameter, ParameterType, Prepared, Result, Value,
    util::log_close_error,
};
use rust_decimal::Decimal;
use std::{borrow::Cow, collections::BTreeMap};
use time::PrimitiveDateTime;

/// A value assigned to a column by INSERT or UPDATE.
///
/// `name` is either a projection alias or a column name of the target entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: Cow<'static, str>,
    pub parameter: Parameter,
}

impl Binding {
    /// Bind `value` with its natural type.
    pub fn new(name: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            parameter: Parameter::from_value(value),
        }
    }

    pub fn typed(
        name: impl Into<Cow<'static, str>>,
        ty: ParameterType,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            parameter: Parameter::new(ty, value),
        }
    }

    /// Set the column to a typed SQL NULL.
    pub fn null(name: impl Into<Cow<'static, str>>, ty: ParameterType) -> Self {
        Self {
            name: name.into(),
            parameter: Parameter::null(ty),
        }
    }
}

/// Column reported back by a `RETURNING … INTO` clause, with the type of its output position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Returning {
    pub column: Cow<'static, str>,
    pub ty: ParameterType,
}

impl Returning {
    pub fn new(column: impl Into<Cow<'static, str>>, ty: ParameterType) -> Self {
        Self {
            column: column.into(),
            ty,
        }
    }
}

impl<C: Into<Cow<'static, str>>> From<(C, ParameterType)> for Returning {
    fn from((column, ty): (C, ParameterType)) -> Self {
        Returning::new(column, ty)
    }
}

/// Bindings and returning columns shared by INSERT and UPDATE.
#[derive(Default, Debug, Clone)]
pub(crate) struct Modify {
    pub(crate) bindings: Vec<Binding>,
    pub(crate) returning: Vec<Returning>,
}

impl Modify {
    pub(crate) fn new(bindings: impl IntoIterator<Item = Binding>) -> Self {
        Self {
            bindings: bindings.into_iter().collect(),
            returning: Vec::new(),
        }
    }

    pub(crate) fn returning_columns(&self) -> Vec<Cow<'static, str>> {
        self.returning.iter().map(|v| v.column.clone()).collect()
    }

    /// Declare one output position per returning column, starting at `start`.
    pub(crate) fn register_returning(&self, handle: &mut dyn Prepared, start: usize) -> Result<()> {
        for (i, returning) in self.returning.iter().enumerate() {
            handle
                .register_return(start + i, returning.ty)
                .map_err(driver_error)?;
        }
        Ok(())
    }

    /// Read the output positions after the update, keyed by column.
    ///
    /// Declared columns with no returned row are a driver failure.
    pub(crate) fn returned(&self, handle: &mut dyn Prepared) -> Result<BTreeMap<String, Value>> {
        let mut result = BTreeMap::new();
        if self.returning.is_empty() {
            return Ok(result);
        }
        let mut cursor = handle.returned().map_err(driver_error)?;
        let decoded = (|| -> Result<()> {
            if !cursor.next().map_err(driver_error)? {
                return Err(Error::new(
                    ErrorKind::Driver,
                    format!(
                        "The driver reported no value for the returning columns {}",
                        self.returning_columns().join(", ")
                    ),
                ));
            }
            for (i, returning) in self.returning.iter().enumerate() {
                let value = cursor.get_index(i).map_err(driver_error)?;
                result.insert(
                    returning.column.to_string(),
                    decode_returned(returning.ty, value)?,
                );
            }
            Ok(())
        })();
        log_close_error(cursor.close(), "returned values cursor");
        decoded.map(|_| result)
    }
}

/// Normalize a value read from an output position of type `ty`.
///
/// Binary becomes its uppercase hex text, temporal types become a timestamp and numeric types are
/// coerced to the declared one. Anything else is kept as the driver returned it.
pub fn decode_returned(ty: ParameterType, value: Value) -> Result<Value> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    Ok(match ty {
        ParameterType::Binary => match value {
            Value::Binary(v) => Value::Varchar(hex::encode_upper(v)),
            v => v,
        },
        ParameterType::Date | ParameterType::Time | ParameterType::Timestamp => {
            PrimitiveDateTime::try_from_value(value)?.as_value()
        }
        ParameterType::Integer => i32::try_from_value(value)?.as_value(),
        ParameterType::Numeric => i64::try_from_value(value)?.as_value(),
        ParameterType::Double => f64::try_from_value(value)?.as_value(),
        ParameterType::Float => f32::try_from_value(value)?.as_value(),
        ParameterType::Decimal => Decimal::try_from_value(value)?.as_value(),
        _ => value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn decode() {
        assert_eq!(
            decode_returned(ParameterType::Binary, Value::Binary(Box::new([0xAB, 0x01]))).unwrap(),
            Value::Varchar("AB01".into())
        );
        assert_eq!(
            decode_returned(ParameterType::Date, Value::Date(date!(2020 - 05 - 01))).unwrap(),
            Value::Timestamp(datetime!(2020-05-01 0:00))
        );
        assert_eq!(
            decode_returned(ParameterType::Numeric, Value::Integer(7)).unwrap(),
            Value::Numeric(7)
        );
        assert_eq!(
            decode_returned(ParameterType::Varchar, Value::Integer(7)).unwrap(),
            Value::Integer(7)
        );
        assert_eq!(
            decode_returned(ParameterType::Integer, Value::Null).unwrap(),
            Value::Null
        );
        assert!(decode_returned(ParameterType::Integer, Value::Varchar("x".into())).is_err());
    }

    #[test]
    fn binding_types() {
        assert_eq!(Binding::new("ID", 3).parameter.ty, ParameterType::Integer);
        let binding = Binding::null("NAME", ParameterType::Varchar);
        assert!(binding.parameter.is_null());
        assert_eq!(binding.parameter.ty, ParameterType::Varchar);
        let returning: Returning = ("ID", ParameterType::Numeric).into();
        assert_eq!(returning.column, "ID");
    }
}
