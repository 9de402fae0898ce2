use crate::{AsValue, Error, Result, Value};
use std::{collections::BTreeMap, sync::Arc};

/// Labels of a result set, shared by all of its rows.
pub type RowNames = Arc<[String]>;
/// Values of one row, in label order.
pub type Row = Box<[Value]>;

/// A row fetched by a select, each value paired with the projection alias it was selected as.
#[derive(Debug, Clone, PartialEq)]
pub struct RowLabeled {
    pub labels: RowNames,
    pub values: Row,
}

impl RowLabeled {
    pub fn new(labels: RowNames, values: Row) -> Self {
        Self { labels, values }
    }

    pub fn names(&self) -> &[String] {
        &self.labels
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get_column(&self, name: &str) -> Option<&Value> {
        let index = self.labels.iter().position(|v| v == name)?;
        self.values.get(index)
    }

    /// Value labelled `name` converted to `T`, `Ok(None)` when it is null.
    pub fn get<T: AsValue>(&self, name: &str) -> Result<Option<T>> {
        let value = self
            .get_column(name)
            .ok_or_else(|| Error::argument_bad_value("column", name))?;
        Option::<T>::try_from_value(value.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.labels.iter().map(String::as_str).zip(self.values.iter())
    }
}

impl From<RowLabeled> for Row {
    fn from(value: RowLabeled) -> Self {
        value.values
    }
}

/// Outcome of an insert, update or delete.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RowsAffected {
    pub rows_affected: u64,
    /// Columns reported by `RETURNING … INTO`, keyed by column name.
    pub returned: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn typed_access() {
        let row = RowLabeled::new(
            Arc::from(["ID".to_string(), "NAME".to_string()]),
            Box::new([Value::Numeric(5), Value::Null]),
        );
        assert_eq!(row.get::<i32>("ID").unwrap(), Some(5));
        assert_eq!(row.get::<String>("NAME").unwrap(), None);
        assert_eq!(
            row.get::<i32>("SALARY").unwrap_err().kind(),
            ErrorKind::ArgumentBadValue
        );
        assert_eq!(
            row.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            ["ID", "NAME"]
        );
    }
}
