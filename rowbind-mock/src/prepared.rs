use crate::{Event, MockCursor, MockRows, Response, Shared};
use anyhow::{Result, anyhow, bail};
use rowbind_core::{ParameterType, Prepared, Value};
use rust_decimal::Decimal;
use std::time::Duration;
use time::{Date, PrimitiveDateTime, Time};

/// Prepared statement recording every call and answering from the script.
pub struct MockPrepared {
    shared: Shared,
    sql: String,
    closed: bool,
}

impl MockPrepared {
    pub(crate) fn new(shared: Shared, sql: String) -> Self {
        Self {
            shared,
            sql,
            closed: false,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    fn bind(&mut self, index: usize, ty: ParameterType, value: Value) -> Result<()> {
        if self.closed {
            bail!("Bind on a closed statement");
        }
        self.shared.record(Event::Bind { index, ty, value });
        Ok(())
    }
}

impl Prepared for MockPrepared {
    fn set_query_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.shared.record(Event::QueryTimeout(timeout));
        Ok(())
    }

    fn bind_boolean(&mut self, index: usize, value: bool) -> Result<()> {
        self.bind(index, ParameterType::Boolean, Value::Boolean(value))
    }
    fn bind_integer(&mut self, index: usize, value: i32) -> Result<()> {
        self.bind(index, ParameterType::Integer, Value::Integer(value))
    }
    fn bind_long(&mut self, index: usize, value: i64) -> Result<()> {
        self.bind(index, ParameterType::Numeric, Value::Numeric(value))
    }
    fn bind_double(&mut self, index: usize, value: f64) -> Result<()> {
        self.bind(index, ParameterType::Double, Value::Double(value))
    }
    fn bind_float(&mut self, index: usize, value: f32) -> Result<()> {
        self.bind(index, ParameterType::Float, Value::Float(value))
    }
    fn bind_decimal(&mut self, index: usize, value: Decimal) -> Result<()> {
        self.bind(index, ParameterType::Decimal, Value::Decimal(value))
    }
    fn bind_date(&mut self, index: usize, value: Date) -> Result<()> {
        self.bind(index, ParameterType::Date, Value::Date(value))
    }
    fn bind_time(&mut self, index: usize, value: Time) -> Result<()> {
        self.bind(index, ParameterType::Time, Value::Time(value))
    }
    fn bind_timestamp(&mut self, index: usize, value: PrimitiveDateTime) -> Result<()> {
        self.bind(index, ParameterType::Timestamp, Value::Timestamp(value))
    }
    fn bind_varchar(&mut self, index: usize, value: &str) -> Result<()> {
        self.bind(index, ParameterType::Varchar, Value::Varchar(value.into()))
    }
    fn bind_binary(&mut self, index: usize, value: &[u8]) -> Result<()> {
        self.bind(index, ParameterType::Binary, Value::Binary(value.into()))
    }
    fn bind_null(&mut self, index: usize, ty: ParameterType) -> Result<()> {
        self.bind(index, ty, Value::Null)
    }
    fn bind_object(&mut self, index: usize, value: &Value) -> Result<()> {
        self.bind(index, ParameterType::Null, value.clone())
    }

    fn register_return(&mut self, index: usize, ty: ParameterType) -> Result<()> {
        self.shared.record(Event::RegisterReturn { index, ty });
        Ok(())
    }

    fn execute_query(&mut self) -> Result<Box<dyn rowbind_core::Cursor>> {
        let response = {
            let mut state = self.shared.lock();
            state.events.push(Event::ExecuteQuery);
            state.responses.pop_front()
        };
        match response {
            Some(Response::Rows(rows)) => Ok(Box::new(MockCursor::new(self.shared.clone(), rows))),
            None => Ok(Box::new(MockCursor::new(
                self.shared.clone(),
                MockRows::default(),
            ))),
            Some(Response::Affected(..)) => Err(anyhow!("`{}` does not return rows", self.sql)),
            Some(Response::Failure(message)) => Err(anyhow!(message)),
        }
    }

    fn execute_update(&mut self) -> Result<u64> {
        let response = {
            let mut state = self.shared.lock();
            state.events.push(Event::ExecuteUpdate);
            state.responses.pop_front()
        };
        match response {
            Some(Response::Affected(rows)) => Ok(rows),
            None => Ok(0),
            Some(Response::Rows(..)) => Err(anyhow!("`{}` returns rows", self.sql)),
            Some(Response::Failure(message)) => Err(anyhow!(message)),
        }
    }

    fn returned(&mut self) -> Result<Box<dyn rowbind_core::Cursor>> {
        let values = self.shared.lock().returned.pop_front();
        let mut rows = MockRows::default();
        if let Some(values) = values {
            rows.labels = (1..=values.len()).map(|i| format!(":{}", i)).collect();
            rows.rows.push(values);
        }
        Ok(Box::new(MockCursor::new(self.shared.clone(), rows)))
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.shared.close(Event::ClosePrepared)
    }
}
