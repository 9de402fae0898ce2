use crate::{DriverResult, ParameterType, Resource, SqlWriter, Value};
use rust_decimal::Decimal;
use std::time::Duration;
use time::{Date, PrimitiveDateTime, Time};

/// Why a connection attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Transient failure, the attempt can be repeated.
    #[error("{0:#}")]
    Recoverable(anyhow::Error),
    /// Repeating the attempt would not help (bad credentials, unknown database, ...).
    #[error("{0:#}")]
    Fatal(anyhow::Error),
}

/// Entry point of a database driver.
pub trait Driver {
    /// Open a connection to `resource`, giving up the login after `login_timeout`.
    fn connect(
        &self,
        resource: &Resource,
        login_timeout: Duration,
    ) -> Result<Box<dyn Connection>, ConnectError>;
}

/// An open session with the database.
pub trait Connection: Send {
    /// Dialect used to compile the statements run on this connection.
    fn sql_writer(&self) -> &dyn SqlWriter;

    fn prepare(&mut self, sql: &str) -> DriverResult<Box<dyn Prepared>>;

    fn set_auto_commit(&mut self, auto_commit: bool) -> DriverResult<()>;

    fn set_catalog(&mut self, catalog: &str) -> DriverResult<()>;

    fn commit(&mut self) -> DriverResult<()>;

    fn rollback(&mut self) -> DriverResult<()>;

    fn close(&mut self) -> DriverResult<()>;

    fn is_closed(&self) -> DriverResult<bool>;
}

/// A prepared statement handle.
///
/// Positions are counted from 0 in placeholder order. Output positions registered with
/// `register_return` follow the input ones.
pub trait Prepared: Send {
    fn set_query_timeout(&mut self, timeout: Duration) -> DriverResult<()>;

    fn bind_boolean(&mut self, index: usize, value: bool) -> DriverResult<()>;
    fn bind_integer(&mut self, index: usize, value: i32) -> DriverResult<()>;
    fn bind_long(&mut self, index: usize, value: i64) -> DriverResult<()>;
    fn bind_double(&mut self, index: usize, value: f64) -> DriverResult<()>;
    fn bind_float(&mut self, index: usize, value: f32) -> DriverResult<()>;
    fn bind_decimal(&mut self, index: usize, value: Decimal) -> DriverResult<()>;
    fn bind_date(&mut self, index: usize, value: Date) -> DriverResult<()>;
    fn bind_time(&mut self, index: usize, value: Time) -> DriverResult<()>;
    fn bind_timestamp(&mut self, index: usize, value: PrimitiveDateTime) -> DriverResult<()>;
    fn bind_varchar(&mut self, index: usize, value: &str) -> DriverResult<()>;
    fn bind_binary(&mut self, index: usize, value: &[u8]) -> DriverResult<()>;
    fn bind_null(&mut self, index: usize, ty: ParameterType) -> DriverResult<()>;
    /// Generic binder, the driver picks the SQL type from the value.
    fn bind_object(&mut self, index: usize, value: &Value) -> DriverResult<()>;

    /// Declare `index` as an output position of type `ty`.
    fn register_return(&mut self, index: usize, ty: ParameterType) -> DriverResult<()>;

    fn execute_query(&mut self) -> DriverResult<Box<dyn Cursor>>;

    /// Returns the number of affected rows.
    fn execute_update(&mut self) -> DriverResult<u64>;

    /// Values of the registered output positions after `execute_update`.
    fn returned(&mut self) -> DriverResult<Box<dyn Cursor>>;

    fn close(&mut self) -> DriverResult<()>;
}

/// Forward only cursor over a result set.
pub trait Cursor: Send {
    /// Advance to the next row, `false` when there are no more rows.
    fn next(&mut self) -> DriverResult<bool>;

    /// Value of the column labelled `column` in the current row.
    fn get(&self, column: &str) -> DriverResult<Value>;

    /// Value of the column at `index` (from 0) in the current row.
    fn get_index(&self, index: usize) -> DriverResult<Value>;

    fn close(&mut self) -> DriverResult<()>;
}
