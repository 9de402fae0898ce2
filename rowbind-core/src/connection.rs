use crate::{
    AsValue, ConnectError, Connection, Driver, Error, Resource, Result, error::driver_error,
    util::log_close_error,
};
use std::{thread, time::Duration};
use time::{PrimitiveDateTime, macros::datetime};

/// Waits between two connection attempts.
pub trait Backoff {
    /// Block for `interval`. An error means the wait was interrupted and acquisition must stop.
    fn pause(&self, interval: Duration) -> anyhow::Result<()>;
}

/// Sleeps on the calling thread.
#[derive(Default, Debug, Clone, Copy)]
pub struct ThreadSleep;

impl Backoff for ThreadSleep {
    fn pause(&self, interval: Duration) -> anyhow::Result<()> {
        thread::sleep(interval);
        Ok(())
    }
}

/// Open a connection to `resource`, retrying transient failures.
///
/// See [`acquire_with`].
pub fn acquire(driver: &dyn Driver, resource: &Resource) -> Result<Box<dyn Connection>> {
    acquire_with(driver, resource, &ThreadSleep)
}

/// Open a connection to `resource`, pausing through `backoff` between attempts.
///
/// At most `retry_count + 1` attempts are made. Every attempt logs in within `connect_timeout_ms`,
/// disables autocommit and selects `database_name` when one is set. A recoverable failure is retried
/// after `retry_interval_ms` until the attempts are exhausted, any other failure is returned
/// immediately.
pub fn acquire_with(
    driver: &dyn Driver,
    resource: &Resource,
    backoff: &dyn Backoff,
) -> Result<Box<dyn Connection>> {
    resource.validate()?;
    let attempts = resource.retry_count.saturating_add(1);
    let mut attempt = 1;
    loop {
        match open(driver, resource) {
            Ok(connection) => {
                log::debug!(
                    "Connected to {}:{} as {} (attempt {}/{})",
                    resource.host,
                    resource.port(),
                    resource.principal,
                    attempt,
                    attempts
                );
                return Ok(connection);
            }
            Err(ConnectError::Fatal(e)) => return Err(driver_error(e)),
            Err(ConnectError::Recoverable(e)) => {
                if attempt >= attempts {
                    let error = Error::connection(e);
                    log::error!("Giving up after {} attempts: {:#}", attempts, error);
                    return Err(error);
                }
                log::warn!(
                    "Attempt {}/{} to connect to {}:{} failed, retrying in {:?}: {:#}",
                    attempt,
                    attempts,
                    resource.host,
                    resource.port(),
                    resource.retry_interval(),
                    e
                );
                backoff
                    .pause(resource.retry_interval())
                    .map_err(Error::unhandled)?;
                attempt += 1;
            }
        }
    }
}

fn open(
    driver: &dyn Driver,
    resource: &Resource,
) -> std::result::Result<Box<dyn Connection>, ConnectError> {
    let mut connection = driver.connect(resource, resource.connect_timeout())?;
    let configured = connection.set_auto_commit(false).and_then(|_| {
        if resource.database_name.is_empty() {
            Ok(())
        } else {
            connection.set_catalog(&resource.database_name)
        }
    });
    if let Err(e) = configured {
        log_close_error(connection.close(), "connection");
        return Err(ConnectError::Fatal(e));
    }
    Ok(connection)
}

/// Close `connection`. Failures are logged and never returned.
pub fn release(connection: Option<Box<dyn Connection>>) {
    if let Some(mut connection) = connection {
        log_close_error(connection.close(), "connection");
    }
}

/// Commit the current transaction, nothing happens without a connection.
pub fn commit(connection: Option<&mut dyn Connection>) -> Result<()> {
    match connection {
        Some(connection) => connection.commit().map_err(driver_error),
        None => Ok(()),
    }
}

/// Roll back the current transaction, nothing happens without a connection.
pub fn rollback(connection: Option<&mut dyn Connection>) -> Result<()> {
    match connection {
        Some(connection) => connection.rollback().map_err(driver_error),
        None => Ok(()),
    }
}

/// Whether `connection` is still usable. A failing check counts as closed.
pub fn opened(connection: &dyn Connection) -> bool {
    match connection.is_closed() {
        Ok(closed) => !closed,
        Err(e) => {
            log::warn!("Could not check the connection: {:#}", e);
            false
        }
    }
}

/// Current time of the database server, read from the first column of the first row of `query`.
///
/// A query returning no row (or a null) yields the Unix epoch.
pub fn system_time(connection: &mut dyn Connection, query: &str) -> Result<PrimitiveDateTime> {
    if query.trim().is_empty() {
        return Err(Error::argument_null("query"));
    }
    log::debug!("Reading the system time: {}", query);
    let mut handle = connection.prepare(query).map_err(driver_error)?;
    let result = (|| -> Result<Option<PrimitiveDateTime>> {
        let mut cursor = handle.execute_query().map_err(driver_error)?;
        let value = (|| -> Result<Option<PrimitiveDateTime>> {
            if !cursor.next().map_err(driver_error)? {
                return Ok(None);
            }
            Option::<PrimitiveDateTime>::try_from_value(cursor.get_index(0).map_err(driver_error)?)
        })();
        log_close_error(cursor.close(), "cursor");
        value
    })();
    log_close_error(handle.close(), "prepared statement");
    Ok(result?.unwrap_or(datetime!(1970-01-01 0:00)))
}
