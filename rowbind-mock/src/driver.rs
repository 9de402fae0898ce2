use crate::{ConnectOutcome, Event, MockConnection, Response, Shared};
use anyhow::anyhow;
use rowbind_core::{Backoff, ConnectError, Connection, Driver, ParameterType, Resource, Value};
use std::{io, time::Duration};

/// In-memory driver: connection attempts, query results and affected row counts are scripted up
/// front, every call made by the code under test is journaled.
///
/// Unscripted connection attempts succeed, unscripted queries return no rows and unscripted
/// updates affect no rows.
#[derive(Debug, Clone, Default)]
pub struct MockDriver {
    shared: Shared,
}

impl MockDriver {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn connect_outcome(self, outcome: ConnectOutcome) -> Self {
        self.shared.lock().connects.push_back(outcome);
        self
    }

    /// Answer the next execution with `response`.
    pub fn respond(self, response: Response) -> Self {
        self.shared.lock().responses.push_back(response);
        self
    }

    /// Values read back from the output positions after the next update reporting some.
    pub fn returned<V: Into<Value>>(self, values: impl IntoIterator<Item = V>) -> Self {
        self.shared
            .lock()
            .returned
            .push_back(values.into_iter().map(Into::into).collect());
        self
    }

    /// Make every close call fail after being journaled.
    pub fn failing_close(self) -> Self {
        self.shared.lock().failing_close = true;
        self
    }

    /// Connection using the dialect of `resource`, without going through acquisition.
    pub fn connection(&self, resource: &Resource) -> MockConnection {
        MockConnection::new(self.shared.clone(), resource.flavor)
    }

    /// Backoff journaling the pauses instead of sleeping.
    pub fn backoff(&self) -> MockBackoff {
        MockBackoff {
            shared: self.shared.clone(),
            interrupted: false,
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.shared.lock().events.clone()
    }

    pub fn clear_events(&self) {
        self.shared.lock().events.clear();
    }

    pub fn prepared(&self) -> Vec<String> {
        self.filter_events(|v| match v {
            Event::Prepare(sql) => Some(sql.clone()),
            _ => None,
        })
    }

    /// `(position, binder, value)` of every bind call.
    pub fn bindings(&self) -> Vec<(usize, ParameterType, Value)> {
        self.filter_events(|v| match v {
            Event::Bind { index, ty, value } => Some((*index, *ty, value.clone())),
            _ => None,
        })
    }

    pub fn connect_attempts(&self) -> usize {
        self.count(|v| matches!(v, Event::Connect { .. }))
    }

    pub fn pauses(&self) -> Vec<Duration> {
        self.filter_events(|v| match v {
            Event::Pause(interval) => Some(*interval),
            _ => None,
        })
    }

    pub fn count(&self, f: impl Fn(&Event) -> bool) -> usize {
        self.shared.lock().events.iter().filter(|&v| f(v)).count()
    }

    fn filter_events<T>(&self, f: impl Fn(&Event) -> Option<T>) -> Vec<T> {
        self.shared.lock().events.iter().filter_map(f).collect()
    }
}

impl Driver for MockDriver {
    fn connect(
        &self,
        resource: &Resource,
        login_timeout: Duration,
    ) -> Result<Box<dyn Connection>, ConnectError> {
        let outcome = {
            let mut state = self.shared.lock();
            state.events.push(Event::Connect { login_timeout });
            state.connects.pop_front().unwrap_or(ConnectOutcome::Success)
        };
        let target = format!("{}:{}", resource.host, resource.port());
        match outcome {
            ConnectOutcome::Success => Ok(Box::new(self.connection(resource))),
            ConnectOutcome::Refused => Err(ConnectError::Recoverable(
                anyhow::Error::new(io::Error::from(io::ErrorKind::ConnectionRefused))
                    .context(format!("Could not reach {}", target)),
            )),
            ConnectOutcome::Busy => Err(ConnectError::Recoverable(anyhow!(
                "The listener of {} has no available handler",
                target
            ))),
            ConnectOutcome::Denied => Err(ConnectError::Fatal(anyhow!(
                "Invalid username or password for {}",
                resource.principal
            ))),
        }
    }
}

/// Journals the pauses of connection acquisition.
#[derive(Debug, Clone)]
pub struct MockBackoff {
    shared: Shared,
    interrupted: bool,
}

impl MockBackoff {
    /// Fail every pause as if the waiting thread was interrupted.
    pub fn interrupted(mut self) -> Self {
        self.interrupted = true;
        self
    }
}

impl Backoff for MockBackoff {
    fn pause(&self, interval: Duration) -> anyhow::Result<()> {
        self.shared.record(Event::Pause(interval));
        if self.interrupted {
            anyhow::bail!("Interrupted while waiting {:?}", interval);
        }
        Ok(())
    }
}
