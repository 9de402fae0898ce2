use rowbind_core::{ParameterType, Value};
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

/// Something the code under test asked the driver to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Connect { login_timeout: Duration },
    AutoCommit(bool),
    Catalog(String),
    Prepare(String),
    QueryTimeout(Duration),
    /// `ty` is the binder that was called, [`ParameterType::Null`] for the generic one.
    Bind {
        index: usize,
        ty: ParameterType,
        value: Value,
    },
    RegisterReturn {
        index: usize,
        ty: ParameterType,
    },
    ExecuteQuery,
    ExecuteUpdate,
    Pause(Duration),
    CloseCursor,
    ClosePrepared,
    CloseConnection,
    Commit,
    Rollback,
}

/// How a connection attempt ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Success,
    /// Recoverable, caused by a refused network connect.
    Refused,
    /// Recoverable, reported by the server.
    Busy,
    /// Not recoverable.
    Denied,
}

/// Rows returned by one query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockRows {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl MockRows {
    pub fn new<L: Into<String>>(labels: impl IntoIterator<Item = L>) -> Self {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<V: Into<Value>>(mut self, values: impl IntoIterator<Item = V>) -> Self {
        self.rows.push(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Scripted answer to the next execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Rows(MockRows),
    Affected(u64),
    Failure(String),
}

#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) connects: VecDeque<ConnectOutcome>,
    pub(crate) responses: VecDeque<Response>,
    pub(crate) returned: VecDeque<Vec<Value>>,
    pub(crate) failing_close: bool,
    pub(crate) events: Vec<Event>,
}

/// State shared by the driver and everything it hands out.
#[derive(Debug, Clone, Default)]
pub(crate) struct Shared(Arc<Mutex<State>>);

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn record(&self, event: Event) {
        self.lock().events.push(event);
    }

    pub(crate) fn close(&self, event: Event) -> anyhow::Result<()> {
        let mut state = self.lock();
        state.events.push(event.clone());
        if state.failing_close {
            anyhow::bail!("{:?} failed", event);
        }
        Ok(())
    }
}
