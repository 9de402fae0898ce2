use crate::{Event, MockRows, Shared};
use anyhow::{Context, Result, anyhow};
use rowbind_core::{Cursor, Value};

/// Cursor over scripted rows.
pub struct MockCursor {
    shared: Shared,
    rows: MockRows,
    /// Position of the current row plus one, 0 before the first `next`.
    position: usize,
}

impl MockCursor {
    pub(crate) fn new(shared: Shared, rows: MockRows) -> Self {
        Self {
            shared,
            rows,
            position: 0,
        }
    }

    fn current(&self) -> Result<&[Value]> {
        self.position
            .checked_sub(1)
            .and_then(|i| self.rows.rows.get(i))
            .map(Vec::as_slice)
            .ok_or_else(|| anyhow!("The cursor is not on a row"))
    }
}

impl Cursor for MockCursor {
    fn next(&mut self) -> Result<bool> {
        if self.position < self.rows.rows.len() {
            self.position += 1;
            Ok(true)
        } else {
            self.position = self.rows.rows.len() + 1;
            Ok(false)
        }
    }

    fn get(&self, column: &str) -> Result<Value> {
        let index = self
            .rows
            .labels
            .iter()
            .position(|v| v == column)
            .with_context(|| format!("Column `{}` is not in the result set", column))?;
        self.get_index(index)
    }

    fn get_index(&self, index: usize) -> Result<Value> {
        self.current()?
            .get(index)
            .cloned()
            .with_context(|| format!("Column index {} out of range", index))
    }

    fn close(&mut self) -> Result<()> {
        self.shared.close(Event::CloseCursor)
    }
}
