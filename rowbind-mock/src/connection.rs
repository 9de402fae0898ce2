use crate::{Event, MockPrepared, Shared};
use anyhow::{Result, bail};
use rowbind_core::{Connection, Flavor, Prepared, SqlWriter};

/// Connection speaking the dialect of its flavor.
pub struct MockConnection {
    shared: Shared,
    writer: Box<dyn SqlWriter + Send + Sync>,
    closed: bool,
}

impl MockConnection {
    pub(crate) fn new(shared: Shared, flavor: Flavor) -> Self {
        Self {
            shared,
            writer: flavor.sql_writer(),
            closed: false,
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            bail!("The connection is closed");
        }
        Ok(())
    }
}

impl Connection for MockConnection {
    fn sql_writer(&self) -> &dyn SqlWriter {
        self.writer.as_dyn()
    }

    fn prepare(&mut self, sql: &str) -> Result<Box<dyn Prepared>> {
        self.ensure_open()?;
        self.shared.record(Event::Prepare(sql.into()));
        Ok(Box::new(MockPrepared::new(self.shared.clone(), sql.into())))
    }

    fn set_auto_commit(&mut self, auto_commit: bool) -> Result<()> {
        self.ensure_open()?;
        self.shared.record(Event::AutoCommit(auto_commit));
        Ok(())
    }

    fn set_catalog(&mut self, catalog: &str) -> Result<()> {
        self.ensure_open()?;
        self.shared.record(Event::Catalog(catalog.into()));
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.shared.record(Event::Commit);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.shared.record(Event::Rollback);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.shared.close(Event::CloseConnection)
    }

    fn is_closed(&self) -> Result<bool> {
        Ok(self.closed)
    }
}
