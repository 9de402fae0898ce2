use super::statement::{driver_error, impl_statement_display};
use crate::{
    Connection, Entity, Filter, Result, Statement, StatementConfig, StatementCore,
    util::log_close_error,
};
use std::sync::Arc;

/// `SELECT 'x' FROM dual WHERE EXISTS (…)`, true when the query yields a row.
pub struct Exists {
    core: StatementCore,
    entity: Arc<Entity>,
    filter: Filter,
}

impl Exists {
    pub fn build(entity: Arc<Entity>, filter: Filter) -> Self {
        Self {
            core: StatementCore::new(StatementConfig::default()),
            entity,
            filter,
        }
    }

    pub fn with_config(mut self, config: StatementConfig) -> Self {
        self.core.set_config(config);
        self
    }
}

impl Statement for Exists {
    type Output = bool;

    fn core(&self) -> &StatementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StatementCore {
        &mut self.core
    }

    fn prepare(&mut self, connection: &mut dyn Connection) -> Result<()> {
        let Self {
            core,
            entity,
            filter,
        } = self;
        core.prepare(connection, |writer, out| writer.write_exists(out, entity, filter))
    }

    fn execute(&mut self) -> Result<Self::Output> {
        self.core.bind()?;
        let mut cursor = self
            .core
            .handle()?
            .execute_query()
            .map_err(driver_error)?;
        let result = cursor.next().map_err(driver_error);
        log_close_error(cursor.close(), "cursor");
        result
    }
}

impl_statement_display!(Exists);
