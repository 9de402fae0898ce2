use super::statement::{driver_error, impl_statement_display};
use crate::{
    AsValue, Connection, Entity, Error, Filter, Result, Statement, StatementConfig, StatementCore,
    util::log_close_error,
};
use std::sync::Arc;

/// `SELECT COUNT(<primary>) AS RS FROM <entity> [WHERE …]`
pub struct Count {
    core: StatementCore,
    entity: Arc<Entity>,
    filter: Filter,
}

impl Count {
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

impl Statement for Count {
    type Output = u64;

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
        core.prepare(connection, |writer, out| writer.write_count(out, entity, filter))
    }

    /// The cursor is advanced exactly once, a missing row counts as zero.
    fn execute(&mut self) -> Result<Self::Output> {
        self.core.bind()?;
        let mut cursor = self
            .core
            .handle()?
            .execute_query()
            .map_err(driver_error)?;
        let result = (|| -> Result<u64> {
            if !cursor.next().map_err(driver_error)? {
                return Ok(0);
            }
            let value = cursor.get("RS").map_err(driver_error)?;
            let count = Option::<i64>::try_from_value(value)?.unwrap_or_default();
            u64::try_from(count).map_err(|_| Error::type_mismatch(count, "u64"))
        })();
        log_close_error(cursor.close(), "cursor");
        result
    }
}

impl_statement_display!(Count);
