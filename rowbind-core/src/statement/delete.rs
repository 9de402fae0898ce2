use super::statement::{driver_error, impl_statement_display};
use crate::{
    Connection, Entity, Error, ErrorKind, Filter, Result, RowsAffected, Statement,
    StatementConfig, StatementCore,
};
use std::sync::Arc;

/// `DELETE FROM <entity> [WHERE …]`
pub struct Delete {
    core: StatementCore,
    entity: Arc<Entity>,
    filter: Filter,
}

impl Delete {
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

impl Statement for Delete {
    type Output = RowsAffected;

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
        core.prepare(connection, |writer, out| writer.write_delete(out, entity, filter))
    }

    fn execute(&mut self) -> Result<Self::Output> {
        self.core.bind()?;
        let rows_affected = self
            .core
            .handle()?
            .execute_update()
            .map_err(driver_error)?;
        if rows_affected == 0 {
            return Err(Error::new(
                ErrorKind::ObjectNotDeleted,
                format!("No row of {} matched {}", self.entity, self.filter),
            ));
        }
        Ok(RowsAffected {
            rows_affected,
            returned: Default::default(),
        })
    }
}

impl_statement_display!(Delete);
