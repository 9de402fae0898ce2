use super::{
    modify::Modify,
    statement::{driver_error, impl_statement_display},
};
use crate::{
    Binding, Connection, Entity, Error, ErrorKind, ParameterType, Result, Returning, RowsAffected,
    Statement, StatementConfig, StatementCore,
};
use std::{borrow::Cow, sync::Arc};

/// `INSERT INTO <entity> (<columns>) VALUES (<?…>) [RETURNING … INTO …]`
pub struct Insert {
    core: StatementCore,
    entity: Arc<Entity>,
    modify: Modify,
}

impl Insert {
    pub fn build(entity: Arc<Entity>, bindings: impl IntoIterator<Item = Binding>) -> Self {
        Self {
            core: StatementCore::new(StatementConfig::default()),
            entity,
            modify: Modify::new(bindings),
        }
    }

    pub fn with_config(mut self, config: StatementConfig) -> Self {
        self.core.set_config(config);
        self
    }

    /// Report `column` of the inserted row, read from an output position of type `ty`.
    pub fn returning(mut self, column: impl Into<Cow<'static, str>>, ty: ParameterType) -> Self {
        self.modify.returning.push(Returning::new(column, ty));
        self
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.modify.bindings
    }
}

impl Statement for Insert {
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
            modify,
        } = self;
        let returning = modify.returning_columns();
        core.prepare(connection, |writer, out| {
            writer.write_insert(out, entity, &modify.bindings, &returning)
        })
    }

    fn execute(&mut self) -> Result<Self::Output> {
        let start = self.core.bind()?;
        let handle = self.core.handle()?;
        self.modify.register_returning(handle, start)?;
        let rows_affected = handle.execute_update().map_err(driver_error)?;
        if rows_affected == 0 {
            return Err(Error::new(
                ErrorKind::ObjectNotCreated,
                format!("No row was inserted into {}", self.entity),
            ));
        }
        let returned = self.modify.returned(handle)?;
        Ok(RowsAffected {
            rows_affected,
            returned,
        })
    }
}

impl_statement_display!(Insert);
