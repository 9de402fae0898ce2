use super::{
    modify::Modify,
    statement::{driver_error, impl_statement_display},
};
use crate::{
    Binding, Connection, Entity, Error, ErrorKind, Filter, ParameterType, Result, Returning,
    RowsAffected, Statement, StatementConfig, StatementCore,
};
use std::{borrow::Cow, sync::Arc};

/// `UPDATE <entity> SET <column = ?…> [WHERE …] [RETURNING … INTO …]`
///
/// The assigned values are bound first, then the parameters of the filter.
pub struct Update {
    core: StatementCore,
    entity: Arc<Entity>,
    modify: Modify,
    filter: Filter,
}

impl Update {
    pub fn build(
        entity: Arc<Entity>,
        bindings: impl IntoIterator<Item = Binding>,
        filter: Filter,
    ) -> Self {
        Self {
            core: StatementCore::new(StatementConfig::default()),
            entity,
            modify: Modify::new(bindings),
            filter,
        }
    }

    pub fn with_config(mut self, config: StatementConfig) -> Self {
        self.core.set_config(config);
        self
    }

    /// Report `column` of the updated row, read from an output position of type `ty`.
    pub fn returning(mut self, column: impl Into<Cow<'static, str>>, ty: ParameterType) -> Self {
        self.modify.returning.push(Returning::new(column, ty));
        self
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.modify.bindings
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }
}

impl Statement for Update {
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
            filter,
        } = self;
        let returning = modify.returning_columns();
        core.prepare(connection, |writer, out| {
            writer.write_update(out, entity, &modify.bindings, filter, &returning)
        })
    }

    fn execute(&mut self) -> Result<Self::Output> {
        let start = self.core.bind()?;
        let handle = self.core.handle()?;
        self.modify.register_returning(handle, start)?;
        let rows_affected = handle.execute_update().map_err(driver_error)?;
        if rows_affected == 0 {
            return Err(Error::new(
                ErrorKind::ObjectNotModified,
                format!("No row of {} matched {}", self.entity, self.filter),
            ));
        }
        let returned = self.modify.returned(handle)?;
        Ok(RowsAffected {
            rows_affected,
            returned,
        })
    }
}

impl_statement_display!(Update);
