use super::statement::{driver_error, impl_statement_display};
use crate::{
    Connection, Entity, Filter, Projection, Result, RowLabeled, RowNames, Sort, Statement,
    StatementConfig, StatementCore, fetch_rows,
};
use std::sync::Arc;

/// SELECT over one entity, or over several joined ones.
///
/// The projected columns are returned under their aliases, the `ROWNUM` pseudo column is always
/// selected so that the same text can be wrapped by a paginated query.
pub struct Select {
    core: StatementCore,
    from: Vec<Arc<Entity>>,
    projection: Vec<Projection>,
    filter: Filter,
    sort: Option<Sort>,
    page: Option<(u64, u64)>,
}

impl Select {
    pub fn build<P: Into<Projection>>(
        entity: Arc<Entity>,
        filter: Filter,
        projection: impl IntoIterator<Item = P>,
    ) -> Self {
        Self {
            core: StatementCore::new(StatementConfig::default()),
            from: vec![entity],
            projection: projection.into_iter().map(Into::into).collect(),
            filter,
            sort: None,
            page: None,
        }
    }

    /// Select every projected column of `entities`, filtered by `join AND filter`.
    pub fn joined(entities: impl IntoIterator<Item = Arc<Entity>>, join: Filter, filter: Filter) -> Self {
        let from: Vec<_> = entities.into_iter().collect();
        let projection = from
            .iter()
            .flat_map(|v| v.projection().iter().cloned())
            .collect();
        Self {
            core: StatementCore::new(StatementConfig::default()),
            from,
            projection,
            filter: join.and(filter),
            sort: None,
            page: None,
        }
    }

    pub fn with_config(mut self, config: StatementConfig) -> Self {
        self.core.set_config(config);
        self
    }

    pub fn order_by(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Restrict the result to the rows numbered from `first` to `last`, both included.
    pub fn page(mut self, first: u64, last: u64) -> Self {
        self.page = Some((first, last));
        self
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn projection(&self) -> &[Projection] {
        &self.projection
    }

    fn labels(&self) -> RowNames {
        self.projection
            .iter()
            .map(|v| v.alias.to_string())
            .collect()
    }
}

impl Statement for Select {
    type Output = Vec<RowLabeled>;

    fn core(&self) -> &StatementCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut StatementCore {
        &mut self.core
    }

    fn prepare(&mut self, connection: &mut dyn Connection) -> Result<()> {
        let Self {
            core,
            from,
            projection,
            filter,
            sort,
            page,
        } = self;
        core.prepare(connection, |writer, out| match page {
            Some(page) => {
                writer.write_select_page(out, from, projection, filter, sort.as_ref(), *page)
            }
            None => writer.write_select(out, from, projection, filter, sort.as_ref()),
        })
    }

    fn execute(&mut self) -> Result<Self::Output> {
        self.core.bind()?;
        let labels = self.labels();
        let cursor = self
            .core
            .handle()?
            .execute_query()
            .map_err(driver_error)?;
        fetch_rows(cursor, labels)
    }
}

impl_statement_display!(Select);
