use crate::{
    Binding, Entity, Error, ErrorKind, Filter, Operand, Operator, Order, Parameter, ParameterType,
    Projection, Result, Sort, SortKey, TableRef, Value, separated_by, try_separated_by,
    writer::{Context, Fragment},
};
use std::{borrow::Cow, mem, sync::Arc};

/// Dialect printer turning filters, sorts and statement descriptions into SQL text.
///
/// Every `write_*` method appends to `out` and pushes the bind parameters it generates into
/// `context`, in the same order as the `?` placeholders it writes.
pub trait SqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Whether the dialect can report column values of the modified row (`RETURNING … INTO`).
    fn supports_returning(&self) -> bool {
        false
    }

    /// Whether the current fragment context allows alias declaration.
    fn alias_declaration(&self, context: &Context) -> bool {
        matches!(context.fragment, Fragment::SqlSelect)
    }

    fn write_identifier(&self, _context: &mut Context, out: &mut String, value: &str) {
        out.push_str(value);
    }

    fn write_table_ref(&self, context: &mut Context, out: &mut String, value: &TableRef) {
        if !value.schema.is_empty() {
            self.write_identifier(context, out, &value.schema);
            out.push('.');
        }
        self.write_identifier(context, out, &value.name);
    }

    /// Render a projected column, with its alias when declaring the select list.
    fn write_projection(&self, context: &mut Context, out: &mut String, value: &Projection) {
        self.write_identifier(context, out, &value.column);
        if self.alias_declaration(context) {
            out.push_str(" AS ");
            self.write_identifier(context, out, &value.alias);
        }
    }

    /// Pseudo column numbering the rows of a select.
    fn write_row_number(&self, context: &mut Context, out: &mut String) {
        if self.alias_declaration(context) {
            out.push_str("ROWNUM AS ROWNUMBER");
        } else {
            out.push_str("ROWNUM");
        }
    }

    /// Placeholder for `parameter`.
    fn write_parameter(&self, context: &mut Context, out: &mut String, parameter: Parameter) {
        context.bind(parameter);
        out.push('?');
    }

    /// Bind parameter for a literal compared in a predicate.
    fn literal_parameter(&self, value: &Value) -> Parameter {
        match value {
            Value::Boolean(v) => Parameter::new(ParameterType::Varchar, if *v { "1" } else { "0" }),
            Value::Date(v) => Parameter::new(ParameterType::Timestamp, v.midnight()),
            Value::Timestamp(..) => Parameter::new(ParameterType::Timestamp, value.clone()),
            _ => Parameter::from_value(value.clone()),
        }
    }

    /// Turn a literal into a LIKE pattern: every `*` is dropped and `%` anchors the match.
    fn like_pattern(&self, operator: Operator, value: &Value) -> String {
        let literal = value.to_string().replace('*', "");
        match operator {
            Operator::Sw | Operator::NotSw => format!("{}%", literal),
            Operator::Ew | Operator::NotEw => format!("%{}", literal),
            _ => format!("%{}%", literal),
        }
    }

    /// Compile a predicate tree, depth first and left to right.
    fn write_filter(&self, context: &mut Context, out: &mut String, filter: &Filter) -> Result<()> {
        match filter.operator {
            Operator::Nop => Ok(()),
            Operator::And | Operator::Or => self.write_filter_logical(context, out, filter),
            Operator::Hierarchy => Err(Error::search_condition(filter)),
            Operator::In | Operator::NotIn => self.write_filter_membership(context, out, filter),
            op if op.is_like() => self.write_filter_like(context, out, filter),
            _ => self.write_filter_comparison(context, out, filter),
        }
    }

    fn write_filter_logical(
        &self,
        context: &mut Context,
        out: &mut String,
        filter: &Filter,
    ) -> Result<()> {
        let (Operand::Filter(first), Operand::Filter(second)) = (&filter.first, &filter.second)
        else {
            return Err(Error::search_condition(filter));
        };
        if first.is_nop() || second.is_nop() {
            return Err(Error::search_condition(filter));
        }
        out.push('(');
        self.write_filter(context, out, first)?;
        out.push_str(if filter.operator == Operator::And {
            " AND "
        } else {
            " OR "
        });
        self.write_filter(context, out, second)?;
        out.push(')');
        Ok(())
    }

    /// Left hand side of a predicate: a column, an entity's primary column or a nested query.
    fn write_filter_first(
        &self,
        context: &mut Context,
        out: &mut String,
        filter: &Filter,
    ) -> Result<()> {
        match &filter.first {
            Operand::Column(v) => self.write_identifier(context, out, v),
            Operand::Entity(v) => self.write_identifier(context, out, v.primary()),
            Operand::Select(v) => {
                self.write_subselect(context, out, &v.entity, Some(&v.filter))?
            }
            _ => return Err(Error::search_condition(filter)),
        }
        Ok(())
    }

    fn write_filter_comparison(
        &self,
        context: &mut Context,
        out: &mut String,
        filter: &Filter,
    ) -> Result<()> {
        let operator = match filter.operator {
            Operator::Eq => " = ",
            Operator::NotEq => " != ",
            Operator::Gt => " > ",
            Operator::Ge => " >= ",
            Operator::Lt => " < ",
            Operator::Le => " <= ",
            _ => return Err(Error::search_condition(filter)),
        };
        out.push('(');
        self.write_filter_first(context, out, filter)?;
        match &filter.second {
            v if v.is_null() => match filter.operator {
                Operator::Eq => out.push_str(" IS NULL"),
                Operator::NotEq => out.push_str(" IS NOT NULL"),
                _ => return Err(Error::search_condition(filter)),
            },
            Operand::Value(v) => {
                out.push_str(operator);
                let parameter = self.literal_parameter(v);
                self.write_parameter(context, out, parameter);
            }
            Operand::Column(v) => {
                out.push_str(operator);
                self.write_identifier(context, out, v);
            }
            Operand::Entity(v) => {
                out.push_str(operator);
                self.write_identifier(context, out, v.primary());
            }
            _ => return Err(Error::search_condition(filter)),
        }
        out.push(')');
        Ok(())
    }

    fn write_filter_like(
        &self,
        context: &mut Context,
        out: &mut String,
        filter: &Filter,
    ) -> Result<()> {
        let Operand::Value(value) = &filter.second else {
            return Err(Error::search_condition(filter));
        };
        if value.is_null() {
            return Err(Error::search_condition(filter));
        }
        out.push('(');
        self.write_filter_first(context, out, filter)?;
        out.push_str(if filter.operator.is_negated() {
            " NOT LIKE "
        } else {
            " LIKE "
        });
        let parameter = match value {
            Value::Boolean(..) | Value::Date(..) | Value::Timestamp(..) => {
                self.literal_parameter(value)
            }
            _ => Parameter::new(
                ParameterType::Varchar,
                self.like_pattern(filter.operator, value),
            ),
        };
        self.write_parameter(context, out, parameter);
        out.push(')');
        Ok(())
    }

    fn write_filter_membership(
        &self,
        context: &mut Context,
        out: &mut String,
        filter: &Filter,
    ) -> Result<()> {
        if !matches!(
            filter.first,
            Operand::Column(..) | Operand::Entity(..) | Operand::Select(..)
        ) {
            return Err(Error::search_condition(filter));
        }
        out.push('(');
        self.write_filter_first(context, out, filter)?;
        out.push_str(if filter.operator == Operator::NotIn {
            " NOT IN "
        } else {
            " IN "
        });
        match &filter.second {
            Operand::Collection(values) if !values.is_empty() => {
                out.push('(');
                separated_by(
                    out,
                    values,
                    |out, v| {
                        let parameter = if v.is_null() {
                            Parameter::null(ParameterType::Varchar)
                        } else {
                            Parameter::new(ParameterType::Varchar, v.to_string())
                        };
                        self.write_parameter(context, out, parameter);
                    },
                    ", ",
                );
                out.push(')');
            }
            Operand::Entity(v) => self.write_subselect(context, out, v, None)?,
            Operand::Select(v) => self.write_subselect(context, out, &v.entity, Some(&v.filter))?,
            _ => return Err(Error::search_condition(filter)),
        }
        out.push(')');
        Ok(())
    }

    /// `(SELECT <primary> FROM <entity> [WHERE <filter>])`
    fn write_subselect(
        &self,
        context: &mut Context,
        out: &mut String,
        entity: &Entity,
        filter: Option<&Filter>,
    ) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlSubselect);
        out.push_str("(SELECT ");
        self.write_identifier(&mut context.current, out, entity.primary());
        out.push_str(" FROM ");
        self.write_table_ref(&mut context.current, out, entity.table());
        if let Some(filter) = filter.filter(|v| !v.is_nop()) {
            out.push_str(" WHERE ");
            self.write_filter(&mut context.current, out, filter)?;
        }
        out.push(')');
        Ok(())
    }

    /// Render the sort chain: `<column> [ASC|DESC]` joined by commas.
    fn write_order(&self, context: &mut Context, out: &mut String, sort: &Sort) {
        separated_by(
            out,
            sort.iter(),
            |out, node| {
                match &node.key {
                    SortKey::Column(v) => self.write_identifier(context, out, v),
                    SortKey::Sort(v) => self.write_order(context, out, v),
                }
                match node.order {
                    Some(Order::ASC) => out.push_str(" ASC"),
                    Some(Order::DESC) => out.push_str(" DESC"),
                    None => {}
                }
            },
            ", ",
        );
    }

    /// Render the clause reporting `columns` of the modified row.
    fn write_returning(
        &self,
        _context: &mut Context,
        _out: &mut String,
        columns: &[Cow<'static, str>],
    ) -> Result<()> {
        if columns.is_empty() {
            return Ok(());
        }
        Err(Error::new(
            ErrorKind::ArgumentBadValue,
            "The SQL dialect does not support a RETURNING clause",
        ))
    }

    /// Emit SELECT statement (projection, FROM, WHERE, ORDER BY).
    fn write_select(
        &self,
        out: &mut String,
        from: &[Arc<Entity>],
        projection: &[Projection],
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> Result<Vec<Parameter>> {
        let mut context = Context::new(Fragment::SqlSelect);
        self.write_select_fragment(&mut context, out, from, projection, filter, sort)?;
        Ok(context.into_parameters())
    }

    fn write_select_fragment(
        &self,
        context: &mut Context,
        out: &mut String,
        from: &[Arc<Entity>],
        projection: &[Projection],
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> Result<()> {
        if from.is_empty() {
            return Err(Error::argument_null("entity"));
        }
        out.reserve(128 + projection.len() * 32);
        out.push_str("SELECT ");
        separated_by(
            out,
            projection,
            |out, v| self.write_projection(context, out, v),
            ", ",
        );
        if !projection.is_empty() {
            out.push_str(", ");
        }
        self.write_row_number(context, out);
        out.push_str(" FROM ");
        {
            let mut context = context.switch_fragment(Fragment::SqlSelectFrom);
            separated_by(
                out,
                from,
                |out, v| self.write_table_ref(&mut context.current, out, v.table()),
                ", ",
            );
        }
        if !filter.is_nop() {
            out.push_str(" WHERE ");
            let mut context = context.switch_fragment(Fragment::SqlSelectWhere);
            self.write_filter(&mut context.current, out, filter)?;
        }
        if let Some(sort) = sort {
            out.push_str(" ORDER BY ");
            let mut context = context.switch_fragment(Fragment::SqlSelectOrderBy);
            self.write_order(&mut context.current, out, sort);
        }
        Ok(())
    }

    /// Emit a SELECT restricted to the rows numbered `first..=last`.
    ///
    /// Bounds beyond `i64::MAX` are rejected with `ArgumentBadValue`.
    fn write_select_page(
        &self,
        out: &mut String,
        from: &[Arc<Entity>],
        projection: &[Projection],
        filter: &Filter,
        sort: Option<&Sort>,
        (first, last): (u64, u64),
    ) -> Result<Vec<Parameter>> {
        let mut context = Context::new(Fragment::SqlSelectPage);
        out.push_str("SELECT * FROM (");
        {
            let mut context = context.switch_fragment(Fragment::SqlSelect);
            self.write_select_fragment(&mut context.current, out, from, projection, filter, sort)?;
        }
        let bound = |name: &str, value: u64| {
            i64::try_from(value).map_err(|_| Error::argument_bad_value(name, value))
        };
        let (first, last) = (bound("first", first)?, bound("last", last)?);
        out.push_str(") WHERE ROWNUMBER BETWEEN ");
        self.write_parameter(&mut context, out, Parameter::from_value(first));
        out.push_str(" AND ");
        self.write_parameter(&mut context, out, Parameter::from_value(last));
        Ok(context.into_parameters())
    }

    /// Emit `SELECT COUNT(<primary>) AS RS FROM <entity> [WHERE …]`.
    fn write_count(&self, out: &mut String, entity: &Entity, filter: &Filter) -> Result<Vec<Parameter>> {
        let mut context = Context::new(Fragment::SqlCount);
        out.push_str("SELECT COUNT(");
        self.write_identifier(&mut context, out, entity.primary());
        out.push_str(") AS RS FROM ");
        self.write_table_ref(&mut context, out, entity.table());
        if !filter.is_nop() {
            out.push_str(" WHERE ");
            self.write_filter(&mut context, out, filter)?;
        }
        Ok(context.into_parameters())
    }

    /// Emit `SELECT 'x' FROM dual WHERE EXISTS (<select>)`.
    fn write_exists(
        &self,
        out: &mut String,
        entity: &Arc<Entity>,
        filter: &Filter,
    ) -> Result<Vec<Parameter>> {
        let mut context = Context::new(Fragment::SqlExists);
        out.push_str("SELECT 'x' FROM dual WHERE EXISTS (");
        {
            let mut context = context.switch_fragment(Fragment::SqlSelect);
            self.write_select_fragment(
                &mut context.current,
                out,
                std::slice::from_ref(entity),
                &[],
                filter,
                None,
            )?;
        }
        out.push(')');
        Ok(context.into_parameters())
    }

    /// Emit `INSERT INTO <entity> (<columns>) VALUES (<?…>) [RETURNING …]`.
    fn write_insert(
        &self,
        out: &mut String,
        entity: &Entity,
        bindings: &[Binding],
        returning: &[Cow<'static, str>],
    ) -> Result<Vec<Parameter>> {
        if bindings.is_empty() {
            return Err(Error::argument_null("attributes"));
        }
        let mut context = Context::new(Fragment::SqlInsertInto);
        out.reserve(64 + bindings.len() * 24);
        out.push_str("INSERT INTO ");
        self.write_table_ref(&mut context, out, entity.table());
        out.push_str(" (");
        try_separated_by(
            out,
            bindings,
            |out, v| {
                let column = resolve_column(entity, &v.name)?;
                self.write_identifier(&mut context, out, column);
                Ok::<_, Error>(())
            },
            ", ",
        )?;
        out.push_str(") VALUES (");
        {
            let mut context = context.switch_fragment(Fragment::SqlInsertIntoValues);
            separated_by(
                out,
                bindings,
                |out, v| self.write_parameter(&mut context.current, out, v.parameter.clone()),
                ", ",
            );
        }
        out.push(')');
        {
            let mut context = context.switch_fragment(Fragment::SqlReturning);
            self.write_returning(&mut context.current, out, returning)?;
        }
        Ok(context.into_parameters())
    }

    /// Emit `UPDATE <entity> SET <column = ?…> [WHERE …] [RETURNING …]`.
    fn write_update(
        &self,
        out: &mut String,
        entity: &Entity,
        bindings: &[Binding],
        filter: &Filter,
        returning: &[Cow<'static, str>],
    ) -> Result<Vec<Parameter>> {
        if bindings.is_empty() {
            return Err(Error::argument_null("attributes"));
        }
        let mut context = Context::new(Fragment::SqlUpdate);
        out.reserve(64 + bindings.len() * 24);
        out.push_str("UPDATE ");
        self.write_table_ref(&mut context, out, entity.table());
        out.push_str(" SET ");
        {
            let mut context = context.switch_fragment(Fragment::SqlUpdateSet);
            try_separated_by(
                out,
                bindings,
                |out, v| {
                    let column = resolve_column(entity, &v.name)?;
                    self.write_identifier(&mut context.current, out, column);
                    out.push_str(" = ");
                    self.write_parameter(&mut context.current, out, v.parameter.clone());
                    Ok::<_, Error>(())
                },
                ", ",
            )?;
        }
        if !filter.is_nop() {
            out.push_str(" WHERE ");
            let mut context = context.switch_fragment(Fragment::SqlUpdateWhere);
            self.write_filter(&mut context.current, out, filter)?;
        }
        {
            let mut context = context.switch_fragment(Fragment::SqlReturning);
            self.write_returning(&mut context.current, out, returning)?;
        }
        Ok(context.into_parameters())
    }

    /// Emit `DELETE FROM <entity> [WHERE …]`.
    fn write_delete(&self, out: &mut String, entity: &Entity, filter: &Filter) -> Result<Vec<Parameter>> {
        let mut context = Context::new(Fragment::SqlDeleteFrom);
        out.push_str("DELETE FROM ");
        self.write_table_ref(&mut context, out, entity.table());
        if !filter.is_nop() {
            out.push_str(" WHERE ");
            let mut context = context.switch_fragment(Fragment::SqlDeleteFromWhere);
            self.write_filter(&mut context.current, out, filter)?;
        }
        Ok(context.into_parameters())
    }
}

/// Column bound by `name`, which can be either a projection alias or a column name.
fn resolve_column<'e>(entity: &'e Entity, name: &str) -> Result<&'e str> {
    entity
        .lookup(name)
        .map(|v| v.column.as_ref())
        .ok_or_else(|| Error::argument_bad_value("attribute", name))
}

/// Common relational dialect, without `RETURNING` support.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}

/// Compile `filter` with the common dialect, appending its bind parameters to `parameters`.
///
/// On failure `parameters` is left as it was.
pub fn compile_predicate(filter: &Filter, parameters: &mut Vec<Parameter>) -> Result<String> {
    let len = parameters.len();
    let mut context = Context::with_parameters(Fragment::SqlSelectWhere, mem::take(parameters));
    let mut out = String::new();
    let result = GenericSqlWriter::new()
        .as_dyn()
        .write_filter(&mut context, &mut out, filter);
    *parameters = context.into_parameters();
    if let Err(error) = result {
        parameters.truncate(len);
        return Err(error);
    }
    Ok(out)
}

/// Compile a sort chain into the body of an ORDER BY clause.
pub fn compile_order(sort: &Sort) -> String {
    let mut out = String::new();
    GenericSqlWriter::new().write_order(
        &mut Context::new(Fragment::SqlSelectOrderBy),
        &mut out,
        sort,
    );
    out
}

/// Compile the `RETURNING … INTO …` clause of the vendor dialect.
pub fn compile_returning(columns: &[Cow<'static, str>]) -> Result<String> {
    let mut out = String::new();
    let mut context = Context::new(Fragment::SqlReturning);
    crate::OracleSqlWriter::new().write_returning(&mut context, &mut out, columns)?;
    Ok(out)
}
