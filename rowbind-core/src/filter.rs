use crate::{AsValue, Entity, Value, separated_by};
use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
    sync::Arc,
};

/// Operator joining the two operands of a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
    Eq,
    NotEq,
    Gt,
    Ge,
    Lt,
    Le,
    /// Starts with.
    Sw,
    NotSw,
    /// Ends with.
    Ew,
    NotEw,
    /// Contains.
    Co,
    NotCo,
    In,
    NotIn,
    Hierarchy,
    /// No predicate at all, see [`Filter::NOP`].
    Nop,
}

impl Operator {
    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::And | Operator::Or)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Operator::Eq
                | Operator::NotEq
                | Operator::Gt
                | Operator::Ge
                | Operator::Lt
                | Operator::Le
        )
    }

    pub fn is_like(&self) -> bool {
        matches!(
            self,
            Operator::Sw
                | Operator::NotSw
                | Operator::Ew
                | Operator::NotEw
                | Operator::Co
                | Operator::NotCo
        )
    }

    pub fn is_membership(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn | Operator::Hierarchy)
    }

    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            Operator::NotEq | Operator::NotSw | Operator::NotEw | Operator::NotCo | Operator::NotIn
        )
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Sw => "SW",
            Operator::NotSw => "NOT SW",
            Operator::Ew => "EW",
            Operator::NotEw => "NOT EW",
            Operator::Co => "CO",
            Operator::NotCo => "NOT CO",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Hierarchy => "HIERARCHY",
            Operator::Nop => "NOP",
        })
    }
}

/// Nested query used as membership operand: the primary column of `entity` filtered by `filter`.
#[derive(Debug, Clone, PartialEq)]
pub struct Subselect {
    pub entity: Arc<Entity>,
    pub filter: Filter,
}

impl Subselect {
    pub fn new(entity: Arc<Entity>, filter: Filter) -> Self {
        Self { entity, filter }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(Cow<'static, str>),
    Filter(Box<Filter>),
    Entity(Arc<Entity>),
    Select(Box<Subselect>),
    Value(Value),
    Collection(Vec<Value>),
    Null,
}

impl Operand {
    pub fn column(name: impl Into<Cow<'static, str>>) -> Self {
        Operand::Column(name.into())
    }

    pub fn collection<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        Operand::Collection(values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Operand::Null | Operand::Value(Value::Null))
    }
}

impl<T: AsValue> From<T> for Operand {
    fn from(value: T) -> Self {
        Value::from(value).into()
    }
}

impl From<&str> for Operand {
    fn from(value: &str) -> Self {
        Operand::Value(value.into())
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Operand::Null,
            v => Operand::Value(v),
        }
    }
}

impl From<Filter> for Operand {
    fn from(value: Filter) -> Self {
        Operand::Filter(value.into())
    }
}

impl From<Arc<Entity>> for Operand {
    fn from(value: Arc<Entity>) -> Self {
        Operand::Entity(value)
    }
}

impl From<Subselect> for Operand {
    fn from(value: Subselect) -> Self {
        Operand::Select(value.into())
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Column(v) => f.write_str(v),
            Operand::Filter(v) => v.fmt(f),
            Operand::Entity(v) => v.fmt(f),
            Operand::Select(v) => write!(
                f,
                "(SELECT {} FROM {} WHERE {})",
                v.entity.primary(),
                v.entity,
                v.filter
            ),
            Operand::Value(Value::Varchar(v)) => write!(f, "'{}'", v),
            Operand::Value(v) => v.fmt(f),
            Operand::Collection(values) => {
                let mut out = String::new();
                separated_by(
                    &mut out,
                    values,
                    |out, v| out.push_str(&v.to_string()),
                    ", ",
                );
                write!(f, "[{}]", out)
            }
            Operand::Null => f.write_str("NULL"),
        }
    }
}

/// Immutable binary predicate tree.
///
/// Logical operators join two nested filters, every other operator compares a column (or an entity,
/// standing for its primary column) against a literal, a collection or a nested query.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub first: Operand,
    pub operator: Operator,
    pub second: Operand,
}

impl Filter {
    /// The absence of a predicate.
    pub const NOP: Filter = Filter {
        first: Operand::Null,
        operator: Operator::Nop,
        second: Operand::Null,
    };

    pub fn new(first: impl Into<Operand>, operator: Operator, second: impl Into<Operand>) -> Self {
        Self {
            first: first.into(),
            operator,
            second: second.into(),
        }
    }

    /// Compare the column `first` against `second`.
    pub fn build(
        first: impl Into<Cow<'static, str>>,
        second: impl Into<Operand>,
        operator: Operator,
    ) -> Self {
        Self::new(Operand::column(first), operator, second)
    }

    pub fn equal(column: impl Into<Cow<'static, str>>, value: impl Into<Operand>) -> Self {
        Self::build(column, value, Operator::Eq)
    }
    pub fn not_equal(column: impl Into<Cow<'static, str>>, value: impl Into<Operand>) -> Self {
        Self::build(column, value, Operator::NotEq)
    }
    pub fn greater(column: impl Into<Cow<'static, str>>, value: impl Into<Operand>) -> Self {
        Self::build(column, value, Operator::Gt)
    }
    pub fn greater_equal(column: impl Into<Cow<'static, str>>, value: impl Into<Operand>) -> Self {
        Self::build(column, value, Operator::Ge)
    }
    pub fn less(column: impl Into<Cow<'static, str>>, value: impl Into<Operand>) -> Self {
        Self::build(column, value, Operator::Lt)
    }
    pub fn less_equal(column: impl Into<Cow<'static, str>>, value: impl Into<Operand>) -> Self {
        Self::build(column, value, Operator::Le)
    }
    pub fn is_null(column: impl Into<Cow<'static, str>>) -> Self {
        Self::build(column, Operand::Null, Operator::Eq)
    }
    pub fn is_not_null(column: impl Into<Cow<'static, str>>) -> Self {
        Self::build(column, Operand::Null, Operator::NotEq)
    }
    pub fn starts_with(column: impl Into<Cow<'static, str>>, value: impl Into<Operand>) -> Self {
        Self::build(column, value, Operator::Sw)
    }
    pub fn ends_with(column: impl Into<Cow<'static, str>>, value: impl Into<Operand>) -> Self {
        Self::build(column, value, Operator::Ew)
    }
    pub fn contains(column: impl Into<Cow<'static, str>>, value: impl Into<Operand>) -> Self {
        Self::build(column, value, Operator::Co)
    }
    pub fn in_list<T: Into<Value>>(
        column: impl Into<Cow<'static, str>>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::build(column, Operand::collection(values), Operator::In)
    }
    pub fn not_in_list<T: Into<Value>>(
        column: impl Into<Cow<'static, str>>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        Self::build(column, Operand::collection(values), Operator::NotIn)
    }

    pub fn is_nop(&self) -> bool {
        self.operator == Operator::Nop
    }

    /// Conjunction, a NOP side yields the other side unchanged.
    pub fn and(self, other: Filter) -> Filter {
        Self::combine(self, other, Operator::And)
    }

    /// Disjunction, a NOP side yields the other side unchanged.
    pub fn or(self, other: Filter) -> Filter {
        Self::combine(self, other, Operator::Or)
    }

    fn combine(first: Filter, second: Filter, operator: Operator) -> Filter {
        match (first.is_nop(), second.is_nop()) {
            (true, _) => second,
            (false, true) => first,
            (false, false) => Filter::new(first, operator, second),
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Filter::NOP
    }
}

impl Display for Filter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_nop() {
            return f.write_str("NOP");
        }
        write!(f, "({} {} {})", self.first, self.operator, self.second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nop_collapses() {
        let filter = Filter::equal("ID", 1);
        assert_eq!(Filter::NOP.and(filter.clone()), filter);
        assert_eq!(filter.clone().or(Filter::NOP), filter);
        assert!(Filter::NOP.and(Filter::NOP).is_nop());
        let both = filter.clone().and(Filter::is_null("NAME"));
        assert_eq!(both.operator, Operator::And);
        assert_eq!(both.first, Operand::Filter(filter.into()));
    }

    #[test]
    fn null_operands() {
        assert!(Filter::equal("NAME", Option::<String>::None).second.is_null());
        assert!(Filter::is_not_null("NAME").second.is_null());
        assert!(!Filter::equal("NAME", "").second.is_null());
    }

    #[test]
    fn display() {
        let filter = Filter::starts_with("NAME", "A*").and(Filter::in_list("ROLE", [1, 2]));
        assert_eq!(
            filter.to_string(),
            "((NAME SW 'A*') AND (ROLE IN [1, 2]))"
        );
    }
}
