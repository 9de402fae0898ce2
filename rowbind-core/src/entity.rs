use crate::{Error, Result, TableRef};
use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
};

/// A projected column and the label it is selected as.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Projection {
    pub column: Cow<'static, str>,
    pub alias: Cow<'static, str>,
}

impl Projection {
    pub fn new(column: impl Into<Cow<'static, str>>, alias: impl Into<Cow<'static, str>>) -> Self {
        let column = column.into();
        let alias = alias.into();
        Self {
            alias: if alias.is_empty() {
                column.clone()
            } else {
                alias
            },
            column,
        }
    }
}

impl From<&'static str> for Projection {
    fn from(value: &'static str) -> Self {
        Projection::new(value, value)
    }
}

impl From<String> for Projection {
    fn from(value: String) -> Self {
        Projection::new(value.clone(), value)
    }
}

impl<C, A> From<(C, A)> for Projection
where
    C: Into<Cow<'static, str>>,
    A: Into<Cow<'static, str>>,
{
    fn from((column, alias): (C, A)) -> Self {
        Projection::new(column, alias)
    }
}

/// Relation descriptor: table, primary key column and the ordered projection.
///
/// The primary column is always the first projected column. Entities are immutable once built and
/// are usually shared through an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    table: TableRef,
    primary: Cow<'static, str>,
    projection: Vec<Projection>,
}

impl Entity {
    pub fn new<P: Into<Projection>>(
        table: impl Into<TableRef>,
        primary: impl Into<Cow<'static, str>>,
        projection: impl IntoIterator<Item = P>,
    ) -> Result<Self> {
        let table = table.into();
        let primary = primary.into();
        if table.name.is_empty() {
            return Err(Error::argument_null("table"));
        }
        if primary.is_empty() {
            return Err(Error::argument_null("primary"));
        }
        let mut projection: Vec<Projection> = projection.into_iter().map(Into::into).collect();
        let head = match projection.iter().position(|v| v.column == primary) {
            Some(i) => projection.remove(i),
            None => Projection::new(primary.clone(), primary.clone()),
        };
        projection.insert(0, head);
        Ok(Self {
            table,
            primary,
            projection,
        })
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn projection(&self) -> &[Projection] {
        &self.projection
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.projection.iter().map(|v| v.column.as_ref())
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.projection.iter().map(|v| v.alias.as_ref())
    }

    /// Projected column labelled `name`, matching the aliases first and then the column names.
    pub fn lookup(&self, name: &str) -> Option<&Projection> {
        self.projection
            .iter()
            .find(|v| v.alias == name)
            .or_else(|| self.projection.iter().find(|v| v.column == name))
    }

    pub fn qualified_name(&self) -> String {
        self.table.full_name()
    }
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.table.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn primary_goes_first() {
        let entity = Entity::new(
            "HR.EMPLOYEE",
            "ID",
            [("NAME", "name"), ("ID", "identifier"), ("SALARY", "")],
        )
        .unwrap();
        assert_eq!(entity.columns().collect::<Vec<_>>(), ["ID", "NAME", "SALARY"]);
        assert_eq!(
            entity.aliases().collect::<Vec<_>>(),
            ["identifier", "name", "SALARY"]
        );
        assert_eq!(entity.qualified_name(), "HR.EMPLOYEE");
        assert_eq!(entity.lookup("name").map(|v| v.column.as_ref()), Some("NAME"));
        assert_eq!(entity.lookup("ID").map(|v| v.alias.as_ref()), Some("identifier"));
        assert!(entity.lookup("BONUS").is_none());

        let entity = Entity::new("EMPLOYEE", "ID", ["NAME"]).unwrap();
        assert_eq!(entity.projection()[0], Projection::from("ID"));
        assert_eq!(entity.lookup("NAME").map(|v| v.column.as_ref()), Some("NAME"));
        assert_eq!(entity.qualified_name(), "EMPLOYEE");
    }

    #[test]
    fn primary_required() {
        let error = Entity::new("EMPLOYEE", "", ["NAME"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ArgumentNull);
    }
}
