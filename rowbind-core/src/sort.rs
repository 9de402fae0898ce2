use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    ASC,
    DESC,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortKey {
    Column(Cow<'static, str>),
    Sort(Box<Sort>),
}

/// Ordering descriptor, a key with an optional direction followed by the next key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub order: Option<Order>,
    pub next: Option<Box<Sort>>,
}

impl Sort {
    pub fn new(column: impl Into<Cow<'static, str>>, order: Option<Order>) -> Self {
        Self {
            key: SortKey::Column(column.into()),
            order,
            next: None,
        }
    }

    pub fn asc(column: impl Into<Cow<'static, str>>) -> Self {
        Self::new(column, Some(Order::ASC))
    }

    pub fn desc(column: impl Into<Cow<'static, str>>) -> Self {
        Self::new(column, Some(Order::DESC))
    }

    /// Wrap another sort as key of this one.
    pub fn nested(sort: Sort, order: Option<Order>) -> Self {
        Self {
            key: SortKey::Sort(sort.into()),
            order,
            next: None,
        }
    }

    /// Append `next` at the end of the chain.
    pub fn then(mut self, next: Sort) -> Self {
        self.next = Some(match self.next.take() {
            Some(current) => (*current).then(next).into(),
            None => next.into(),
        });
        self
    }

    /// The keys of the chain, starting from this one.
    pub fn iter(&self) -> impl Iterator<Item = &Sort> {
        std::iter::successors(Some(self), |v| v.next.as_deref())
    }
}

impl Display for Sort {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::compile_order(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain() {
        let sort = Sort::asc("NAME")
            .then(Sort::new("CITY", None))
            .then(Sort::desc("ID"));
        assert_eq!(sort.iter().count(), 3);
        assert_eq!(sort.iter().last().and_then(|v| v.order), Some(Order::DESC));
        assert_eq!(sort.to_string(), "NAME ASC, CITY, ID DESC");
    }
}
