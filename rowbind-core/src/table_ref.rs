use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
};

/// Schema qualified relation name.
#[derive(Default, Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: Cow<'static, str>,
    pub name: Cow<'static, str>,
}

impl TableRef {
    pub fn new(schema: impl Into<Cow<'static, str>>, name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// `schema.name`, or just `name` when the schema is empty.
    pub fn full_name(&self) -> String {
        let mut result = String::with_capacity(self.schema.len() + self.name.len() + 1);
        if !self.schema.is_empty() {
            result.push_str(&self.schema);
            result.push('.');
        }
        result.push_str(&self.name);
        result
    }
}

impl Display for TableRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

impl From<&'static str> for TableRef {
    fn from(value: &'static str) -> Self {
        match value.split_once('.') {
            Some((schema, name)) => TableRef::new(schema, name),
            None => TableRef::new("", value),
        }
    }
}
