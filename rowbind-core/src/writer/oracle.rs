use crate::{
    Result, separated_by,
    writer::{Context, SqlWriter},
};
use std::borrow::Cow;

/// Vendor dialect reporting the modified row through `RETURNING … INTO`.
#[derive(Default, Debug, Clone, Copy)]
pub struct OracleSqlWriter;

impl OracleSqlWriter {
    pub const fn new() -> Self {
        Self
    }
}

impl SqlWriter for OracleSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn supports_returning(&self) -> bool {
        true
    }

    /// The `?` of the INTO list are output positions, they don't produce bind parameters.
    fn write_returning(
        &self,
        context: &mut Context,
        out: &mut String,
        columns: &[Cow<'static, str>],
    ) -> Result<()> {
        if columns.is_empty() {
            return Ok(());
        }
        out.push_str(" RETURNING ");
        separated_by(
            out,
            columns,
            |out, v| self.write_identifier(context, out, v),
            ", ",
        );
        out.push_str(" INTO ");
        separated_by(out, columns, |out, _| out.push('?'), ", ");
        Ok(())
    }
}
