mod context;
mod oracle;
mod sql_writer;

pub use context::*;
pub use oracle::*;
pub use sql_writer::*;
