mod connection;
mod driver;
mod entity;
mod error;
mod filter;
mod parameter;
mod query;
mod resource;
mod sort;
mod statement;
mod table_ref;
mod util;
mod value;
pub mod writer;

pub use ::anyhow::Context;
pub use connection::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use filter::*;
pub use parameter::*;
pub use query::*;
pub use resource::*;
pub use sort::*;
pub use statement::*;
pub use table_ref::*;
pub use util::*;
pub use value::*;
pub use writer::*;
