mod config;
mod count;
mod delete;
mod exists;
mod insert;
mod modify;
mod select;
mod statement;
mod status;
mod update;

pub use config::*;
pub use count::*;
pub use delete::*;
pub use exists::*;
pub use insert::*;
pub use modify::*;
pub use select::*;
pub use statement::*;
pub use status::*;
pub use update::*;
