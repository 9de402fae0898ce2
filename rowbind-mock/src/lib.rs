mod connection;
mod cursor;
mod driver;
mod prepared;
mod script;

pub use connection::*;
pub use cursor::*;
pub use driver::*;
pub use prepared::*;
pub use script::*;

use log::LevelFilter;
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}
