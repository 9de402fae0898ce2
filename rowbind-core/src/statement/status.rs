use std::fmt::{self, Display, Formatter};

/// Lifecycle of a statement: prepared once, executed any number of times, then closed.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    #[default]
    Unprepared,
    Prepared,
    Closed,
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::Unprepared => "unprepared",
            State::Prepared => "prepared",
            State::Closed => "closed",
        })
    }
}
