mod contest_core;
mod spec;
mod store;

pub use contest_core::{Contest, ContestOption};
pub use spec::{NewContest, MAX_WINDOW_SECS};
pub use store::ContestStore;
