mod contest;
mod policy;
mod principal;

pub use contest::{ContestId, OptionId, Phase, Timestamp};
pub use policy::{ContestPolicy, OptionFreeze, StartPolicy};
pub use principal::Principal;
