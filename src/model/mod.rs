pub mod access;
pub mod api;
pub mod audit;
pub mod command;
pub mod common;
pub mod contest;
pub mod ledger;
pub mod tally;
pub mod visibility;
