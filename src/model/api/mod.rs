//! Types exchanged with HTTP clients.

pub mod auth;
pub mod contest;
