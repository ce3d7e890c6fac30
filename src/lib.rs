#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use std::sync::Arc;

use rocket::{Build, Rocket};

use crate::clock::{SharedClock, SystemClock};
use crate::config::{ConfigFairing, LedgerFairing};
use crate::logging::LoggerFairing;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

/// Build the server, configured from `Rocket.toml` and the environment.
pub fn build() -> Rocket<Build> {
    rocket_with_clock(rocket::build(), Arc::new(SystemClock))
}

fn rocket_with_clock(rocket: Rocket<Build>, clock: SharedClock) -> Rocket<Build> {
    rocket
        .mount("/", api::routes())
        .register("/", api::catchers())
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(LedgerFairing)
        .manage(clock)
}
