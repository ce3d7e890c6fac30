use std::path::{Path, PathBuf};

use log::{error, info, warn};
use rocket::{
    fairing::{Fairing, Info, Kind},
    tokio::sync::RwLock,
    Build, Rocket,
};
use serde::Deserialize;

use crate::error::Result;
use crate::model::{
    audit::{load_log, JsonLinesSink, LogHeader, MemorySink},
    common::{ContestPolicy, Principal},
    ledger::Ledger,
};

/// The ledger as managed state. Commands take the write lock, so they are
/// applied one at a time in the order they acquire it.
pub type SharedLedger = RwLock<Ledger>;

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Deserialize)]
pub struct Config {
    // non-secrets
    owner: Principal,
    #[serde(default)]
    audit_log_path: Option<PathBuf>,
    #[serde(default)]
    policy: ContestPolicy,
    // secrets
    jwt_secret: String,
}

impl Config {
    /// The principal a new ledger is bootstrapped with. An existing audit log
    /// keeps the owner recorded in its header.
    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    /// Where the audit log is persisted, if anywhere.
    pub fn audit_log_path(&self) -> Option<&Path> {
        self.audit_log_path.as_deref()
    }

    pub fn policy(&self) -> &ContestPolicy {
        &self.policy
    }

    /// Secret key used to verify caller tokens.
    pub fn jwt_secret(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Build the ledger, replaying the persisted audit log if there is one.
    ///
    /// A persisted log is replayed under the owner and policy in its header,
    /// which win over the configured ones.
    pub fn open_ledger(&self) -> Result<Ledger> {
        let Some(path) = self.audit_log_path() else {
            return Ledger::new(self.owner.clone(), self.policy, Box::new(MemorySink));
        };

        let (header, records) = match load_log(path)? {
            Some(dump) => {
                let header = LogHeader {
                    genesis_owner: dump.genesis_owner,
                    policy: dump.policy,
                };
                if header.genesis_owner != self.owner || header.policy != self.policy {
                    warn!(
                        "{} was started under owner {} and {:?}; ignoring the configured owner and policy",
                        path.display(),
                        header.genesis_owner,
                        header.policy
                    );
                }
                (header, dump.records)
            }
            None => (
                LogHeader {
                    genesis_owner: self.owner.clone(),
                    policy: self.policy,
                },
                Vec::new(),
            ),
        };
        let sink = JsonLinesSink::open(path, &header)?;
        info!(
            "Replaying {} audit records from {}",
            records.len(),
            path.display()
        );
        Ledger::replay(header.genesis_owner, header.policy, &records, Box::new(sink))
    }
}

/// A fairing that loads the application config and puts it in managed state.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that builds the [`Ledger`] from the managed [`Config`] and
/// places it into managed state as a [`SharedLedger`]. Must be attached after
/// [`ConfigFairing`].
pub struct LedgerFairing;

#[rocket::async_trait]
impl Fairing for LedgerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Ledger",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let Some(config) = rocket.state::<Config>() else {
            error!("Ledger requires the application config");
            return Err(rocket);
        };
        let ledger = match config.open_ledger() {
            Ok(ledger) => ledger,
            Err(e) => {
                error!("Failed to open the ledger: {e}");
                return Err(rocket);
            }
        };
        info!(
            "Ledger online: owner {}, {} contests, {} audit records",
            ledger.access().owner(),
            ledger.contests().contests().len(),
            ledger.audit().len()
        );

        // Manage the state.
        rocket = rocket.manage(SharedLedger::new(ledger));
        Ok(rocket)
    }
}
