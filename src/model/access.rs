use crate::error::{Error, Result};
use crate::model::{audit::ContestEvent, common::Principal};

/// Holds the single, transferable owner principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRegistry {
    owner: Principal,
}

impl AccessRegistry {
    /// Bootstrap the registry with its first owner.
    pub fn new(owner: Principal) -> Result<Self> {
        if owner.is_null() {
            return Err(Error::invalid("The owner cannot be the null principal"));
        }
        Ok(Self { owner })
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    pub fn is_owner(&self, principal: &Principal) -> bool {
        self.owner == *principal
    }

    /// Fail with `Unauthorized` unless `caller` is the owner.
    pub fn require_owner(&self, caller: &Principal, action: &str) -> Result<()> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(Error::unauthorized(format!(
                "Only the owner may {action}; {caller} is not the owner"
            )))
        }
    }

    /// Validate a transfer of ownership, yielding the event that performs it.
    pub fn transfer_ownership(&self, caller: &Principal, new_owner: &Principal) -> Result<ContestEvent> {
        self.require_owner(caller, "transfer ownership")?;
        if new_owner.is_null() {
            return Err(Error::invalid("The new owner cannot be the null principal"));
        }
        Ok(ContestEvent::OwnershipTransferred {
            old: self.owner.clone(),
            new: new_owner.clone(),
        })
    }

    /// Apply an ownership event. Other events are ignored.
    pub fn apply(&mut self, event: &ContestEvent) -> Result<()> {
        if let ContestEvent::OwnershipTransferred { old, new } = event {
            if *old != self.owner {
                return Err(Error::Corrupt(format!(
                    "ownership transfer from {old}, but the owner is {}",
                    self.owner
                )));
            }
            self.owner = new.clone();
        }
        Ok(())
    }
}
