//! Owner and admin-set checks.

use ballotvest_core::error::BallotvestError;
use ballotvest_core::event::Event;
use ballotvest_core::types::Address;
use tracing::debug;

use crate::db::StateDb;
use crate::engine::Step;

/// Read side of access control. Guards are called at the top of each
/// privileged operation.
pub struct AccessControl<'a> {
    db: &'a StateDb,
}

impl<'a> AccessControl<'a> {
    pub fn new(db: &'a StateDb) -> Self {
        Self { db }
    }

    pub fn owner(&self) -> Result<Address, BallotvestError> {
        self.db.get_owner()?.ok_or(BallotvestError::NotInitialised)
    }

    pub fn is_admin(&self, account: &Address) -> Result<bool, BallotvestError> {
        self.db.is_admin(account)
    }

    /// Owner or a member of the admin set.
    pub fn is_authorized(&self, account: &Address) -> Result<bool, BallotvestError> {
        Ok(*account == self.owner()? || self.db.is_admin(account)?)
    }

    pub fn require_owner(&self, caller: &Address) -> Result<(), BallotvestError> {
        if *caller != self.owner()? {
            return Err(BallotvestError::NotOwner(caller.to_string()));
        }
        Ok(())
    }

    pub fn require_authorized(&self, caller: &Address) -> Result<(), BallotvestError> {
        if !self.is_authorized(caller)? {
            return Err(BallotvestError::NotAuthorized(caller.to_string()));
        }
        Ok(())
    }
}

/// Toggle admin membership. Owner only.
pub(crate) fn set_admin(
    step: &mut Step<'_>,
    caller: &Address,
    account: &Address,
    authorized: bool,
) -> Result<(), BallotvestError> {
    AccessControl::new(step.db).require_owner(caller)?;

    step.staged.admins.push((*account, authorized));
    step.emit(Event::AdminUpdated { account: *account, authorized });
    debug!(%account, authorized, "admin membership staged");
    Ok(())
}
