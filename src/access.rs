//! Access Control - owner and platform-admin roles
//!
//! Both roles are single identities. They are set at construction and change
//! only through owner-gated assignment.

use crate::core_types::AccountId;
use crate::error::{Role, WalletError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessControl {
    owner: AccountId,
    platform_admin: AccountId,
}

impl AccessControl {
    pub fn new(owner: AccountId, platform_admin: AccountId) -> Self {
        Self {
            owner,
            platform_admin,
        }
    }

    #[inline]
    pub fn owner(&self) -> AccountId {
        self.owner
    }

    #[inline]
    pub fn platform_admin(&self) -> AccountId {
        self.platform_admin
    }

    // ============================================================
    // GUARDS
    // ============================================================

    pub fn only_owner(&self, caller: AccountId) -> Result<(), WalletError> {
        if caller != self.owner {
            return Err(WalletError::Unauthorized(Role::Owner));
        }
        Ok(())
    }

    pub fn only_platform_admin(&self, caller: AccountId) -> Result<(), WalletError> {
        if caller != self.platform_admin {
            return Err(WalletError::Unauthorized(Role::PlatformAdmin));
        }
        Ok(())
    }

    // ============================================================
    // ROLE ASSIGNMENT (owner-gated)
    // ============================================================

    /// Returns the previous owner. Transferring to the current owner is allowed.
    pub fn transfer_ownership(
        &mut self,
        caller: AccountId,
        new_owner: AccountId,
    ) -> Result<AccountId, WalletError> {
        self.only_owner(caller)?;
        Ok(std::mem::replace(&mut self.owner, new_owner))
    }

    /// Returns the previous platform admin.
    pub fn set_platform_admin(
        &mut self,
        caller: AccountId,
        admin: AccountId,
    ) -> Result<AccountId, WalletError> {
        self.only_owner(caller)?;
        Ok(std::mem::replace(&mut self.platform_admin, admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: AccountId = 1;
    const ADMIN: AccountId = 2;
    const STRANGER: AccountId = 9;

    #[test]
    fn test_guards() {
        let acl = AccessControl::new(OWNER, ADMIN);
        assert!(acl.only_owner(OWNER).is_ok());
        assert_eq!(
            acl.only_owner(ADMIN),
            Err(WalletError::Unauthorized(Role::Owner))
        );
        assert!(acl.only_platform_admin(ADMIN).is_ok());
        assert_eq!(
            acl.only_platform_admin(OWNER),
            Err(WalletError::Unauthorized(Role::PlatformAdmin))
        );
    }

    #[test]
    fn test_transfer_ownership() {
        let mut acl = AccessControl::new(OWNER, ADMIN);
        assert_eq!(acl.transfer_ownership(OWNER, STRANGER), Ok(OWNER));
        assert_eq!(acl.owner(), STRANGER);

        // old owner lost the role
        assert!(acl.transfer_ownership(OWNER, OWNER).is_err());
        assert_eq!(acl.owner(), STRANGER);
    }

    #[test]
    fn test_transfer_to_self_is_permitted() {
        let mut acl = AccessControl::new(OWNER, ADMIN);
        assert_eq!(acl.transfer_ownership(OWNER, OWNER), Ok(OWNER));
        assert_eq!(acl.owner(), OWNER);
    }

    #[test]
    fn test_non_owner_cannot_set_admin() {
        let mut acl = AccessControl::new(OWNER, ADMIN);
        assert!(acl.set_platform_admin(ADMIN, STRANGER).is_err());
        assert_eq!(acl.platform_admin(), ADMIN);

        assert_eq!(acl.set_platform_admin(OWNER, STRANGER), Ok(ADMIN));
        assert_eq!(acl.platform_admin(), STRANGER);
    }
}
