// Warden Token Ledger Boundary
// This module abstracts the token primitive the protocol drives. State
// transitions never move balances themselves; they call into a TokenLedger
// and the host decides what backs it. MemoryTokenLedger backs tests and
// simulations.

use crate::crypto::{Hash, PublicKey};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token account not found: {0}")]
    AccountNotFound(PublicKey),

    #[error("token account already exists: {0}")]
    AccountAlreadyExists(PublicKey),

    #[error("mint not found: {0}")]
    MintNotFound(Hash),

    #[error("mint already exists: {0}")]
    MintAlreadyExists(Hash),

    #[error("source and destination accounts belong to different mints")]
    MintMismatch,

    #[error("decimals mismatch: expected {expected}, got {actual}")]
    DecimalsMismatch { expected: u8, actual: u8 },

    #[error("insufficient balance: needed {needed}, available {available}")]
    InsufficientBalance { needed: u64, available: u64 },

    #[error("cannot close account with non-zero balance: {balance}")]
    NonZeroBalance { balance: u64 },

    #[error("authority does not hold close authority over the account")]
    MissingCloseAuthority,

    #[error("balance overflow")]
    BalanceOverflow,
}

/// A token kind tracked by the ledger
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenMint {
    pub id: Hash,
    pub decimals: u8,
    pub supply: u64,
}

/// A balance-holding account
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TokenAccount {
    pub mint: Hash,
    pub owner: PublicKey,
    pub balance: u64,
    /// Key allowed to close the account; the owner when unset
    pub close_authority: Option<PublicKey>,
}

impl TokenAccount {
    /// Effective close authority, falling back to the owner
    pub fn effective_close_authority(&self) -> &PublicKey {
        self.close_authority.as_ref().unwrap_or(&self.owner)
    }
}

/// The token primitive surface the protocol drives
pub trait TokenLedger {
    fn create_mint(&mut self, id: Hash, decimals: u8) -> Result<(), TokenError>;

    fn create_account(
        &mut self,
        address: PublicKey,
        mint: &Hash,
        owner: PublicKey,
        close_authority: Option<PublicKey>,
    ) -> Result<(), TokenError>;

    fn mint_to(&mut self, mint: &Hash, account: &PublicKey, amount: u64) -> Result<(), TokenError>;

    /// Move `amount` between accounts of the same mint, checking the caller's
    /// expectation of the mint's decimals
    fn transfer_checked(
        &mut self,
        source: &PublicKey,
        destination: &PublicKey,
        amount: u64,
        decimals: u8,
    ) -> Result<(), TokenError>;

    /// Close an emptied account. The authority must hold close authority.
    fn close_account(&mut self, address: &PublicKey, authority: &PublicKey)
        -> Result<(), TokenError>;

    fn account(&self, address: &PublicKey) -> Option<&TokenAccount>;

    fn mint(&self, id: &Hash) -> Option<&TokenMint>;
}

/// In-memory ledger with deterministic iteration order
#[derive(Default, Debug, Clone)]
pub struct MemoryTokenLedger {
    mints: IndexMap<Hash, TokenMint>,
    accounts: IndexMap<PublicKey, TokenAccount>,
}

impl MemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate all live accounts in creation order
    pub fn accounts(&self) -> impl Iterator<Item = (&PublicKey, &TokenAccount)> {
        self.accounts.iter()
    }

    /// Sum of balances held in accounts of `mint`
    pub fn circulating(&self, mint: &Hash) -> u64 {
        self.accounts
            .values()
            .filter(|account| account.mint == *mint)
            .map(|account| account.balance)
            .sum()
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn create_mint(&mut self, id: Hash, decimals: u8) -> Result<(), TokenError> {
        if self.mints.contains_key(&id) {
            return Err(TokenError::MintAlreadyExists(id));
        }
        self.mints.insert(
            id.clone(),
            TokenMint {
                id,
                decimals,
                supply: 0,
            },
        );
        Ok(())
    }

    fn create_account(
        &mut self,
        address: PublicKey,
        mint: &Hash,
        owner: PublicKey,
        close_authority: Option<PublicKey>,
    ) -> Result<(), TokenError> {
        if !self.mints.contains_key(mint) {
            return Err(TokenError::MintNotFound(mint.clone()));
        }
        if self.accounts.contains_key(&address) {
            return Err(TokenError::AccountAlreadyExists(address));
        }
        self.accounts.insert(
            address,
            TokenAccount {
                mint: mint.clone(),
                owner,
                balance: 0,
                close_authority,
            },
        );
        Ok(())
    }

    fn mint_to(&mut self, mint: &Hash, account: &PublicKey, amount: u64) -> Result<(), TokenError> {
        let target = self
            .accounts
            .get(account)
            .ok_or(TokenError::AccountNotFound(*account))?;
        if target.mint != *mint {
            return Err(TokenError::MintMismatch);
        }

        let mint_state = self
            .mints
            .get(mint)
            .ok_or_else(|| TokenError::MintNotFound(mint.clone()))?;
        let new_supply = mint_state
            .supply
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow)?;
        let new_balance = target
            .balance
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow)?;

        // All checks passed, apply both sides
        self.mints[mint].supply = new_supply;
        self.accounts[account].balance = new_balance;
        Ok(())
    }

    fn transfer_checked(
        &mut self,
        source: &PublicKey,
        destination: &PublicKey,
        amount: u64,
        decimals: u8,
    ) -> Result<(), TokenError> {
        let source_account = self
            .accounts
            .get(source)
            .ok_or(TokenError::AccountNotFound(*source))?;
        let destination_account = self
            .accounts
            .get(destination)
            .ok_or(TokenError::AccountNotFound(*destination))?;

        if source_account.mint != destination_account.mint {
            return Err(TokenError::MintMismatch);
        }

        let mint = self
            .mints
            .get(&source_account.mint)
            .ok_or_else(|| TokenError::MintNotFound(source_account.mint.clone()))?;
        if mint.decimals != decimals {
            return Err(TokenError::DecimalsMismatch {
                expected: mint.decimals,
                actual: decimals,
            });
        }

        if source_account.balance < amount {
            return Err(TokenError::InsufficientBalance {
                needed: amount,
                available: source_account.balance,
            });
        }

        // Validate the credit before debiting anything
        let credited = if source == destination {
            source_account.balance
        } else {
            destination_account
                .balance
                .checked_add(amount)
                .ok_or(TokenError::BalanceOverflow)?
        };

        if source != destination {
            self.accounts[source].balance -= amount;
            self.accounts[destination].balance = credited;
        }
        Ok(())
    }

    fn close_account(
        &mut self,
        address: &PublicKey,
        authority: &PublicKey,
    ) -> Result<(), TokenError> {
        let account = self
            .accounts
            .get(address)
            .ok_or(TokenError::AccountNotFound(*address))?;

        if account.balance != 0 {
            return Err(TokenError::NonZeroBalance {
                balance: account.balance,
            });
        }

        if account.effective_close_authority() != authority {
            return Err(TokenError::MissingCloseAuthority);
        }

        self.accounts.shift_remove(address);
        Ok(())
    }

    fn account(&self, address: &PublicKey) -> Option<&TokenAccount> {
        self.accounts.get(address)
    }

    fn mint(&self, id: &Hash) -> Option<&TokenMint> {
        self.mints.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash;

    const DECIMALS: u8 = 6;

    fn key(tag: u8) -> PublicKey {
        PublicKey::from_bytes([tag; 32])
    }

    fn setup() -> (MemoryTokenLedger, Hash) {
        let mut ledger = MemoryTokenLedger::new();
        let mint = hash(b"warden-token");
        ledger.create_mint(mint.clone(), DECIMALS).unwrap();
        ledger
            .create_account(key(1), &mint, key(11), Some(key(99)))
            .unwrap();
        ledger
            .create_account(key(2), &mint, key(12), Some(key(99)))
            .unwrap();
        ledger.mint_to(&mint, &key(1), 1_000).unwrap();
        (ledger, mint)
    }

    #[test]
    fn test_mint_and_transfer() {
        let (mut ledger, mint) = setup();

        ledger
            .transfer_checked(&key(1), &key(2), 400, DECIMALS)
            .unwrap();

        assert_eq!(ledger.account(&key(1)).unwrap().balance, 600);
        assert_eq!(ledger.account(&key(2)).unwrap().balance, 400);
        assert_eq!(ledger.mint(&mint).unwrap().supply, 1_000);
        assert_eq!(ledger.circulating(&mint), 1_000);
    }

    #[test]
    fn test_insufficient_balance() {
        let (mut ledger, _) = setup();

        let result = ledger.transfer_checked(&key(1), &key(2), 1_001, DECIMALS);
        assert_eq!(
            result.unwrap_err(),
            TokenError::InsufficientBalance {
                needed: 1_001,
                available: 1_000
            }
        );
        // Nothing moved
        assert_eq!(ledger.account(&key(1)).unwrap().balance, 1_000);
        assert_eq!(ledger.account(&key(2)).unwrap().balance, 0);
    }

    #[test]
    fn test_decimals_mismatch() {
        let (mut ledger, _) = setup();

        let result = ledger.transfer_checked(&key(1), &key(2), 100, DECIMALS + 1);
        assert_eq!(
            result.unwrap_err(),
            TokenError::DecimalsMismatch {
                expected: DECIMALS,
                actual: DECIMALS + 1
            }
        );
    }

    #[test]
    fn test_cross_mint_transfer_rejected() {
        let (mut ledger, _) = setup();
        let other_mint = hash(b"other-token");
        ledger.create_mint(other_mint.clone(), DECIMALS).unwrap();
        ledger
            .create_account(key(3), &other_mint, key(13), None)
            .unwrap();

        let result = ledger.transfer_checked(&key(1), &key(3), 100, DECIMALS);
        assert_eq!(result.unwrap_err(), TokenError::MintMismatch);
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let (mut ledger, mint) = setup();

        let result = ledger.create_account(key(1), &mint, key(11), None);
        assert_eq!(result.unwrap_err(), TokenError::AccountAlreadyExists(key(1)));
    }

    #[test]
    fn test_mint_to_unknown_account() {
        let (mut ledger, mint) = setup();

        let result = ledger.mint_to(&mint, &key(9), 100);
        assert_eq!(result.unwrap_err(), TokenError::AccountNotFound(key(9)));
    }

    #[test]
    fn test_close_requires_zero_balance() {
        let (mut ledger, _) = setup();

        let result = ledger.close_account(&key(1), &key(99));
        assert_eq!(
            result.unwrap_err(),
            TokenError::NonZeroBalance { balance: 1_000 }
        );
    }

    #[test]
    fn test_close_requires_authority() {
        let (mut ledger, _) = setup();

        // Account 2 is empty but key(12) is only the owner, not the close
        // authority set at creation
        let result = ledger.close_account(&key(2), &key(12));
        assert_eq!(result.unwrap_err(), TokenError::MissingCloseAuthority);

        ledger.close_account(&key(2), &key(99)).unwrap();
        assert!(ledger.account(&key(2)).is_none());
    }

    #[test]
    fn test_owner_closes_when_no_authority_set() {
        let (mut ledger, mint) = setup();
        ledger
            .create_account(key(4), &mint, key(14), None)
            .unwrap();

        ledger.close_account(&key(4), &key(14)).unwrap();
        assert!(ledger.account(&key(4)).is_none());
    }

    #[test]
    fn test_self_transfer_is_noop() {
        let (mut ledger, _) = setup();

        ledger
            .transfer_checked(&key(1), &key(1), 500, DECIMALS)
            .unwrap();
        assert_eq!(ledger.account(&key(1)).unwrap().balance, 1_000);
    }

    #[test]
    fn test_supply_overflow_rejected() {
        let (mut ledger, mint) = setup();

        let result = ledger.mint_to(&mint, &key(2), u64::MAX);
        assert_eq!(result.unwrap_err(), TokenError::BalanceOverflow);
        // State untouched on failure
        assert_eq!(ledger.mint(&mint).unwrap().supply, 1_000);
        assert_eq!(ledger.account(&key(2)).unwrap().balance, 0);
    }
}
