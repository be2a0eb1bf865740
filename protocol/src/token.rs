//! # Token Ledger
//!
//! The token-standard slice the registry needs: mints with a designated
//! authority, holdings at derived addresses, and supply sealing. Nothing
//! more — no transfers, no delegates, no freezing logic. Objects in the
//! registry are represented by zero-decimal mints whose supply is sealed
//! at exactly one unit after the first issuance, and the registry only
//! ever needs to issue, seal, and prove possession.
//!
//! ## Holding addresses
//!
//! A holding (one owner's balance of one mint) lives at the derived
//! address `f(HOLDING_SEED, owner, mint)`. Deriving the address from the
//! pair means there is exactly one canonical holding per (owner, mint) and
//! callers never have to communicate holding addresses out of band.
//!
//! ## Sealing
//!
//! `seal_supply` fixes `max_supply` at the current supply, permanently.
//! Issuance against a sealed mint at its cap is rejected — this is the
//! ledger-level backstop that makes a collectible's "exactly one unit"
//! promise unforgeable, independent of any registry-level gating.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::address::{find_derived_address, Address};
use crate::config::HOLDING_SEED;

/// Errors that can occur during token ledger operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The referenced mint does not exist.
    #[error("mint not found: {0}")]
    MintNotFound(Address),

    /// A mint already exists at this address.
    #[error("mint already exists: {0}")]
    MintAlreadyExists(Address),

    /// The caller is not the mint's issuance authority.
    #[error("unauthorized: signer is not the mint authority")]
    UnauthorizedMintAuthority,

    /// Issuance would push supply past the sealed maximum.
    #[error("supply is sealed at {max_supply}; cannot issue {amount} more")]
    SupplySealed {
        /// The sealed maximum supply.
        max_supply: u64,
        /// The amount the caller tried to issue.
        amount: u64,
    },

    /// The mint's supply is already sealed.
    #[error("supply already sealed")]
    AlreadySealed,

    /// A supply or balance operation would overflow u64.
    #[error("supply overflow")]
    SupplyOverflow,

    /// A holding exists but is linked to a different owner or mint than
    /// the caller claimed.
    #[error("holding mismatch: record is owned by {actual_owner} for mint {actual_mint}")]
    HoldingMismatch {
        /// The owner recorded on the holding.
        actual_owner: Address,
        /// The mint recorded on the holding.
        actual_mint: Address,
    },
}

/// A token mint: the unit-of-issue record for one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintRecord {
    /// The mint's own (derived) address.
    pub address: Address,
    /// The only signer allowed to issue units.
    pub mint_authority: Address,
    /// The signer allowed to freeze holdings. The registry always sets
    /// this to the same keyless authority as `mint_authority`.
    pub freeze_authority: Option<Address>,
    /// Display decimals. Collectible mints are always zero-decimal.
    pub decimals: u8,
    /// Units issued so far.
    pub supply: u64,
    /// `Some(n)` once sealed; issuance beyond `n` is permanently rejected.
    pub max_supply: Option<u64>,
}

impl MintRecord {
    /// Serialized record footprint used for deposit sizing.
    pub const RECORD_LEN: usize = 32 + 32 + 33 + 1 + 8 + 9;

    /// Whether the supply has been permanently fixed.
    pub fn is_sealed(&self) -> bool {
        self.max_supply.is_some()
    }
}

/// One owner's balance of one mint, at the derived holding address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// The holding's own (derived) address.
    pub address: Address,
    /// The mint this holding is denominated in.
    pub mint: Address,
    /// The owner whose signature controls this holding.
    pub owner: Address,
    /// Units held.
    pub amount: u64,
}

impl Holding {
    /// Serialized record footprint used for deposit sizing.
    pub const RECORD_LEN: usize = 32 + 32 + 32 + 8;
}

/// Derives the canonical holding address for an (owner, mint) pair.
pub fn holding_address(owner: &Address, mint: &Address) -> (Address, u8) {
    // Infallible for three seeds; the expect documents the invariant.
    find_derived_address(&[HOLDING_SEED, owner.as_bytes(), mint.as_bytes()])
        .expect("three seeds is always within the derivation limit")
}

/// The token ledger — mints and holdings, keyed by address.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenLedger {
    mints: HashMap<Address, MintRecord>,
    holdings: HashMap<Address, Holding>,
}

impl TokenLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new mint with zero supply.
    ///
    /// # Errors
    ///
    /// [`TokenError::MintAlreadyExists`] if a mint is already registered at
    /// this address.
    pub fn create_mint(
        &mut self,
        address: Address,
        mint_authority: Address,
        freeze_authority: Option<Address>,
        decimals: u8,
    ) -> Result<(), TokenError> {
        if self.mints.contains_key(&address) {
            return Err(TokenError::MintAlreadyExists(address));
        }
        self.mints.insert(
            address,
            MintRecord {
                address,
                mint_authority,
                freeze_authority,
                decimals,
                supply: 0,
                max_supply: None,
            },
        );
        Ok(())
    }

    /// Returns the mint at `address`, if any.
    pub fn mint(&self, address: &Address) -> Option<&MintRecord> {
        self.mints.get(address)
    }

    /// Whether a mint exists at `address`.
    pub fn contains_mint(&self, address: &Address) -> bool {
        self.mints.contains_key(address)
    }

    /// Creates the canonical holding for `(owner, mint)` if absent, or
    /// validates the existing one. Returns the holding address either way.
    ///
    /// # Errors
    ///
    /// [`TokenError::MintNotFound`] if the mint is unknown;
    /// [`TokenError::HoldingMismatch`] if a record exists at the derived
    /// address but is linked to a different owner or mint (which would mean
    /// the derivation scheme itself is broken — fail loudly).
    pub fn ensure_holding(&mut self, owner: Address, mint: Address) -> Result<Address, TokenError> {
        if !self.mints.contains_key(&mint) {
            return Err(TokenError::MintNotFound(mint));
        }

        let (address, _) = holding_address(&owner, &mint);
        match self.holdings.get(&address) {
            None => {
                self.holdings.insert(
                    address,
                    Holding {
                        address,
                        mint,
                        owner,
                        amount: 0,
                    },
                );
                Ok(address)
            }
            Some(existing) => {
                if existing.owner != owner || existing.mint != mint {
                    return Err(TokenError::HoldingMismatch {
                        actual_owner: existing.owner,
                        actual_mint: existing.mint,
                    });
                }
                Ok(address)
            }
        }
    }

    /// Returns the holding at `address`, if any.
    pub fn holding(&self, address: &Address) -> Option<&Holding> {
        self.holdings.get(address)
    }

    /// Returns the balance of `(owner, mint)`, or 0.
    pub fn balance_of(&self, owner: &Address, mint: &Address) -> u64 {
        let (address, _) = holding_address(owner, mint);
        self.holdings.get(&address).map(|h| h.amount).unwrap_or(0)
    }

    /// Issues `amount` units of `mint` to the owner's canonical holding.
    ///
    /// `authority` must match the mint's issuance authority, and the
    /// resulting supply must stay within the sealed maximum if one is set.
    pub fn mint_to(
        &mut self,
        mint: &Address,
        owner: &Address,
        amount: u64,
        authority: &Address,
    ) -> Result<(), TokenError> {
        let record = self
            .mints
            .get(mint)
            .ok_or(TokenError::MintNotFound(*mint))?;

        if record.mint_authority != *authority {
            return Err(TokenError::UnauthorizedMintAuthority);
        }

        let new_supply = record
            .supply
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow)?;
        if let Some(max) = record.max_supply {
            if new_supply > max {
                return Err(TokenError::SupplySealed {
                    max_supply: max,
                    amount,
                });
            }
        }

        let holding_addr = self.ensure_holding(*owner, *mint)?;

        // All checks passed; apply both sides.
        let record = self.mints.get_mut(mint).expect("checked above");
        record.supply = new_supply;
        let holding = self.holdings.get_mut(&holding_addr).expect("just ensured");
        holding.amount = holding
            .amount
            .checked_add(amount)
            .ok_or(TokenError::SupplyOverflow)?;

        Ok(())
    }

    /// Permanently fixes the mint's supply at its current value.
    ///
    /// # Errors
    ///
    /// [`TokenError::AlreadySealed`] if called twice;
    /// [`TokenError::UnauthorizedMintAuthority`] if `authority` is not the
    /// mint authority.
    pub fn seal_supply(&mut self, mint: &Address, authority: &Address) -> Result<(), TokenError> {
        let record = self
            .mints
            .get_mut(mint)
            .ok_or(TokenError::MintNotFound(*mint))?;

        if record.mint_authority != *authority {
            return Err(TokenError::UnauthorizedMintAuthority);
        }
        if record.max_supply.is_some() {
            return Err(TokenError::AlreadySealed);
        }

        record.max_supply = Some(record.supply);
        Ok(())
    }
}
