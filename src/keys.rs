//! Deterministic index -> account derivation from one seed phrase.
//!
//! Accounts follow the standard Ethereum path `m/44'/60'/0'/0/{index}`, so the
//! same phrase always yields the same fleet. Index 0 is the treasury that funds
//! and collects for everyone else.

use std::fmt;
use std::ops::Range;

use alloy::hex;
use alloy::primitives::{Address, B256};
use alloy::signers::local::coins_bip39::{English, Mnemonic};
use alloy::signers::local::{LocalSignerError, PrivateKeySigner};
use coins_bip32::path::DerivationPath;
use coins_bip32::prelude::SigningKey;
use coins_bip32::xkeys::{Parent, XPriv};

use crate::Result;

/// Position of an account in the derivation sequence.
pub type AccountIndex = u32;

pub const TREASURY: AccountIndex = 0;

/// Parent of every fleet account; the index is the last, unhardened step.
const ACCOUNT_PATH: &str = "m/44'/60'/0'/0";

/// Seed phrase for the whole fleet.
///
/// The seed is stretched once, here. Only the extended key at
/// `m/44'/60'/0'/0` is kept, so each account costs one child derivation.
#[derive(Clone)]
pub struct MasterSecret {
    parent: XPriv,
}

impl MasterSecret {
    pub fn new(phrase: impl Into<String>) -> Result<Self> {
        let phrase = phrase.into();
        let mnemonic = Mnemonic::<English>::new_from_phrase(phrase.trim()).map_err(LocalSignerError::from)?;
        let path: DerivationPath = ACCOUNT_PATH.parse().map_err(LocalSignerError::from)?;
        let parent = mnemonic.derive_key(&path, None).map_err(LocalSignerError::from)?;
        Ok(Self { parent })
    }

    fn signer(&self, index: AccountIndex) -> Result<PrivateKeySigner> {
        let child = self.parent.derive_child(index).map_err(LocalSignerError::from)?;
        let key: &SigningKey = child.as_ref();
        Ok(PrivateKeySigner::from_signing_key(key.clone()))
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterSecret(..)")
    }
}

/// A derived account. Never persisted; re-derive instead.
#[derive(Debug, Clone)]
pub struct Account {
    pub index: AccountIndex,
    pub signer: PrivateKeySigner,
}

impl Account {
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn private_key(&self) -> B256 {
        self.signer.to_bytes()
    }

    pub fn private_key_hex(&self) -> String {
        hex::encode_prefixed(self.private_key())
    }
}

/// The set of accounts reachable from one [`MasterSecret`].
#[derive(Debug, Clone)]
pub struct Fleet {
    secret: MasterSecret,
}

impl Fleet {
    pub fn new(secret: MasterSecret) -> Self {
        Self { secret }
    }

    pub fn derive(&self, index: AccountIndex) -> Result<Account> {
        Ok(Account {
            index,
            signer: self.secret.signer(index)?,
        })
    }

    pub fn treasury(&self) -> Result<Account> {
        self.derive(TREASURY)
    }

    pub fn address(&self, index: AccountIndex) -> Result<Address> {
        Ok(self.derive(index)?.address())
    }

    pub fn accounts(&self, range: Range<AccountIndex>) -> Result<Vec<Account>> {
        range.map(|i| self.derive(i)).collect()
    }

    /// Addresses of indices `[0, limit)`.
    pub fn derive_public_batch(&self, limit: u32) -> Result<Vec<Address>> {
        (0..limit).map(|i| self.address(i)).collect()
    }

    /// Private keys of indices `[0, limit)`.
    pub fn derive_private_batch(&self, limit: u32) -> Result<Vec<B256>> {
        (0..limit)
            .map(|i| Ok(self.derive(i)?.private_key()))
            .collect()
    }
}
