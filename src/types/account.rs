//! Account-related types for the ledger benchmark driver
//!
//! This module defines ledger account identifiers, Ed25519 key material and
//! the in-memory `Account` the provisioner hands out to the dispatcher.

use super::error::BenchError;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest ledger units per whole unit (tinybars per hbar)
pub const UNITS_PER_WHOLE: u64 = 100_000_000;

/// ASN.1 DER prefix of an Ed25519 private key, as exported by ledger SDKs
const ED25519_DER_PREFIX: &str = "302e020100300506032b657004220420";

/// Ledger account identifier in `shard.realm.num` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl AccountId {
    /// Create an account id in shard 0, realm 0
    pub const fn new(num: u64) -> Self {
        Self {
            shard: 0,
            realm: 0,
            num,
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

impl FromStr for AccountId {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        let parse = |part: &str| {
            part.parse::<u64>()
                .map_err(|e| BenchError::invalid_credential("account id", s, e.to_string()))
        };

        match parts.as_slice() {
            [shard, realm, num] => Ok(Self {
                shard: parse(shard)?,
                realm: parse(realm)?,
                num: parse(num)?,
            }),
            [num] => Ok(Self::new(parse(num)?)),
            _ => Err(BenchError::invalid_credential(
                "account id",
                s,
                "expected shard.realm.num",
            )),
        }
    }
}

/// Ed25519 public key used when creating a ledger account
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Raw 32-byte key
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0.to_bytes()))
    }
}

/// Ed25519 private signing credential of an account
///
/// Serialised as the hex-encoded 32-byte seed. `Debug` output is redacted.
#[derive(Clone)]
pub struct PrivateKey(SigningKey);

impl PrivateKey {
    /// Generate a new random key
    pub fn generate() -> Self {
        Self(SigningKey::generate(&mut OsRng))
    }

    /// Parse a hex seed, optionally carrying the DER prefix ledger SDKs export
    pub fn from_hex(input: &str) -> Result<Self, BenchError> {
        let trimmed = input.trim();
        let seed_hex = trimmed
            .strip_prefix(ED25519_DER_PREFIX)
            .unwrap_or(trimmed);

        let bytes = hex::decode(seed_hex)
            .map_err(|e| BenchError::invalid_credential("private key", "<redacted>", e.to_string()))?;
        let seed: [u8; 32] = bytes.as_slice().try_into().map_err(|_| {
            BenchError::invalid_credential(
                "private key",
                "<redacted>",
                format!("seed must be 32 bytes, got {}", bytes.len()),
            )
        })?;

        Ok(Self(SigningKey::from_bytes(&seed)))
    }

    /// Hex-encoded seed
    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_bytes())
    }

    /// Matching public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(<redacted>, public {})", self.public_key())
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bytes() == other.0.to_bytes()
    }
}

/// A provisioned ledger identity
///
/// Senders and receivers share this type; a receiver is simply an account
/// that never originates transfers. Lives for one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Ledger-assigned identifier
    pub id: AccountId,

    /// Signing credential used to authenticate as this account
    pub key: PrivateKey,

    /// Balance at provisioning time, in the ledger's smallest unit
    ///
    /// Not refreshed as transfers happen; query the ledger for the live value.
    pub balance: u64,
}

impl Account {
    /// Create an account record
    pub fn new(id: AccountId, key: PrivateKey, balance: u64) -> Self {
        Account { id, key, balance }
    }
}

/// Operator identity with authority to create and fund new accounts
///
/// Passed explicitly to the provisioner instead of being read from the
/// process environment.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorCredentials {
    pub account_id: AccountId,
    pub key: PrivateKey,
}

impl OperatorCredentials {
    /// Build credentials from the raw id/key pair
    ///
    /// Either value being absent is reported as a missing credential.
    pub fn from_parts(account_id: Option<&str>, key: Option<&str>) -> Result<Self, BenchError> {
        let account_id = account_id
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| BenchError::missing_credential("OPERATOR_ID"))?;
        let key = key
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| BenchError::missing_credential("OPERATOR_KEY"))?;

        Ok(Self {
            account_id: account_id.parse()?,
            key: PrivateKey::from_hex(key)?,
        })
    }
}
