//! Network link trait and credential types

use core::fmt;
use core::net::Ipv4Addr;

use heapless::{String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of credential candidates
pub const MAX_CREDENTIALS: usize = 4;

/// Maximum network identifier length (802.11 SSID limit)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum secret length (WPA2 passphrase limit)
pub const MAX_SECRET_LEN: usize = 64;

/// Errors building credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CredentialError {
    /// Credential list has no entries
    Empty,
    /// More candidates than `MAX_CREDENTIALS`
    TooMany,
    /// Network identifier is blank
    BlankSsid,
    /// Network identifier longer than `MAX_SSID_LEN`
    SsidTooLong,
    /// Secret longer than `MAX_SECRET_LEN`
    SecretTooLong,
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CredentialError::Empty => "credential list is empty",
            CredentialError::TooMany => "too many credentials",
            CredentialError::BlankSsid => "network identifier is blank",
            CredentialError::SsidTooLong => "network identifier is too long",
            CredentialError::SecretTooLong => "secret is too long",
        };
        f.write_str(msg)
    }
}

/// A (network identifier, secret) pair
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Credential {
    /// Network identifier
    pub ssid: String<MAX_SSID_LEN>,
    /// Pre-shared secret (empty for open networks)
    pub secret: String<MAX_SECRET_LEN>,
}

impl Credential {
    /// Create a credential, checking length limits
    pub fn new(ssid: &str, secret: &str) -> Result<Self, CredentialError> {
        if ssid.trim().is_empty() {
            return Err(CredentialError::BlankSsid);
        }

        let mut ssid_buf = String::new();
        ssid_buf
            .push_str(ssid)
            .map_err(|_| CredentialError::SsidTooLong)?;

        let mut secret_buf = String::new();
        secret_buf
            .push_str(secret)
            .map_err(|_| CredentialError::SecretTooLong)?;

        Ok(Self {
            ssid: ssid_buf,
            secret: secret_buf,
        })
    }
}

/// Ordered, non-empty list of credential candidates
///
/// Candidates are tried in order; the first one that connects wins.
/// A single credential is simply a one-element list.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<Credential, MAX_CREDENTIALS>", into = "Vec<Credential, MAX_CREDENTIALS>")
)]
pub struct CredentialList {
    entries: Vec<Credential, MAX_CREDENTIALS>,
}

impl CredentialList {
    /// Build a list from a slice of candidates
    pub fn new(candidates: &[Credential]) -> Result<Self, CredentialError> {
        if candidates.is_empty() {
            return Err(CredentialError::Empty);
        }

        let mut entries = Vec::new();
        for candidate in candidates {
            if candidate.ssid.trim().is_empty() {
                return Err(CredentialError::BlankSsid);
            }
            entries
                .push(candidate.clone())
                .map_err(|_| CredentialError::TooMany)?;
        }

        Ok(Self { entries })
    }

    /// Build a one-element list
    pub fn single(credential: Credential) -> Self {
        let mut entries = Vec::new();
        // Capacity is at least one
        let _ = entries.push(credential);
        Self { entries }
    }

    /// Iterate candidates in priority order
    pub fn iter(&self) -> impl Iterator<Item = &Credential> {
        self.entries.iter()
    }

    /// Number of candidates (never zero)
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest-priority candidate
    pub fn primary(&self) -> &Credential {
        &self.entries[0]
    }

    /// Candidates as a slice
    pub fn as_slice(&self) -> &[Credential] {
        &self.entries
    }
}

impl TryFrom<Vec<Credential, MAX_CREDENTIALS>> for CredentialList {
    type Error = CredentialError;

    fn try_from(entries: Vec<Credential, MAX_CREDENTIALS>) -> Result<Self, Self::Error> {
        Self::new(&entries)
    }
}

impl From<CredentialList> for Vec<Credential, MAX_CREDENTIALS> {
    fn from(list: CredentialList) -> Self {
        list.entries
    }
}

/// Link state as tracked by the provider
///
/// Owned by the link provider. The controller only sees the boolean
/// outcome of `connect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// Trait for the wireless network link
///
/// `connect` blocks the caller for at most one bounded wait per
/// candidate and must leave the link either connected (true) or fully
/// inactive (false).
#[allow(async_fn_in_trait)]
pub trait LinkProvider {
    /// Try each candidate in order; true on the first that gets an address
    async fn connect(&mut self, credentials: &CredentialList) -> bool;

    /// Tear the link down and deactivate the radio
    ///
    /// Idempotent.
    async fn disconnect(&mut self);

    /// Address assigned to the link, only meaningful while connected
    fn current_address(&self) -> Option<Ipv4Addr>;

    /// Current link state
    fn link_state(&self) -> LinkState;
}
