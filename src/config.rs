use serde::{Deserialize, Serialize};

use crate::digest::SdAlg;
use crate::error::Error;
use crate::jws::HeaderOptions;

/// 128-bit salts
pub const DEFAULT_SALT_SIZE: usize = 128 / 8;

/// What the verifier does when two disclosures carry the same claim name.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum DuplicateClaimPolicy {
    /// Keep the value of the last disclosure
    #[default]
    LastWriteWins,
    /// Fail with [`Error::NameConflict`]
    Reject,
}

/// Options shared by issuance and verification.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SdJwtConfig {
    /// Salt length in bytes, before base64url encoding
    pub salt_size: usize,
    /// Digest algorithm written to `_sd_alg` at issuance
    pub sd_alg: SdAlg,
    pub duplicate_claims: DuplicateClaimPolicy,
    /// Protected header options handed to the signer
    pub header: HeaderOptions,
}

impl Default for SdJwtConfig {
    fn default() -> Self {
        Self {
            salt_size: DEFAULT_SALT_SIZE,
            sd_alg: SdAlg::default(),
            duplicate_claims: DuplicateClaimPolicy::default(),
            header: HeaderOptions::default(),
        }
    }
}

impl SdJwtConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.salt_size < DEFAULT_SALT_SIZE {
            return Err(Error::InvalidConfig(format!(
                "salt size of {} bytes is below the {} byte minimum",
                self.salt_size, DEFAULT_SALT_SIZE
            )));
        }
        Ok(())
    }
}
