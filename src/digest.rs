use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::Digest;

use crate::Error;

/// Hash algorithm used to digest disclosures, named as in the IANA "Named
/// Information Hash Algorithm" registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum SdAlg {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl SdAlg {
    const SHA256_STR: &'static str = "sha-256";
    const SHA384_STR: &'static str = "sha-384";
    const SHA512_STR: &'static str = "sha-512";

    pub fn to_str(&self) -> &'static str {
        match self {
            SdAlg::Sha256 => Self::SHA256_STR,
            SdAlg::Sha384 => Self::SHA384_STR,
            SdAlg::Sha512 => Self::SHA512_STR,
        }
    }
}

impl TryFrom<&str> for SdAlg {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(match value {
            Self::SHA256_STR => SdAlg::Sha256,
            Self::SHA384_STR => SdAlg::Sha384,
            Self::SHA512_STR => SdAlg::Sha512,
            other => return Err(Error::UnknownSdAlg(other.to_owned())),
        })
    }
}

impl TryFrom<String> for SdAlg {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SdAlg::try_from(value.as_str())
    }
}

impl From<SdAlg> for &'static str {
    fn from(value: SdAlg) -> Self {
        value.to_str()
    }
}

impl fmt::Display for SdAlg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Hash function capability.
///
/// Implementations must be deterministic: the verifier re-derives every
/// digest the issuer produced.
pub trait Hasher: Send + Sync {
    fn hash(&self, data: &[u8], alg: SdAlg) -> Vec<u8>;
}

/// [`Hasher`] backed by the `sha2` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha2Hasher;

impl Hasher for Sha2Hasher {
    fn hash(&self, data: &[u8], alg: SdAlg) -> Vec<u8> {
        match alg {
            SdAlg::Sha256 => sha2::Sha256::digest(data).to_vec(),
            SdAlg::Sha384 => sha2::Sha384::digest(data).to_vec(),
            SdAlg::Sha512 => sha2::Sha512::digest(data).to_vec(),
        }
    }
}

impl<H: Hasher + ?Sized> Hasher for &H {
    fn hash(&self, data: &[u8], alg: SdAlg) -> Vec<u8> {
        (**self).hash(data, alg)
    }
}

/// Digest of an encoded disclosure: the hash of the disclosure string's
/// UTF-8 bytes, base64url encoded without padding.
pub fn hash_encoded_disclosure(hasher: &impl Hasher, digest_algo: SdAlg, disclosure: &str) -> String {
    let digest = hasher.hash(disclosure.as_bytes(), digest_algo);
    base64::encode_config(digest, base64::URL_SAFE_NO_PAD)
}
