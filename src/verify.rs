use std::collections::HashSet;

use log::{debug, warn};
use serde_json::{Map, Value};

use crate::capability::{EmbeddedJwkResolver, JwkVerifier, JwsVerifier, KeyResolver};
use crate::claims::RegisteredClaims;
use crate::config::{DuplicateClaimPolicy, SdJwtConfig};
use crate::digest::{hash_encoded_disclosure, Hasher, SdAlg, Sha2Hasher};
use crate::disclosure::DecodedDisclosure;
use crate::jws::{CompactJws, Header};
use crate::serialized::deserialize_string_format;
use crate::{Error, ParseError, SD_ALG_CLAIM_NAME, SD_CLAIM_NAME};

/// Outcome of a successful verification.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedSdJwt {
    pub header: Header,
    /// The signed payload, including `_sd` and `_sd_alg`
    pub payload: Map<String, Value>,
    /// Claims revealed by the presented disclosures
    pub disclosed_claims: Map<String, Value>,
}

impl VerifiedSdJwt {
    pub fn registered_claims(&self) -> Result<RegisteredClaims, Error> {
        serde_json::from_value(Value::Object(self.payload.clone()))
            .map_err(|e| Error::Parse(ParseError::Json(e)))
    }

    /// Signed cleartext claims and disclosed claims in one map, without the
    /// SD-JWT bookkeeping claims.
    pub fn claims(&self) -> Result<Map<String, Value>, Error> {
        let mut claims = self.payload.clone();
        claims.remove(SD_CLAIM_NAME);
        claims.remove(SD_ALG_CLAIM_NAME);

        for (name, value) in &self.disclosed_claims {
            if claims.insert(name.clone(), value.clone()).is_some() {
                return Err(Error::NameConflict(name.clone()));
            }
        }
        Ok(claims)
    }
}

/// Verifies SD-JWTs with explicitly provided capabilities.
pub struct SdJwtVerifier<V = JwkVerifier, K = EmbeddedJwkResolver, H = Sha2Hasher> {
    verifier: V,
    resolver: K,
    hasher: H,
    config: SdJwtConfig,
}

impl SdJwtVerifier {
    /// Local signature verification against the `jwk` header parameter.
    pub fn new() -> Self {
        SdJwtVerifier {
            verifier: JwkVerifier,
            resolver: EmbeddedJwkResolver,
            hasher: Sha2Hasher,
            config: SdJwtConfig::default(),
        }
    }
}

impl Default for SdJwtVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: JwsVerifier, K: KeyResolver, H: Hasher> SdJwtVerifier<V, K, H> {
    pub fn with_capabilities(verifier: V, resolver: K, hasher: H) -> Self {
        SdJwtVerifier {
            verifier,
            resolver,
            hasher,
            config: SdJwtConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SdJwtConfig) -> Self {
        self.config = config;
        self
    }

    /// Checks the JWS signature, then checks that every presented disclosure
    /// is committed to by the signed `_sd` claim.
    ///
    /// Fails as a whole on the first problem; there is no partial result.
    pub async fn verify_sd_jwt(&self, serialized: &str) -> Result<VerifiedSdJwt, Error> {
        let parts = deserialize_string_format(serialized).ok_or(ParseError::NotCompactJws)?;

        let jws = CompactJws::decode(parts.jwt)?;
        let payload = match serde_json::from_slice::<Value>(&jws.payload).map_err(ParseError::from)? {
            Value::Object(payload) => payload,
            _ => return Err(ParseError::ClaimsWrongType.into()),
        };

        let key = self
            .resolver
            .resolve(&jws.header)
            .map_err(|e| Error::SignatureInvalid(e.to_string()))?;
        let is_valid = self
            .verifier
            .verify(&jws, &key)
            .await
            .map_err(|e| Error::SignatureInvalid(e.to_string()))?;
        if !is_valid {
            return Err(Error::SignatureInvalid(
                "signature does not match".to_string(),
            ));
        }

        let disclosed_claims = if parts.disclosures.is_empty() {
            Map::new()
        } else {
            let sd_alg = sd_alg(&payload)?;
            let sd_claim = sd_claim(&payload)?;
            verify_sd_disclosures_array(
                &self.hasher,
                sd_alg,
                &parts.disclosures,
                &sd_claim,
                self.config.duplicate_claims,
            )?
        };

        debug!(
            "verified SD-JWT with {} disclosed claims",
            disclosed_claims.len()
        );

        Ok(VerifiedSdJwt {
            header: jws.header,
            payload,
            disclosed_claims,
        })
    }
}

fn sd_alg(claims: &Map<String, Value>) -> Result<SdAlg, Error> {
    match claims.get(SD_ALG_CLAIM_NAME) {
        None => Ok(SdAlg::Sha256),
        Some(Value::String(alg_name)) => SdAlg::try_from(alg_name.as_str()),
        Some(_) => Err(ParseError::SdAlgWrongType.into()),
    }
}

fn sd_claim(claims: &Map<String, Value>) -> Result<Vec<&str>, Error> {
    match claims.get(SD_CLAIM_NAME) {
        None => Ok(Vec::new()),
        Some(Value::Array(digests)) => digests
            .iter()
            .map(|digest| {
                digest
                    .as_str()
                    .ok_or_else(|| Error::from(ParseError::SdClaimWrongType))
            })
            .collect(),
        Some(_) => Err(ParseError::SdClaimWrongType.into()),
    }
}

/// Checks each disclosure against the digests of `sd_claim` and collects the
/// disclosed claims.
///
/// A disclosure whose digest is missing from `sd_claim` fails the whole
/// call with [`Error::DisclosureNotTrusted`].
pub fn verify_sd_disclosures_array(
    hasher: &impl Hasher,
    digest_algo: SdAlg,
    disclosures: &[&str],
    sd_claim: &[&str],
    duplicate_claims: DuplicateClaimPolicy,
) -> Result<Map<String, Value>, Error> {
    let sd_claim: HashSet<&str> = sd_claim.iter().copied().collect();
    let mut verified_claims = Map::new();

    for disclosure in disclosures {
        let disclosure_hash = hash_encoded_disclosure(hasher, digest_algo, disclosure);

        if !sd_claim.contains(disclosure_hash.as_str()) {
            return Err(Error::DisclosureNotTrusted((*disclosure).to_owned()));
        }

        let DecodedDisclosure { name, value, .. } = DecodedDisclosure::new(disclosure)?;

        if verified_claims.contains_key(&name) {
            match duplicate_claims {
                DuplicateClaimPolicy::Reject => return Err(Error::NameConflict(name)),
                DuplicateClaimPolicy::LastWriteWins => {
                    warn!("claim `{}` disclosed more than once, keeping the last value", name)
                }
            }
        }
        verified_claims.insert(name, value);
    }

    Ok(verified_claims)
}
