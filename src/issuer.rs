use std::fmt;

use log::debug;
use rand::{CryptoRng, RngCore};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::capability::JwsSigner;
use crate::config::SdJwtConfig;
use crate::digest::{Hasher, Sha2Hasher};
use crate::disclosure::Disclosure;
use crate::serialized::serialize_string_format;
use crate::{Error, SD_ALG_CLAIM_NAME, SD_CLAIM_NAME};

/// A freshly issued SD-JWT: the signed JWS and one disclosure per claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSdJwt {
    pub jwt: String,
    pub disclosures: Vec<Disclosure>,
}

impl IssuedSdJwt {
    /// `<JWS>~<D1>~<D2>...`, or `<JWS>~` when there are no disclosures.
    pub fn serialize(&self) -> String {
        let encoded: Vec<&str> = self
            .disclosures
            .iter()
            .map(|disclosure| disclosure.encoded.as_str())
            .collect();
        serialize_string_format(&self.jwt, &encoded, true)
    }
}

impl fmt::Display for IssuedSdJwt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

/// Issues SD-JWTs with an explicitly provided signer and hasher.
pub struct SdJwtIssuer<S, H = Sha2Hasher> {
    signer: S,
    hasher: H,
    config: SdJwtConfig,
}

impl<S: JwsSigner> SdJwtIssuer<S> {
    pub fn new(signer: S) -> Self {
        SdJwtIssuer {
            signer,
            hasher: Sha2Hasher,
            config: SdJwtConfig::default(),
        }
    }
}

impl<S: JwsSigner, H: Hasher> SdJwtIssuer<S, H> {
    pub fn with_config(signer: S, hasher: H, config: SdJwtConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(SdJwtIssuer {
            signer,
            hasher,
            config,
        })
    }

    pub fn config(&self) -> &SdJwtConfig {
        &self.config
    }

    /// Makes every entry of `claims` selectively disclosable, signs
    /// `base_claims` together with the digests and returns the compact
    /// SD-JWT. Salts are drawn from the operating system.
    pub async fn create_sd_jwt<Claims: Serialize + ?Sized>(
        &self,
        base_claims: &Claims,
        claims: &Map<String, Value>,
    ) -> Result<String, Error> {
        let mut rng = rand::rngs::OsRng {};
        self.create_sd_jwt_with_rng(&mut rng, base_claims, claims)
            .await
    }

    pub async fn create_sd_jwt_with_rng<Claims: Serialize + ?Sized, R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        base_claims: &Claims,
        claims: &Map<String, Value>,
    ) -> Result<String, Error> {
        Ok(self.issue(rng, base_claims, claims).await?.serialize())
    }

    /// Lower level API keeping the encoded disclosures and their digests.
    pub async fn issue<Claims: Serialize + ?Sized, R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        base_claims: &Claims,
        claims: &Map<String, Value>,
    ) -> Result<IssuedSdJwt, Error> {
        let (payload, disclosures) = self.build_payload(rng, base_claims, claims)?;
        let payload = serde_json::to_vec(&payload)?;

        let jwt = self.signer.sign(&payload, &self.config.header).await?;

        Ok(IssuedSdJwt { jwt, disclosures })
    }

    fn build_payload<Claims: Serialize + ?Sized, R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        base_claims: &Claims,
        claims: &Map<String, Value>,
    ) -> Result<(Map<String, Value>, Vec<Disclosure>), Error> {
        let mut payload = match serde_json::to_value(base_claims)? {
            Value::Object(payload) => payload,
            _ => return Err(Error::BaseClaimsNotObject),
        };

        for reserved in [SD_CLAIM_NAME, SD_ALG_CLAIM_NAME] {
            if payload.contains_key(reserved) {
                return Err(Error::ReservedClaim(reserved.to_owned()));
            }
        }

        debug!(
            "issuing SD-JWT with {} selectively disclosable claims",
            claims.len()
        );

        let disclosures = claims
            .iter()
            .map(|(name, value)| {
                Disclosure::new(
                    &mut *rng,
                    self.config.salt_size,
                    &self.hasher,
                    self.config.sd_alg,
                    name,
                    value,
                )
            })
            .collect::<Result<Vec<_>, Error>>()?;

        // A disclosable claim must not also travel in cleartext.
        for name in claims.keys() {
            if payload.remove(name).is_some() {
                debug!("removed cleartext copy of disclosable claim `{}`", name);
            }
        }

        let mut digests: Vec<&str> = disclosures
            .iter()
            .map(|disclosure| disclosure.hash.as_str())
            .collect();
        digests.sort_unstable();

        payload.insert(
            SD_CLAIM_NAME.to_owned(),
            Value::Array(digests.into_iter().map(Value::from).collect()),
        );
        payload.insert(
            SD_ALG_CLAIM_NAME.to_owned(),
            Value::from(self.config.sd_alg.to_str()),
        );

        Ok((payload, disclosures))
    }
}
