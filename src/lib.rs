//! Selective Disclosure for JWTs ([SD-JWT][sd-jwt]).
//!
//! An issuer signs a JWT whose `_sd` claim holds the digests of salted claim
//! disclosures. The holder forwards the JWT together with any subset of the
//! disclosures, and a verifier checks the signature and that every presented
//! disclosure is committed to by the signed payload.
//!
//! Signing, signature verification, key lookup, hashing and randomness are
//! passed in explicitly, see [`capability`], [`digest::Hasher`] and
//! [`SdJwtIssuer::create_sd_jwt_with_rng`].
//!
//! ```
//! # async_std::task::block_on(async {
//! use sd_jwt_core::{disclose_claims, JwkSigner, SdJwtIssuer, SdJwtVerifier, JWK};
//!
//! let issuer = SdJwtIssuer::new(JwkSigner::new(JWK::generate_p256()?)?);
//! let claims = serde_json::json!({ "name": "John Doe", "age": 21 });
//! let sd_jwt = issuer
//!     .create_sd_jwt(
//!         &serde_json::json!({ "iss": "https://example.com/issuer" }),
//!         claims.as_object().unwrap(),
//!     )
//!     .await?;
//!
//! // The holder only reveals the name.
//! let presentation = disclose_claims(&sd_jwt, &["name"])?;
//!
//! let verified = SdJwtVerifier::new().verify_sd_jwt(&presentation).await?;
//! assert_eq!(verified.disclosed_claims["name"], "John Doe");
//! assert!(verified.disclosed_claims.get("age").is_none());
//! # Ok::<(), sd_jwt_core::Error>(())
//! # }).unwrap();
//! ```
//!
//! [sd-jwt]: <https://datatracker.ietf.org/doc/draft-ietf-oauth-selective-disclosure-jwt/>
pub mod capability;
pub mod claims;
pub mod config;
pub mod digest;
pub mod disclosure;
mod error;
pub mod holder;
pub mod issuer;
pub mod jwk;
pub mod jws;
pub(crate) mod serialized;
pub mod verify;

pub use capability::{
    EmbeddedJwkResolver, JwkSigner, JwkVerifier, JwsSigner, JwsVerifier, KeyResolver,
    StaticKeyResolver,
};
pub use claims::{NumericDate, OneOrMany, RegisteredClaims};
pub use config::{DuplicateClaimPolicy, SdJwtConfig};
pub use digest::{hash_encoded_disclosure, Hasher, SdAlg, Sha2Hasher};
pub use disclosure::{encode_disclosure_with_salt, DecodedDisclosure, Disclosure};
pub use error::{Error, ParseError};
pub use holder::{disclose_claims, list_disclosures};
pub use issuer::{IssuedSdJwt, SdJwtIssuer};
pub use jwk::{Algorithm, JWK};
pub use jws::{CompactJws, Header, HeaderOptions};
pub use serialized::{deserialize_string_format, serialize_string_format, PartsRef};
pub use verify::{verify_sd_disclosures_array, SdJwtVerifier, VerifiedSdJwt};

/// Payload claim holding the disclosure digests
pub const SD_CLAIM_NAME: &str = "_sd";
/// Payload claim naming the digest algorithm
pub const SD_ALG_CLAIM_NAME: &str = "_sd_alg";
