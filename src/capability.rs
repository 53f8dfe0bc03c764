//! Capabilities consumed by the issuer and the verifier.
//!
//! Signing and signature verification may be backed by remote key custody,
//! so both are asynchronous. Hashing lives in [`crate::digest::Hasher`] and
//! salts come from any `rand::RngCore + rand::CryptoRng`.
use async_trait::async_trait;

use crate::error::Error;
use crate::jwk::{Algorithm, JWK};
use crate::jws::{self, CompactJws, Header, HeaderOptions};

/// Produces a compact JWS over a payload. The signer stands for the signing
/// key.
#[async_trait]
pub trait JwsSigner: Send + Sync {
    async fn sign(&self, payload: &[u8], options: &HeaderOptions) -> Result<String, Error>;
}

/// Checks the signature of a decoded compact JWS against a key.
#[async_trait]
pub trait JwsVerifier: Send + Sync {
    async fn verify(&self, jws: &CompactJws<'_>, key: &JWK) -> Result<bool, Error>;
}

/// Finds the verification key for a JWS from its protected header.
pub trait KeyResolver: Send + Sync {
    fn resolve(&self, header: &Header) -> Result<JWK, Error>;
}

/// Signs in-process with a private JWK.
#[derive(Debug, Clone)]
pub struct JwkSigner {
    key: JWK,
    algorithm: Algorithm,
}

impl JwkSigner {
    pub fn new(key: JWK) -> Result<Self, Error> {
        if key.is_public() {
            return Err(Error::Key("missing private key".to_string()));
        }
        let algorithm = key
            .get_algorithm()
            .ok_or_else(|| Error::Key("unable to determine the key algorithm".to_string()))?;
        Ok(JwkSigner { key, algorithm })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn public_key(&self) -> JWK {
        self.key.to_public()
    }

    fn header(&self, options: &HeaderOptions) -> Header {
        let mut header = Header::new(self.algorithm);
        header.type_ = options.type_.clone();
        header.key_id = options
            .key_id
            .clone()
            .or_else(|| self.key.key_id.clone());
        if options.embed_jwk {
            header.jwk = Some(self.key.to_public());
        }
        header
    }
}

#[async_trait]
impl JwsSigner for JwkSigner {
    async fn sign(&self, payload: &[u8], options: &HeaderOptions) -> Result<String, Error> {
        jws::encode_sign_custom_header(payload, &self.key, &self.header(options))
    }
}

/// Verifies in-process with [`jws::verify_bytes`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JwkVerifier;

#[async_trait]
impl JwsVerifier for JwkVerifier {
    async fn verify(&self, jws: &CompactJws<'_>, key: &JWK) -> Result<bool, Error> {
        let signature = match jws.decode_signature() {
            Ok(signature) => signature,
            Err(_) => return Ok(false),
        };
        jws::verify_bytes(
            jws.header.algorithm,
            jws.signing_input().as_bytes(),
            key,
            &signature,
        )
    }
}

/// Uses the public key embedded in the `jwk` header parameter.
///
/// This only proves that the JWS was signed by whoever holds that key;
/// binding the key to a trusted issuer is up to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedJwkResolver;

impl KeyResolver for EmbeddedJwkResolver {
    fn resolve(&self, header: &Header) -> Result<JWK, Error> {
        header
            .jwk
            .as_ref()
            .map(JWK::to_public)
            .ok_or_else(|| Error::Key("missing jwk header parameter".to_string()))
    }
}

/// Ignores the header and always returns a pre-shared issuer key.
#[derive(Debug, Clone)]
pub struct StaticKeyResolver(pub JWK);

impl KeyResolver for StaticKeyResolver {
    fn resolve(&self, _header: &Header) -> Result<JWK, Error> {
        Ok(self.0.to_public())
    }
}

#[cfg(all(test, feature = "secp256r1"))]
mod tests {
    use super::*;

    #[test]
    fn signer_requires_private_key() {
        let key = JWK::generate_p256().unwrap();
        assert!(matches!(
            JwkSigner::new(key.to_public()),
            Err(Error::Key(_))
        ));
        assert_eq!(JwkSigner::new(key).unwrap().algorithm(), Algorithm::ES256);
    }

    #[async_std::test]
    async fn header_follows_options() {
        let mut key = JWK::generate_p256().unwrap();
        key.key_id = Some("issuer-key-1".to_string());
        let signer = JwkSigner::new(key).unwrap();

        let options = HeaderOptions {
            type_: Some("vc+sd-jwt".to_string()),
            key_id: None,
            embed_jwk: false,
        };
        let jws = signer.sign(b"{}", &options).await.unwrap();
        let decoded = CompactJws::decode(&jws).unwrap();
        assert_eq!(decoded.header.type_.as_deref(), Some("vc+sd-jwt"));
        assert_eq!(decoded.header.key_id.as_deref(), Some("issuer-key-1"));
        assert!(decoded.header.jwk.is_none());
        assert!(matches!(
            EmbeddedJwkResolver.resolve(&decoded.header),
            Err(Error::Key(_))
        ));
    }

    #[async_std::test]
    async fn embedded_key_verifies() {
        let signer = JwkSigner::new(JWK::generate_p256().unwrap()).unwrap();
        let jws = signer.sign(b"{}", &HeaderOptions::default()).await.unwrap();
        let decoded = CompactJws::decode(&jws).unwrap();

        let key = EmbeddedJwkResolver.resolve(&decoded.header).unwrap();
        assert_eq!(key, signer.public_key());
        assert!(JwkVerifier.verify(&decoded, &key).await.unwrap());

        let other = JWK::generate_p256().unwrap();
        let key = StaticKeyResolver(other).resolve(&decoded.header).unwrap();
        assert!(!JwkVerifier.verify(&decoded, &key).await.unwrap());
    }
}
