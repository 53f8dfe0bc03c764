use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, ParseError};
#[cfg(any(feature = "secp256r1", feature = "ed25519"))]
use crate::jwk::Params as JWKParams;
use crate::jwk::{Algorithm, JWK};

// RFC 7515 - JSON Web Signature (JWS)

/// JWS protected header.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Header {
    #[serde(rename = "alg")]
    pub algorithm: Algorithm,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwk: Option<JWK>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "kid")]
    pub key_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(rename = "typ")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    #[serde(flatten)]
    pub additional_parameters: BTreeMap<String, serde_json::Value>,
}

impl Header {
    pub fn new(algorithm: Algorithm) -> Self {
        Header {
            algorithm,
            jwk: None,
            key_id: None,
            type_: None,
            additional_parameters: BTreeMap::new(),
        }
    }
}

/// Caller-controlled parts of the protected header.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct HeaderOptions {
    /// `typ` header parameter
    #[serde(rename = "typ")]
    pub type_: Option<String>,

    /// `kid` header parameter
    #[serde(rename = "kid")]
    pub key_id: Option<String>,

    /// Embed the signer's public key as the `jwk` header parameter
    pub embed_jwk: bool,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        HeaderOptions {
            type_: None,
            key_id: None,
            embed_jwk: true,
        }
    }
}

/// A compact JWS split into its three base64url segments, with the header
/// and payload decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactJws<'a> {
    pub header: Header,
    pub payload: Vec<u8>,
    encoded_header: &'a str,
    encoded_payload: &'a str,
    encoded_signature: &'a str,
}

impl<'a> CompactJws<'a> {
    /// Splits `header.payload.signature` and decodes the header and payload.
    ///
    /// The signature segment is left encoded; decoding it is part of
    /// verification.
    pub fn decode(jws: &'a str) -> Result<Self, ParseError> {
        let mut parts = jws.splitn(3, '.');
        let (encoded_header, encoded_payload, encoded_signature) =
            match (parts.next(), parts.next(), parts.next()) {
                (Some(header), Some(payload), Some(signature)) => (header, payload, signature),
                _ => return Err(ParseError::NotCompactJws),
            };
        if encoded_header.is_empty() || encoded_signature.contains('.') {
            return Err(ParseError::NotCompactJws);
        }

        let header_json = base64::decode_config(encoded_header, base64::URL_SAFE_NO_PAD)?;
        let header: Header = serde_json::from_slice(&header_json)?;
        let payload = base64::decode_config(encoded_payload, base64::URL_SAFE_NO_PAD)?;

        Ok(CompactJws {
            header,
            payload,
            encoded_header,
            encoded_payload,
            encoded_signature,
        })
    }

    /// `BASE64URL(header) || '.' || BASE64URL(payload)`
    pub fn signing_input(&self) -> String {
        [self.encoded_header, self.encoded_payload].join(".")
    }

    pub fn encoded_signature(&self) -> &'a str {
        self.encoded_signature
    }

    pub fn decode_signature(&self) -> Result<Vec<u8>, ParseError> {
        Ok(base64::decode_config(
            self.encoded_signature,
            base64::URL_SAFE_NO_PAD,
        )?)
    }
}

fn base64_encode_json<T: Serialize>(object: &T) -> Result<String, Error> {
    let json = serde_json::to_string(&object)?;
    Ok(base64::encode_config(json, base64::URL_SAFE_NO_PAD))
}

/// Builds the signing input for `header` and an already serialized payload.
pub fn signing_input(header: &Header, payload: &[u8]) -> Result<String, Error> {
    let header_b64 = base64_encode_json(header)?;
    let payload_b64 = base64::encode_config(payload, base64::URL_SAFE_NO_PAD);
    Ok([header_b64, payload_b64].join("."))
}

/// Signs `payload` with `key` and returns the compact JWS.
pub fn encode_sign_custom_header(payload: &[u8], key: &JWK, header: &Header) -> Result<String, Error> {
    let signing_input = signing_input(header, payload)?;
    let sig_b64 = sign_bytes_b64(header.algorithm, signing_input.as_bytes(), key)?;
    Ok([signing_input, sig_b64].join("."))
}

#[cfg_attr(
    not(any(feature = "secp256r1", feature = "ed25519")),
    allow(unused_variables)
)]
pub fn sign_bytes(algorithm: Algorithm, data: &[u8], key: &JWK) -> Result<Vec<u8>, Error> {
    let signature = match (&key.params, algorithm) {
        #[cfg(feature = "secp256r1")]
        (JWKParams::EC(ec), Algorithm::ES256) => {
            use p256::ecdsa::signature::Signer;
            let signing_key = p256::ecdsa::SigningKey::try_from(ec)?;
            let sig: p256::ecdsa::Signature = signing_key
                .try_sign(data)
                .map_err(|e| Error::Signing(e.to_string()))?;
            sig.to_bytes().to_vec()
        }
        #[cfg(feature = "ed25519")]
        (JWKParams::OKP(okp), Algorithm::EdDSA) => {
            use ed25519_dalek::Signer;
            let signing_key = ed25519_dalek::SigningKey::try_from(okp)?;
            signing_key
                .try_sign(data)
                .map_err(|e| Error::Signing(e.to_string()))?
                .to_bytes()
                .to_vec()
        }
        (_, algorithm) => return Err(Error::UnsupportedAlgorithm(algorithm.as_str().to_string())),
    };
    Ok(signature)
}

pub fn sign_bytes_b64(algorithm: Algorithm, data: &[u8], key: &JWK) -> Result<String, Error> {
    let signature = sign_bytes(algorithm, data, key)?;
    let sig_b64 = base64::encode_config(signature, base64::URL_SAFE_NO_PAD);
    Ok(sig_b64)
}

/// Checks `signature` over `data`.
///
/// Returns `Ok(false)` when the signature does not match and an error when
/// the key or algorithm cannot be used at all.
#[cfg_attr(
    not(any(feature = "secp256r1", feature = "ed25519")),
    allow(unused_variables)
)]
pub fn verify_bytes(
    algorithm: Algorithm,
    data: &[u8],
    key: &JWK,
    signature: &[u8],
) -> Result<bool, Error> {
    if let Some(key_algorithm) = key.algorithm {
        if key_algorithm != algorithm {
            return Err(Error::UnsupportedAlgorithm(format!(
                "{} with a {} key",
                algorithm.as_str(),
                key_algorithm.as_str()
            )));
        }
    }
    match (&key.params, algorithm) {
        #[cfg(feature = "secp256r1")]
        (JWKParams::EC(ec), Algorithm::ES256) => {
            use p256::ecdsa::signature::Verifier;
            let verifying_key = p256::ecdsa::VerifyingKey::try_from(ec)?;
            let sig = match p256::ecdsa::Signature::from_slice(signature) {
                Ok(sig) => sig,
                Err(_) => return Ok(false),
            };
            Ok(verifying_key.verify(data, &sig).is_ok())
        }
        #[cfg(feature = "ed25519")]
        (JWKParams::OKP(okp), Algorithm::EdDSA) => {
            use ed25519_dalek::Verifier;
            let verifying_key = ed25519_dalek::VerifyingKey::try_from(okp)?;
            let sig = match ed25519_dalek::Signature::from_slice(signature) {
                Ok(sig) => sig,
                Err(_) => return Ok(false),
            };
            Ok(verifying_key.verify(data, &sig).is_ok())
        }
        (_, algorithm) => Err(Error::UnsupportedAlgorithm(algorithm.as_str().to_string())),
    }
}
