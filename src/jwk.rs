use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::Error;

// RFC 7517 - JSON Web Key (JWK)
// RFC 8037 - CFRG Elliptic Curve Diffie-Hellman (ECDH) and Signatures in JOSE

/// JWS signature algorithms understood by the local signer and verifier.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    ES256,
    EdDSA,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::ES256 => "ES256",
            Algorithm::EdDSA => "EdDSA",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct JWK {
    #[serde(rename = "alg")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<Algorithm>,
    #[serde(rename = "kid")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    #[serde(flatten)]
    pub params: Params,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "kty")]
pub enum Params {
    EC(ECParams),
    OKP(OctetParams),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ECParams {
    // Parameters for Elliptic Curve Public Keys
    #[serde(rename = "crv")]
    pub curve: String,
    #[serde(rename = "x")]
    pub x_coordinate: Base64urlUInt,
    #[serde(rename = "y")]
    pub y_coordinate: Base64urlUInt,

    // Parameters for Elliptic Curve Private Keys
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecc_private_key: Option<Base64urlUInt>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct OctetParams {
    // Parameters for Octet Key Pair Public Keys
    #[serde(rename = "crv")]
    pub curve: String,
    #[serde(rename = "x")]
    pub public_key: Base64urlUInt,

    // Parameters for Octet Key Pair Private Keys
    #[serde(rename = "d")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<Base64urlUInt>,
}

impl Drop for ECParams {
    fn drop(&mut self) {
        // Zeroize private key
        if let Some(ref mut d) = self.ecc_private_key {
            d.zeroize();
        }
    }
}

impl Drop for OctetParams {
    fn drop(&mut self) {
        // Zeroize private key
        if let Some(ref mut d) = self.private_key {
            d.zeroize();
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Zeroize)]
#[serde(try_from = "String")]
#[serde(into = "Base64urlUIntString")]
pub struct Base64urlUInt(pub Vec<u8>);
type Base64urlUIntString = String;

impl TryFrom<String> for Base64urlUInt {
    type Error = base64::DecodeError;
    fn try_from(data: String) -> Result<Self, Self::Error> {
        Ok(Base64urlUInt(base64::decode_config(
            data,
            base64::URL_SAFE_NO_PAD,
        )?))
    }
}

impl From<Base64urlUInt> for Base64urlUIntString {
    fn from(data: Base64urlUInt) -> Base64urlUIntString {
        base64::encode_config(&data.0, base64::URL_SAFE_NO_PAD)
    }
}

impl JWK {
    #[cfg(feature = "secp256r1")]
    pub fn generate_p256() -> Result<JWK, Error> {
        let mut rng = rand::rngs::OsRng {};
        let secret_key = p256::ecdsa::SigningKey::random(&mut rng);
        let mut params = ECParams::try_from(secret_key.verifying_key())?;
        params.ecc_private_key = Some(Base64urlUInt(secret_key.to_bytes().to_vec()));
        Ok(JWK::from(Params::EC(params)))
    }

    #[cfg(feature = "ed25519")]
    pub fn generate_ed25519() -> Result<JWK, Error> {
        let mut rng = rand::rngs::OsRng {};
        let secret_key = ed25519_dalek::SigningKey::generate(&mut rng);
        Ok(JWK::from(Params::OKP(OctetParams {
            curve: "Ed25519".to_string(),
            public_key: Base64urlUInt(secret_key.verifying_key().to_bytes().to_vec()),
            private_key: Some(Base64urlUInt(secret_key.to_bytes().to_vec())),
        })))
    }

    /// The key without its private parameters.
    pub fn to_public(&self) -> Self {
        let params = match &self.params {
            Params::EC(ec) => Params::EC(ECParams {
                curve: ec.curve.clone(),
                x_coordinate: ec.x_coordinate.clone(),
                y_coordinate: ec.y_coordinate.clone(),
                ecc_private_key: None,
            }),
            Params::OKP(okp) => Params::OKP(OctetParams {
                curve: okp.curve.clone(),
                public_key: okp.public_key.clone(),
                private_key: None,
            }),
        };
        JWK {
            algorithm: self.algorithm,
            key_id: self.key_id.clone(),
            params,
        }
    }

    pub fn is_public(&self) -> bool {
        match &self.params {
            Params::EC(ec) => ec.ecc_private_key.is_none(),
            Params::OKP(okp) => okp.private_key.is_none(),
        }
    }

    /// The `alg` parameter, or the algorithm implied by the curve.
    pub fn get_algorithm(&self) -> Option<Algorithm> {
        if let Some(algorithm) = self.algorithm {
            return Some(algorithm);
        }
        match &self.params {
            Params::EC(ec) if ec.curve == "P-256" => Some(Algorithm::ES256),
            Params::OKP(okp) if okp.curve == "Ed25519" => Some(Algorithm::EdDSA),
            _ => None,
        }
    }
}

impl From<Params> for JWK {
    fn from(params: Params) -> Self {
        Self {
            algorithm: None,
            key_id: None,
            params,
        }
    }
}

#[cfg(feature = "secp256r1")]
impl TryFrom<&p256::ecdsa::VerifyingKey> for ECParams {
    type Error = Error;
    fn try_from(pk: &p256::ecdsa::VerifyingKey) -> Result<Self, Self::Error> {
        let encoded_point = pk.to_encoded_point(false);
        let x = encoded_point
            .x()
            .ok_or_else(|| Error::Key("missing point x".to_string()))?;
        let y = encoded_point
            .y()
            .ok_or_else(|| Error::Key("missing point y".to_string()))?;
        Ok(ECParams {
            curve: "P-256".to_string(),
            x_coordinate: Base64urlUInt(x.to_vec()),
            y_coordinate: Base64urlUInt(y.to_vec()),
            ecc_private_key: None,
        })
    }
}

#[cfg(feature = "secp256r1")]
fn check_p256_curve(params: &ECParams) -> Result<(), Error> {
    if params.curve != "P-256" {
        return Err(Error::Key(format!("curve {} not implemented", params.curve)));
    }
    Ok(())
}

#[cfg(feature = "secp256r1")]
impl TryFrom<&ECParams> for p256::ecdsa::SigningKey {
    type Error = Error;
    fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
        check_p256_curve(params)?;
        let private_key = params
            .ecc_private_key
            .as_ref()
            .ok_or_else(|| Error::Key("missing private key".to_string()))?;
        p256::ecdsa::SigningKey::from_slice(&private_key.0).map_err(|e| Error::Key(e.to_string()))
    }
}

#[cfg(feature = "secp256r1")]
impl TryFrom<&ECParams> for p256::ecdsa::VerifyingKey {
    type Error = Error;
    fn try_from(params: &ECParams) -> Result<Self, Self::Error> {
        check_p256_curve(params)?;
        let x = &params.x_coordinate.0;
        let y = &params.y_coordinate.0;
        if x.len() != 32 || y.len() != 32 {
            return Err(Error::Key("P-256 coordinates must be 32 bytes".to_string()));
        }
        let encoded_point = p256::EncodedPoint::from_affine_coordinates(
            p256::FieldBytes::from_slice(x),
            p256::FieldBytes::from_slice(y),
            false,
        );
        p256::ecdsa::VerifyingKey::from_encoded_point(&encoded_point)
            .map_err(|e| Error::Key(e.to_string()))
    }
}

#[cfg(feature = "ed25519")]
fn ed25519_bytes(curve: &str, bytes: &Base64urlUInt) -> Result<[u8; 32], Error> {
    if curve != "Ed25519" {
        return Err(Error::Key(format!("curve {} not implemented", curve)));
    }
    <[u8; 32]>::try_from(bytes.0.as_slice())
        .map_err(|_| Error::Key("Ed25519 keys must be 32 bytes".to_string()))
}

#[cfg(feature = "ed25519")]
impl TryFrom<&OctetParams> for ed25519_dalek::SigningKey {
    type Error = Error;
    fn try_from(params: &OctetParams) -> Result<Self, Self::Error> {
        let private_key = params
            .private_key
            .as_ref()
            .ok_or_else(|| Error::Key("missing private key".to_string()))?;
        let secret = ed25519_bytes(&params.curve, private_key)?;
        Ok(ed25519_dalek::SigningKey::from_bytes(&secret))
    }
}

#[cfg(feature = "ed25519")]
impl TryFrom<&OctetParams> for ed25519_dalek::VerifyingKey {
    type Error = Error;
    fn try_from(params: &OctetParams) -> Result<Self, Self::Error> {
        let public = ed25519_bytes(&params.curve, &params.public_key)?;
        ed25519_dalek::VerifyingKey::from_bytes(&public).map_err(|e| Error::Key(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const P256_JSON: &str = r#"{
        "kty": "EC",
        "crv": "P-256",
        "kid": "rpaXW8yADRnS2150CdsMtftwxtzSiVTV9bgHHG86v-E",
        "x": "UX7TC8uQ9sn06c3DxXy1Ua5V9BK-cb9fQfukVrCLD8s",
        "y": "yNXRKOnwBMTx536uajfNHklxpG9bAbdLlmVn6-XuK0Q",
        "d": "oYVImrMZjUclmWuhqa6bjzqGx5HFkbx76_00oWUHiLw",
        "alg": "ES256"
    }"#;

    #[test]
    fn p256_key_round_trips_through_json() {
        let jwk: JWK = serde_json::from_str(P256_JSON).unwrap();
        assert_eq!(jwk.get_algorithm(), Some(Algorithm::ES256));
        assert!(!jwk.is_public());
        match &jwk.params {
            Params::EC(ec) => assert_eq!(ec.x_coordinate.0.len(), 32),
            Params::OKP(_) => panic!("expected EC key"),
        }

        let public = jwk.to_public();
        assert!(public.is_public());
        let json = serde_json::to_value(&public).unwrap();
        assert_eq!(json["kty"], "EC");
        assert_eq!(json["x"], "UX7TC8uQ9sn06c3DxXy1Ua5V9BK-cb9fQfukVrCLD8s");
        assert!(json.get("d").is_none());
    }

    #[test]
    fn algorithm_is_implied_by_curve() {
        let jwk: JWK = serde_json::from_value(serde_json::json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"
        }))
        .unwrap();
        assert_eq!(jwk.get_algorithm(), Some(Algorithm::EdDSA));
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let result: Result<JWK, _> = serde_json::from_value(serde_json::json!({
            "kty": "OKP",
            "crv": "Ed25519",
            "x": "not base64!"
        }));
        assert!(result.is_err());
    }

    #[cfg(feature = "secp256r1")]
    #[test]
    fn p256_public_key_matches_private_key() {
        let jwk = JWK::generate_p256().unwrap();
        let Params::EC(ec) = &jwk.params else {
            panic!("expected EC key")
        };
        let signing_key = p256::ecdsa::SigningKey::try_from(ec).unwrap();
        let verifying_key = p256::ecdsa::VerifyingKey::try_from(ec).unwrap();
        assert_eq!(signing_key.verifying_key(), &verifying_key);
    }

    #[cfg(feature = "ed25519")]
    #[test]
    fn ed25519_public_key_matches_private_key() {
        let jwk = JWK::generate_ed25519().unwrap();
        let Params::OKP(okp) = &jwk.params else {
            panic!("expected OKP key")
        };
        let signing_key = ed25519_dalek::SigningKey::try_from(okp).unwrap();
        let verifying_key = ed25519_dalek::VerifyingKey::try_from(okp).unwrap();
        assert_eq!(signing_key.verifying_key(), verifying_key);
    }
}
