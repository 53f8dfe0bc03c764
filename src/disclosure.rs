use base64::URL_SAFE_NO_PAD;
use rand::{CryptoRng, RngCore};
use serde_json::Value;

use crate::digest::{hash_encoded_disclosure, Hasher, SdAlg};
use crate::{Error, ParseError};

/// Disclosure as encoded
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Disclosure {
    /// Base 64 of disclosure array
    pub encoded: String,

    /// Base 64 of hash of `encoded`
    pub hash: String,
}

impl Disclosure {
    /// Encodes a property disclosure with a fresh salt of `salt_size` bytes
    /// and digests it.
    pub fn new<R: RngCore + CryptoRng>(
        rng: &mut R,
        salt_size: usize,
        hasher: &impl Hasher,
        sd_alg: SdAlg,
        claim_name: &str,
        claim_value: &Value,
    ) -> Result<Self, Error> {
        let encoded = encode_disclosure_with_rng(rng, salt_size, claim_name, claim_value)?;
        let hash = hash_encoded_disclosure(hasher, sd_alg, &encoded);
        Ok(Disclosure { encoded, hash })
    }
}

/// Rejects claim values that would need recursive digesting.
pub fn check_claim_shape(claim_name: &str, claim_value: &Value) -> Result<(), Error> {
    match claim_value {
        Value::Object(_) | Value::Array(_) => {
            Err(Error::UnsupportedClaimShape(claim_name.to_owned()))
        }
        _ => Ok(()),
    }
}

pub fn encode_disclosure_with_salt(
    salt: &str,
    claim_name: &str,
    claim_value: &Value,
) -> Result<String, Error> {
    check_claim_shape(claim_name, claim_value)?;

    let disclosure = serde_json::json!([salt, claim_name, claim_value]);
    let json_string = serde_jcs::to_string(&disclosure)?;

    Ok(base64::encode_config(json_string, URL_SAFE_NO_PAD))
}

pub fn encode_disclosure_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
    salt_size: usize,
    claim_name: &str,
    claim_value: &Value,
) -> Result<String, Error> {
    let mut salt_bytes = vec![0u8; salt_size];
    rng.fill_bytes(&mut salt_bytes);

    let salt = base64::encode_config(&salt_bytes, URL_SAFE_NO_PAD);

    encode_disclosure_with_salt(&salt, claim_name, claim_value)
}

/// A disclosure decoded back into its `[salt, name, value]` triple.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedDisclosure {
    pub salt: String,
    pub name: String,
    pub value: Value,
}

impl DecodedDisclosure {
    pub fn new(encoded: &str) -> Result<Self, ParseError> {
        let bytes = base64::decode_config(encoded, URL_SAFE_NO_PAD)?;
        let json: Value = serde_json::from_slice(&bytes)?;

        match json {
            Value::Array(values) => match <[Value; 3]>::try_from(values) {
                Ok([salt, name, value]) => validate_property_disclosure(salt, name, value),
                Err(values) => Err(ParseError::DisclosureArity(values.len())),
            },
            _ => Err(ParseError::DisclosureNotArray),
        }
    }
}

fn validate_property_disclosure(
    salt: Value,
    name: Value,
    value: Value,
) -> Result<DecodedDisclosure, ParseError> {
    match (salt, name) {
        (Value::String(salt), Value::String(name)) => Ok(DecodedDisclosure { salt, name, value }),
        _ => Err(ParseError::DisclosureWrongType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::digest::Sha2Hasher;

    struct CountingRng(u8);

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            let mut bytes = [0u8; 4];
            self.fill_bytes(&mut bytes);
            u32::from_le_bytes(bytes)
        }

        fn next_u64(&mut self) -> u64 {
            let mut bytes = [0u8; 8];
            self.fill_bytes(&mut bytes);
            u64::from_le_bytes(bytes)
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for byte in dest.iter_mut() {
                *byte = self.0;
                self.0 = self.0.wrapping_add(1);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for CountingRng {}

    #[test]
    fn test_encode_disclosure() {
        assert_eq!(
            encode_disclosure_with_salt(
                "_26bc4LT-ac6q2KI6cBW5es",
                "family_name",
                &serde_json::json!("Möbius"),
            )
            .unwrap(),
            "WyJfMjZiYzRMVC1hYzZxMktJNmNCVzVlcyIsImZhbWlseV9uYW1lIiwiTcO2Yml1cyJd",
        )
    }

    #[test]
    fn nested_values_are_rejected() {
        let err = encode_disclosure_with_salt("salt", "address", &serde_json::json!({"street": "x"}))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedClaimShape(name) if name == "address"));

        let err = encode_disclosure_with_salt("salt", "nationalities", &serde_json::json!(["DE"]))
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedClaimShape(_)));

        assert!(encode_disclosure_with_salt("salt", "middle_name", &Value::Null).is_ok());
    }

    #[test]
    fn salt_is_drawn_from_rng() {
        let mut rng = CountingRng(0);
        let encoded =
            encode_disclosure_with_rng(&mut rng, 16, "age", &serde_json::json!(21)).unwrap();
        let decoded = DecodedDisclosure::new(&encoded).unwrap();

        let expected_salt = base64::encode_config(
            hex_literal::hex!("000102030405060708090a0b0c0d0e0f"),
            URL_SAFE_NO_PAD,
        );
        assert_eq!(decoded.salt, expected_salt);
        assert_eq!(decoded.name, "age");
        assert_eq!(decoded.value, serde_json::json!(21));
    }

    #[test]
    fn consecutive_salts_differ() {
        let mut rng = CountingRng(0);
        let first = Disclosure::new(
            &mut rng,
            16,
            &Sha2Hasher,
            SdAlg::Sha256,
            "name",
            &serde_json::json!("John Doe"),
        )
        .unwrap();
        let second = Disclosure::new(
            &mut rng,
            16,
            &Sha2Hasher,
            SdAlg::Sha256,
            "name",
            &serde_json::json!("John Doe"),
        )
        .unwrap();
        assert_ne!(first.encoded, second.encoded);
        assert_ne!(first.hash, second.hash);
    }

    #[test]
    fn decode_rfc_disclosure() {
        assert_eq!(
            DecodedDisclosure::new("WyI2cU1RdlJMNWhhaiIsICJmYW1pbHlfbmFtZSIsICJNw7ZiaXVzIl0")
                .unwrap(),
            DecodedDisclosure {
                salt: "6qMQvRL5haj".to_owned(),
                name: "family_name".to_owned(),
                value: serde_json::json!("Möbius"),
            }
        )
    }

    #[test]
    fn decode_rejects_wrong_arity() {
        // ["nPuoQnkRFq3BIeAm7AnXFA", "DE"]
        assert!(matches!(
            DecodedDisclosure::new("WyJuUHVvUW5rUkZxM0JJZUFtN0FuWEZBIiwgIkRFIl0"),
            Err(ParseError::DisclosureArity(2))
        ));
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            DecodedDisclosure::new("not base64!"),
            Err(ParseError::Base64(_))
        ));
        // "{}"
        assert!(matches!(
            DecodedDisclosure::new("e30"),
            Err(ParseError::DisclosureNotArray)
        ));
        // [1, "name", "value"]
        let numeric_salt = base64::encode_config(r#"[1,"name","value"]"#, URL_SAFE_NO_PAD);
        assert!(matches!(
            DecodedDisclosure::new(&numeric_salt),
            Err(ParseError::DisclosureWrongType)
        ));
    }
}
