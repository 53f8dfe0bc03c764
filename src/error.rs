use base64::DecodeError as Base64DecodeError;
use serde_json::Error as SerdeJSONError;

/// Errors of the SD-JWT issue, disclose and verify pathways.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The compact SD-JWT, its JWS or one of its disclosures is malformed
    #[error("Unable to parse SD-JWT: {0}")]
    Parse(#[from] ParseError),

    /// A selectively disclosable claim is an object or an array
    #[error("Claim `{0}` is not a scalar value; nested disclosures are not supported")]
    UnsupportedClaimShape(String),

    /// The JWS signature could not be verified
    #[error("Invalid signature: {0}")]
    SignatureInvalid(String),

    /// A disclosure digest is not part of the signed `_sd` claim
    #[error("Disclosure {0} is not contained in the SD-JWT")]
    DisclosureNotTrusted(String),

    /// Holder filtering was requested on a JWS without a disclosure section
    #[error("No disclosures found in SD-JWT")]
    NoDisclosures,

    /// Two disclosures carry the same claim name
    #[error("Multiple disclosures for claim `{0}`")]
    NameConflict(String),

    /// Unknown value of _sd_alg
    #[error("Unknown value of _sd_alg {0}")]
    UnknownSdAlg(String),

    /// The base claims contained a property reserved by SD-JWT
    #[error("The base claims contain the reserved property `{0}`")]
    ReservedClaim(String),

    /// The base claims to encode did not become a JSON object
    #[error("The base claims to encode did not become a JSON object")]
    BaseClaimsNotObject,

    /// The signer capability failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// A JWK is missing parameters or carries unusable ones
    #[error("Invalid key: {0}")]
    Key(String),

    /// The algorithm is not implemented for the given key
    #[error("Unsupported algorithm {0}")]
    UnsupportedAlgorithm(String),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Bubbled up error from serde_json while building the payload
    #[error(transparent)]
    Json(#[from] SerdeJSONError),
}

/// Causes of [`Error::Parse`].
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    /// The first segment is not `header.payload.signature`
    #[error("Not a compact JWS")]
    NotCompactJws,

    #[error("Invalid base64url: {0}")]
    Base64(#[from] Base64DecodeError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] SerdeJSONError),

    /// JWT payload claims were not a JSON object
    #[error("JWT payload claims were not a JSON object")]
    ClaimsWrongType,

    /// An _sd property was not an array of strings
    #[error("An _sd property was not an array of strings")]
    SdClaimWrongType,

    /// Type of _sd_alg was not string
    #[error("Type of _sd_alg was not string")]
    SdAlgWrongType,

    /// A disclosure did not decode to a JSON array
    #[error("A disclosure is not a JSON array")]
    DisclosureNotArray,

    /// A disclosure array did not hold exactly salt, name and value
    #[error("A disclosure must have 3 elements, found {0}")]
    DisclosureArity(usize),

    /// The salt or the name of a disclosure is not a string
    #[error("A disclosure salt or claim name is not a string")]
    DisclosureWrongType,
}

impl From<Base64DecodeError> for Error {
    fn from(e: Base64DecodeError) -> Self {
        Error::Parse(ParseError::Base64(e))
    }
}
