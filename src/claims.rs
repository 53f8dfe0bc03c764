use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// A single value or an array of them, as the `aud` claim allows.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::One(_) => false,
            Self::Many(values) => values.is_empty(),
        }
    }

    pub fn contains(&self, x: &T) -> bool
    where
        T: PartialEq<T>,
    {
        match self {
            Self::One(value) => x == value,
            Self::Many(values) => values.contains(x),
        }
    }

    pub fn first(&self) -> Option<&T> {
        match self {
            Self::One(value) => Some(value),
            Self::Many(values) => values.first(),
        }
    }
}

impl<T> IntoIterator for OneOrMany<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        match self {
            Self::One(value) => vec![value].into_iter(),
            Self::Many(values) => values.into_iter(),
        }
    }
}

/// NumericDate (RFC 7519 section 2): seconds since the Unix epoch, possibly
/// with a fractional part.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, PartialOrd)]
pub struct NumericDate(#[serde(serialize_with = "interop_serialize")] f64);

/// Whole seconds serialize as an integer, since many JWT libraries only
/// accept integers.
fn interop_serialize<S>(x: &f64, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if x.fract() != 0.0 {
        s.serialize_f64(*x)
    } else {
        s.serialize_i64(*x as i64)
    }
}

impl NumericDate {
    pub fn from_seconds(seconds: f64) -> Self {
        NumericDate(seconds)
    }

    pub fn as_seconds(self) -> f64 {
        self.0
    }
}

impl From<i64> for NumericDate {
    fn from(seconds: i64) -> Self {
        NumericDate(seconds as f64)
    }
}

/// Registered JWT claims (RFC 7519 section 4.1) with any custom claims
/// flattened alongside.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct RegisteredClaims {
    #[serde(rename = "iss")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    #[serde(rename = "sub")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(rename = "aud")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<OneOrMany<String>>,

    #[serde(rename = "exp")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<NumericDate>,

    #[serde(rename = "nbf")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_before: Option<NumericDate>,

    #[serde(rename = "iat")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<NumericDate>,

    #[serde(rename = "jti")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jwt_id: Option<String>,

    #[serde(flatten)]
    pub custom: Map<String, Value>,
}
