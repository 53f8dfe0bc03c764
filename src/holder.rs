use log::debug;

use crate::disclosure::DecodedDisclosure;
use crate::serialized::{deserialize_string_format, serialize_string_format, PartsRef};
use crate::{Error, ParseError};

fn split(serialized: &str) -> Result<PartsRef<'_>, Error> {
    let parts = deserialize_string_format(serialized).ok_or(ParseError::NotCompactJws)?;
    if !parts.has_disclosure_section {
        return Err(Error::NoDisclosures);
    }
    Ok(parts)
}

/// Keeps only the disclosures whose claim name is in `names`.
///
/// The JWS segment is copied verbatim and the surviving disclosures keep
/// their order. Names without a matching disclosure are ignored. No signing
/// key is involved: digests of removed disclosures stay in the signed `_sd`.
pub fn disclose_claims<N: AsRef<str>>(serialized: &str, names: &[N]) -> Result<String, Error> {
    let parts = split(serialized)?;

    let mut kept = Vec::with_capacity(parts.disclosures.len());
    for disclosure in &parts.disclosures {
        let decoded = DecodedDisclosure::new(disclosure)?;
        if names.iter().any(|name| name.as_ref() == decoded.name) {
            kept.push(*disclosure);
        }
    }

    debug!(
        "holder kept {} of {} disclosures",
        kept.len(),
        parts.disclosures.len()
    );

    Ok(serialize_string_format(parts.jwt, &kept, true))
}

/// Decodes the disclosures a holder carries, in presentation order.
///
/// Nothing is verified here; use it to decide what to reveal.
pub fn list_disclosures(serialized: &str) -> Result<Vec<DecodedDisclosure>, Error> {
    let parts = split(serialized)?;
    parts
        .disclosures
        .iter()
        .map(|disclosure| DecodedDisclosure::new(disclosure).map_err(Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::disclosure::encode_disclosure_with_salt;

    const JWS: &str = "eyJhbGciOiJFUzI1NiJ9.e30.c2ln";

    fn disclosure(salt: &str, name: &str, value: serde_json::Value) -> String {
        encode_disclosure_with_salt(salt, name, &value).unwrap()
    }

    fn sd_jwt() -> (String, String, String) {
        let name = disclosure("c2FsdDE", "name", serde_json::json!("John Doe"));
        let age = disclosure("c2FsdDI", "age", serde_json::json!(21));
        (format!("{}~{}~{}", JWS, name, age), name, age)
    }

    #[test]
    fn keeps_requested_claims() {
        let (serialized, name, _) = sd_jwt();
        let disclosed = disclose_claims(&serialized, &["name"]).unwrap();
        assert_eq!(disclosed, format!("{}~{}", JWS, name));
    }

    #[test]
    fn keeps_order_of_input() {
        let (serialized, _, _) = sd_jwt();
        let disclosed = disclose_claims(&serialized, &["age", "name"]).unwrap();
        assert_eq!(disclosed, serialized);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let (serialized, _, age) = sd_jwt();
        let disclosed = disclose_claims(&serialized, &["age", "email"]).unwrap();
        assert_eq!(disclosed, format!("{}~{}", JWS, age));
    }

    #[test]
    fn filtering_everything_keeps_separator() {
        let (serialized, _, _) = sd_jwt();
        let disclosed = disclose_claims::<&str>(&serialized, &[]).unwrap();
        assert_eq!(disclosed, format!("{}~", JWS));
        assert_eq!(disclose_claims::<&str>(&disclosed, &[]).unwrap(), disclosed);
    }

    #[test]
    fn idempotent() {
        let (serialized, _, _) = sd_jwt();
        let once = disclose_claims(&serialized, &["name"]).unwrap();
        let twice = disclose_claims(&once, &["name"]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn bare_jws_has_no_disclosures() {
        assert!(matches!(
            disclose_claims(JWS, &["name"]),
            Err(Error::NoDisclosures)
        ));
    }

    #[test]
    fn malformed_disclosure_is_a_parse_error() {
        let serialized = format!("{}~not-a-disclosure", JWS);
        assert!(matches!(
            disclose_claims(&serialized, &["name"]),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn lists_claims() {
        let (serialized, _, _) = sd_jwt();
        let names: Vec<String> = list_disclosures(&serialized)
            .unwrap()
            .into_iter()
            .map(|disclosure| disclosure.name)
            .collect();
        assert_eq!(names, vec!["name", "age"]);
    }
}
