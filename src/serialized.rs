/// Borrowed parts of a compact SD-JWT: the JWS and its disclosures.
#[derive(Debug, PartialEq, Eq)]
pub struct PartsRef<'a> {
    pub jwt: &'a str,
    pub disclosures: Vec<&'a str>,

    /// Whether the input carried a `~` disclosure section at all, even an
    /// empty one.
    pub has_disclosure_section: bool,
}

/// Splits `<JWS>~<D1>~<D2>...` into its parts.
///
/// Empty segments, such as the trailing one of `<JWS>~<D1>~`, are skipped.
pub fn deserialize_string_format(input: &str) -> Option<PartsRef<'_>> {
    let mut split = input.split('~');

    let jwt = split.next()?;
    if jwt.is_empty() {
        return None;
    }

    let has_disclosure_section = input.len() > jwt.len();
    let disclosures = split.filter(|d| !d.is_empty()).collect();

    Some(PartsRef {
        jwt,
        disclosures,
        has_disclosure_section,
    })
}

/// Joins a JWS and disclosures with `~`. The separator is only omitted when
/// `with_separator` is false and there are no disclosures.
pub fn serialize_string_format<D: AsRef<str>>(
    jwt: &str,
    disclosures: &[D],
    with_separator: bool,
) -> String {
    let mut serialized = jwt.to_owned();

    if disclosures.is_empty() {
        if with_separator {
            serialized.push('~');
        }
        return serialized;
    }

    for disclosure in disclosures {
        serialized.push('~');
        serialized.push_str(disclosure.as_ref());
    }

    serialized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_jws_and_disclosures() {
        assert_eq!(
            deserialize_string_format("a.b.c~d1~d2").unwrap(),
            PartsRef {
                jwt: "a.b.c",
                disclosures: vec!["d1", "d2"],
                has_disclosure_section: true,
            }
        );
    }

    #[test]
    fn trailing_tilde_is_tolerated() {
        let parts = deserialize_string_format("a.b.c~d1~").unwrap();
        assert_eq!(parts.disclosures, vec!["d1"]);

        let parts = deserialize_string_format("a.b.c~").unwrap();
        assert!(parts.disclosures.is_empty());
        assert!(parts.has_disclosure_section);
    }

    #[test]
    fn bare_jws() {
        let parts = deserialize_string_format("a.b.c").unwrap();
        assert!(parts.disclosures.is_empty());
        assert!(!parts.has_disclosure_section);
    }

    #[test]
    fn empty_jws_is_rejected() {
        assert_eq!(deserialize_string_format(""), None);
        assert_eq!(deserialize_string_format("~d1"), None);
    }

    #[test]
    fn join() {
        assert_eq!(serialize_string_format("a.b.c", &["d1", "d2"], false), "a.b.c~d1~d2");
        assert_eq!(serialize_string_format::<&str>("a.b.c", &[], false), "a.b.c");
        assert_eq!(serialize_string_format::<&str>("a.b.c", &[], true), "a.b.c~");
    }
}
