//! Wire encoding of domain names (§4.1).
//!
//! Used for: the `signer` field of an RRSIG's canonical rdata prefix, the
//! owner name of each record during RRSet canonicalization, and the DS
//! digest input. All three contexts require the same canonical,
//! uncompressed, lowercased form.

/// Encodes `name` (presentation form, trailing dot optional) as the
/// sequence of length-prefixed labels terminated by a zero octet. The
/// root name `"."` encodes as the single zero octet.
///
/// `compute_sig` in the reference tool strips the trailing dot only for
/// the root name and otherwise leaves a trailing empty split element;
/// encoding that empty element as a zero-length label reduces, for any
/// non-root name, to exactly the standard terminator byte produced here
/// — so this single implementation covers both cases without a special
/// root branch beyond the trim below.
pub fn encode_name(name: &str) -> Vec<u8> {
    let trimmed = name.trim_end_matches('.');
    let mut buf = Vec::new();
    if !trimmed.is_empty() {
        for label in trimmed.split('.') {
            let lower = label.to_ascii_lowercase();
            buf.push(lower.len() as u8);
            buf.extend_from_slice(lower.as_bytes());
        }
    }
    buf.push(0);
    buf
}

/// Splits a dot-normalized FQDN into the ordered list of progressively
/// longer suffixes, root first (§8 `split_qname`).
///
/// `split_qname("a.b.c.")` == `[".", "c.", "b.c.", "a.b.c."]`;
/// `split_qname(".")` == `["."]`.
pub fn split_qname(qname: &str) -> Vec<String> {
    let trimmed = qname.trim_end_matches('.');
    if trimmed.is_empty() {
        return vec![".".to_string()];
    }
    let labels: Vec<&str> = trimmed.split('.').collect();
    let mut out = vec![".".to_string()];
    for i in (0..labels.len()).rev() {
        out.push(format!("{}.", labels[i..].join(".")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_encodes_to_single_zero_octet() {
        assert_eq!(encode_name("."), vec![0u8]);
    }

    #[test]
    fn simple_name_encodes_labels() {
        let wire = encode_name("example.com.");
        assert_eq!(
            wire,
            vec![7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0]
        );
    }

    #[test]
    fn encoding_lowercases_labels() {
        assert_eq!(encode_name("ExAmple."), encode_name("example."));
    }

    #[test]
    fn split_qname_root() {
        assert_eq!(split_qname("."), vec!["."]);
    }

    #[test]
    fn split_qname_full_chain() {
        assert_eq!(
            split_qname("a.b.c."),
            vec![".", "c.", "b.c.", "a.b.c."]
        );
    }
}
