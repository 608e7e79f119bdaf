//! `ChainOfTrust` (§3, §4.5). Append-only store seeded with the IANA
//! root KSK anchors; grows monotonically for the lifetime of one walker
//! invocation.

use crate::record::{DnskeyRecord, DsRecord};
use std::collections::HashMap;
use trustwalk_domain::{TrustAnchorEntry, TrustWalkError};

/// Root zone KSK-2010 (key tag 19036, SHA-256 digest).
const ROOT_ANCHOR_2010_DIGEST: &str =
    "49AAC11D7B6F6446702E54A1607371607A1A41855200FD2CE1CDDE32F24E8FB5";
/// Root zone KSK-2017 (key tag 20326, SHA-256 digest).
const ROOT_ANCHOR_2017_DIGEST: &str =
    "E06D44B80B8F1D39A95C0B0D7C65D08458E880409BBC683457104237C7F8EC8D";

pub struct ChainOfTrust {
    ds_records: HashMap<u16, Vec<DsRecord>>,
    dnskeys: HashMap<u16, DnskeyRecord>,
}

impl ChainOfTrust {
    pub fn new() -> Self {
        let mut chain = Self {
            ds_records: HashMap::new(),
            dnskeys: HashMap::new(),
        };
        chain.add_ds(DsRecord {
            key_tag: 19036,
            algorithm: 8,
            digest_type: 2,
            digest: decode_hex(ROOT_ANCHOR_2010_DIGEST),
        });
        chain.add_ds(DsRecord {
            key_tag: 20326,
            algorithm: 8,
            digest_type: 2,
            digest: decode_hex(ROOT_ANCHOR_2017_DIGEST),
        });
        chain
    }

    pub fn add_ds(&mut self, ds: DsRecord) {
        self.ds_records.entry(ds.key_tag).or_default().push(ds);
    }

    pub fn add_dnskey(&mut self, key: DnskeyRecord) {
        self.dnskeys.insert(key.key_tag(), key);
    }

    pub fn get_ds(&self, key_tag: u16) -> Option<&[DsRecord]> {
        self.ds_records.get(&key_tag).map(Vec::as_slice)
    }

    pub fn get_dnskey(&self, key_tag: u16) -> Option<&DnskeyRecord> {
        self.dnskeys.get(&key_tag)
    }

    pub fn ds_count(&self) -> usize {
        self.ds_records.values().map(Vec::len).sum()
    }

    pub fn dnskey_count(&self) -> usize {
        self.dnskeys.len()
    }

    /// Builds a chain from config (SPEC_FULL's "trust-anchor overrides
    /// for testing"). Empty `overrides` means "use the bundled IANA
    /// root anchors"; non-empty overrides replace them entirely, so a
    /// test zone's own KSK digest can serve as the walker's root.
    pub fn from_overrides(overrides: &[TrustAnchorEntry]) -> Result<Self, TrustWalkError> {
        if overrides.is_empty() {
            return Ok(Self::new());
        }
        let mut chain = Self {
            ds_records: HashMap::new(),
            dnskeys: HashMap::new(),
        };
        for entry in overrides {
            let digest = decode_hex_checked(&entry.digest_hex).map_err(|detail| {
                TrustWalkError::CryptoError(format!(
                    "trust anchor override for key tag {}: {detail}",
                    entry.key_tag
                ))
            })?;
            chain.add_ds(DsRecord {
                key_tag: entry.key_tag,
                algorithm: entry.algorithm,
                digest_type: entry.digest_type,
                digest,
            });
        }
        Ok(chain)
    }
}

impl Default for ChainOfTrust {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_hex(s: &str) -> Vec<u8> {
    decode_hex_checked(s).expect("static hex literal")
}

fn decode_hex_checked(s: &str) -> Result<Vec<u8>, String> {
    if s.len() % 2 != 0 {
        return Err(format!("digest {s} has odd length"));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| format!("digest {s} contains non-hex characters"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_with_both_root_anchors() {
        let chain = ChainOfTrust::new();
        assert_eq!(chain.get_ds(19036).unwrap().len(), 1);
        assert_eq!(chain.get_ds(20326).unwrap().len(), 1);
        assert_eq!(chain.ds_count(), 2);
    }

    #[test]
    fn grows_monotonically() {
        let mut chain = ChainOfTrust::new();
        let ds_before = chain.ds_count();
        let dnskey_before = chain.dnskey_count();

        chain.add_ds(DsRecord {
            key_tag: 1,
            algorithm: 8,
            digest_type: 2,
            digest: vec![0u8; 32],
        });
        chain.add_dnskey(DnskeyRecord {
            flags: 257,
            protocol: 3,
            algorithm: 8,
            public_key: vec![1, 2, 3],
        });

        assert!(chain.ds_count() > ds_before);
        assert!(chain.dnskey_count() > dnskey_before);
    }

    #[test]
    fn empty_overrides_use_bundled_anchors() {
        let chain = ChainOfTrust::from_overrides(&[]).unwrap();
        assert_eq!(chain.ds_count(), 2);
    }

    #[test]
    fn overrides_replace_bundled_anchors_entirely() {
        let overrides = vec![TrustAnchorEntry {
            key_tag: 1,
            algorithm: 8,
            digest_type: 2,
            digest_hex: "AABBCC".to_string(),
        }];
        let chain = ChainOfTrust::from_overrides(&overrides).unwrap();
        assert_eq!(chain.ds_count(), 1);
        assert!(chain.get_ds(19036).is_none());
        assert_eq!(chain.get_ds(1).unwrap()[0].digest, vec![0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn malformed_override_digest_is_rejected() {
        let overrides = vec![TrustAnchorEntry {
            key_tag: 1,
            algorithm: 8,
            digest_type: 2,
            digest_hex: "zz".to_string(),
        }];
        assert!(ChainOfTrust::from_overrides(&overrides).is_err());
    }
}
