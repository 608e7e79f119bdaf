//! Typed record variants (§3 Data Model, §9 Design Notes).
//!
//! A single closed sum type, rather than dispatching at runtime on
//! `rdtype` over a family of loosely related structs, with one method
//! producing the canonical RFC 4034
//! rdata bytes each variant needs for RRSet canonicalization — no
//! separate per-type "encoder" object, just a match arm per variant.

use crate::wire::encode_name;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    A {
        address: Ipv4Addr,
    },
    Aaaa {
        address: Ipv6Addr,
    },
    Ns {
        target: String,
    },
    Ptr {
        target: String,
    },
    Txt {
        value: String,
    },
    Mx {
        preference: u16,
        target: String,
    },
    Soa {
        mname: String,
        rname: String,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum: u32,
    },
    Dnskey(DnskeyRecord),
    Ds(DsRecord),
    Rrsig(RrsigRecord),
}

impl Record {
    /// RFC 4034 §6.2 canonical RDATA: the bytes that follow `rdlength`
    /// in a record's canonical wire form. Embedded names are lowercased
    /// and uncompressed, per the same rule applied to the owner name.
    pub fn canonical_rdata(&self) -> Vec<u8> {
        match self {
            Record::A { address } => address.octets().to_vec(),
            Record::Aaaa { address } => address.octets().to_vec(),
            Record::Ns { target } => encode_name(target),
            Record::Ptr { target } => encode_name(target),
            Record::Txt { value } => {
                let bytes = value.as_bytes();
                let len = bytes.len().min(255) as u8;
                let mut out = vec![len];
                out.extend_from_slice(&bytes[..len as usize]);
                out
            }
            Record::Mx { preference, target } => {
                let mut out = preference.to_be_bytes().to_vec();
                out.extend_from_slice(&encode_name(target));
                out
            }
            Record::Soa {
                mname,
                rname,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => {
                let mut out = encode_name(mname);
                out.extend_from_slice(&encode_name(rname));
                out.extend_from_slice(&serial.to_be_bytes());
                out.extend_from_slice(&refresh.to_be_bytes());
                out.extend_from_slice(&retry.to_be_bytes());
                out.extend_from_slice(&expire.to_be_bytes());
                out.extend_from_slice(&minimum.to_be_bytes());
                out
            }
            Record::Dnskey(k) => k.canonical_rdata(),
            Record::Ds(ds) => ds.canonical_rdata(),
            Record::Rrsig(sig) => sig.canonical_rdata(),
        }
    }

    pub fn as_dnskey(&self) -> Option<&DnskeyRecord> {
        match self {
            Record::Dnskey(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_ds(&self) -> Option<&DsRecord> {
        match self {
            Record::Ds(ds) => Some(ds),
            _ => None,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::A { address } => write!(f, "A {address}"),
            Record::Aaaa { address } => write!(f, "AAAA {address}"),
            Record::Ns { target } => write!(f, "NS {target}"),
            Record::Ptr { target } => write!(f, "PTR {target}"),
            Record::Txt { value } => write!(f, "TXT \"{value}\""),
            Record::Mx { preference, target } => write!(f, "MX {preference} {target}"),
            Record::Soa { mname, rname, .. } => write!(f, "SOA {mname} {rname}"),
            Record::Dnskey(k) => write!(f, "{k}"),
            Record::Ds(ds) => write!(f, "{ds}"),
            Record::Rrsig(sig) => write!(f, "{sig}"),
        }
    }
}

/// `DNSKEY(flags, protocol, algorithm, public_key)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnskeyRecord {
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

impl DnskeyRecord {
    pub const FLAG_KSK: u16 = 257;
    pub const FLAG_ZSK: u16 = 256;

    pub fn is_ksk(&self) -> bool {
        self.flags == Self::FLAG_KSK
    }

    pub fn is_zsk(&self) -> bool {
        self.flags == Self::FLAG_ZSK
    }

    pub fn canonical_rdata(&self) -> Vec<u8> {
        let mut out = self.flags.to_be_bytes().to_vec();
        out.push(self.protocol);
        out.push(self.algorithm);
        out.extend_from_slice(&self.public_key);
        out
    }

    /// RFC 4034 Appendix B.1 key tag algorithm, folded over the RDATA.
    pub fn key_tag(&self) -> u16 {
        let rdata = self.canonical_rdata();
        let mut sum: u32 = 0;
        for (i, &b) in rdata.iter().enumerate() {
            if i % 2 == 0 {
                sum += (b as u32) << 8;
            } else {
                sum += b as u32;
            }
        }
        sum += (sum >> 16) & 0xFFFF;
        (sum & 0xFFFF) as u16
    }
}

impl fmt::Display for DnskeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DNSKEY flags={} proto={} alg={} tag={}",
            self.flags,
            self.protocol,
            self.algorithm,
            self.key_tag()
        )
    }
}

/// `DS(key_tag, algorithm, digest_type, digest)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DsRecord {
    pub key_tag: u16,
    pub algorithm: u8,
    pub digest_type: u8,
    pub digest: Vec<u8>,
}

impl DsRecord {
    pub fn canonical_rdata(&self) -> Vec<u8> {
        let mut out = self.key_tag.to_be_bytes().to_vec();
        out.push(self.algorithm);
        out.push(self.digest_type);
        out.extend_from_slice(&self.digest);
        out
    }
}

impl fmt::Display for DsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DS tag={} alg={} digest_type={} digest={}",
            self.key_tag,
            self.algorithm,
            self.digest_type,
            hex_string(&self.digest)
        )
    }
}

/// `RRSIG(type_covered, algorithm, labels, original_ttl, expiration,
/// inception, key_tag, signer, signature)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RrsigRecord {
    pub type_covered: u16,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,
    pub signature_expiration: u32,
    pub signature_inception: u32,
    pub key_tag: u16,
    pub signer_name: String,
    pub signature: Vec<u8>,
}

impl RrsigRecord {
    pub fn canonical_rdata(&self) -> Vec<u8> {
        let mut out = self.rdata_prefix();
        out.extend_from_slice(&self.signature);
        out
    }

    /// The RRSIG rdata prefix (§4.2): everything up to and including the
    /// signer name, but not the signature. This is the prefix prepended
    /// to the canonical RRSet to build the signed message.
    pub fn rdata_prefix(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(18 + self.signer_name.len() + 2);
        out.extend_from_slice(&self.type_covered.to_be_bytes());
        out.push(self.algorithm);
        out.push(self.labels);
        out.extend_from_slice(&self.original_ttl.to_be_bytes());
        out.extend_from_slice(&self.signature_expiration.to_be_bytes());
        out.extend_from_slice(&self.signature_inception.to_be_bytes());
        out.extend_from_slice(&self.key_tag.to_be_bytes());
        out.extend_from_slice(&encode_name(&self.signer_name));
        out
    }
}

impl fmt::Display for RrsigRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RRSIG type_covered={} alg={} tag={} signer={}",
            self.type_covered, self.algorithm, self.key_tag, self.signer_name
        )
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 4034 Appendix B.1 worked example.
    #[test]
    fn key_tag_matches_rfc4034_example() {
        let public_key = base64_decode(
            "AQPSKmynfzW4kyBv015MUG2DeIQ3Cbl+BBZH4b/0PY1kxkmvHjcZc8nokfzj31GajIQKY+5CptLr3buXA10hWqTkF7j1RQp2mSHHtx/IhbgABh2TkjeUFDmv/i8TbBK3sDpdvMoPFCXl5rBlUiW5Y7YK9ntwb3ZNTF3fwlmgUZNM/ytlVIuJ6nX7AR6mujqsXVSrlN0x36bgsaCFPOZMoU8b0Pbpll1X7vJIB3zxvPIl6YlJOJGJQx9bAoVe4tkRzjHYTtNelkMBIXBpH0mgAWnmBqX+BuXEOR6lG3SwFnBS4Vh9PRcf1OadaUdF6r9IBg==",
        );
        let key = DnskeyRecord {
            flags: 256,
            protocol: 3,
            algorithm: 5,
            public_key,
        };
        assert_eq!(key.key_tag(), 60485);
    }

    #[test]
    fn ksk_zsk_classification() {
        let ksk = DnskeyRecord {
            flags: 257,
            protocol: 3,
            algorithm: 8,
            public_key: vec![1, 2, 3],
        };
        assert!(ksk.is_ksk());
        assert!(!ksk.is_zsk());
    }

    fn base64_decode(s: &str) -> Vec<u8> {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        STANDARD.decode(s).expect("valid base64 test vector")
    }
}
