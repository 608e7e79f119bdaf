//! Signature and digest verification (§4.3, §4.4).
//!
//! RSA verification (algorithms 1, 5, 7, 8, 10) is delegated to the
//! `rsa` crate's generic PKCS#1 v1.5 verifier, parameterized by whichever
//! `Digest` impl the algorithm number calls for — this is the one place
//! this tool reaches outside its primary crypto stack (`ring`), because
//! `ring` deliberately does not implement MD5 (algorithm 1) and MD5 must
//! still be accepted for interop. ECDSA (13, 14) uses
//! `ring`'s `_FIXED` verification algorithms, which verify the raw R‖S
//! encoding DNSSEC uses directly, with no ASN.1 repacking needed.

use crate::record::{DnskeyRecord, DsRecord, RrsigRecord};
use crate::rrset::RRSet;
use crate::wire::encode_name;
use md5::Md5;
use rsa::{pkcs1v15::Pkcs1v15Sign, BigUint, RsaPublicKey};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use trustwalk_domain::TrustWalkError;

/// Verifies an RRSIG over `rrset` using `key`, trying the supplied
/// signature. Per §9's resolved open question this is called once per
/// candidate key; the caller (the walker) tries every RRSIG/key pair and
/// accepts the RRSet as valid if any one verifies.
pub fn verify_rrsig(
    rrset: &RRSet,
    rrsig: &RrsigRecord,
    key: &DnskeyRecord,
) -> Result<bool, TrustWalkError> {
    let message = rrset.signed_message(rrsig);
    match rrsig.algorithm {
        1 => verify_rsa(key, &Md5::digest(&message), Pkcs1v15Sign::new::<Md5>(), &rrsig.signature),
        5 | 7 => verify_rsa(key, &Sha1::digest(&message), Pkcs1v15Sign::new::<Sha1>(), &rrsig.signature),
        8 => verify_rsa(key, &Sha256::digest(&message), Pkcs1v15Sign::new::<Sha256>(), &rrsig.signature),
        10 => verify_rsa(key, &Sha512::digest(&message), Pkcs1v15Sign::new::<Sha512>(), &rrsig.signature),
        13 => verify_ecdsa_p256(key, &message, &rrsig.signature),
        14 => verify_ecdsa_p384(key, &message, &rrsig.signature),
        other => Err(TrustWalkError::UnsupportedAlgorithm(other)),
    }
}

/// DNSKEY → DS binding, a.k.a. `compute_sig` (§4.4): hash the owner name
/// plus the DNSKEY's canonical RDATA and compare to the DS digest.
pub fn verify_ds(ds: &DsRecord, key: &DnskeyRecord, owner_name: &str) -> Result<bool, TrustWalkError> {
    let mut buf = encode_name(owner_name);
    buf.extend_from_slice(&key.canonical_rdata());

    let digest = match ds.digest_type {
        1 => sha1::Sha1::digest(&buf).to_vec(),
        2 => Sha256::digest(&buf).to_vec(),
        other => return Err(TrustWalkError::UnsupportedDigest(other)),
    };

    Ok(digest == ds.digest)
}

fn parse_rsa_key(public_key: &[u8]) -> Result<(BigUint, BigUint), TrustWalkError> {
    if public_key.is_empty() {
        return Err(TrustWalkError::CryptoError("empty RSA public key".into()));
    }
    let (exponent_len, rest) = if public_key[0] == 0 {
        if public_key.len() < 3 {
            return Err(TrustWalkError::CryptoError(
                "truncated RSA exponent length".into(),
            ));
        }
        let len = u16::from_be_bytes([public_key[1], public_key[2]]) as usize;
        (len, &public_key[3..])
    } else {
        (public_key[0] as usize, &public_key[1..])
    };

    if rest.len() < exponent_len {
        return Err(TrustWalkError::CryptoError(
            "truncated RSA exponent".into(),
        ));
    }
    let (exponent, modulus) = rest.split_at(exponent_len);
    if modulus.is_empty() {
        return Err(TrustWalkError::CryptoError("empty RSA modulus".into()));
    }

    Ok((
        BigUint::from_bytes_be(modulus),
        BigUint::from_bytes_be(exponent),
    ))
}

fn verify_rsa(
    key: &DnskeyRecord,
    hashed: &[u8],
    scheme: Pkcs1v15Sign,
    signature: &[u8],
) -> Result<bool, TrustWalkError> {
    let (n, e) = parse_rsa_key(&key.public_key)?;
    let public_key = RsaPublicKey::new(n, e)
        .map_err(|e| TrustWalkError::CryptoError(format!("invalid RSA key: {e}")))?;
    match public_key.verify(scheme, hashed, signature) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

fn verify_ecdsa_p256(key: &DnskeyRecord, message: &[u8], signature: &[u8]) -> Result<bool, TrustWalkError> {
    if key.public_key.len() != 64 || signature.len() != 64 {
        return Ok(false);
    }
    verify_ecdsa(
        &ring::signature::ECDSA_P256_SHA256_FIXED,
        &key.public_key,
        message,
        signature,
    )
}

fn verify_ecdsa_p384(key: &DnskeyRecord, message: &[u8], signature: &[u8]) -> Result<bool, TrustWalkError> {
    if key.public_key.len() != 96 || signature.len() != 96 {
        return Ok(false);
    }
    verify_ecdsa(
        &ring::signature::ECDSA_P384_SHA384_FIXED,
        &key.public_key,
        message,
        signature,
    )
}

fn verify_ecdsa(
    algorithm: &'static dyn ring::signature::VerificationAlgorithm,
    raw_xy: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<bool, TrustWalkError> {
    let mut uncompressed = Vec::with_capacity(raw_xy.len() + 1);
    uncompressed.push(0x04);
    uncompressed.extend_from_slice(raw_xy);

    let public_key = ring::signature::UnparsedPublicKey::new(algorithm, &uncompressed);
    match public_key.verify(message, signature) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use std::net::Ipv4Addr;

    fn sample_rrset() -> RRSet {
        let mut rrset = RRSet::new("example.", 1, 1, 300);
        rrset.records.push(Record::A {
            address: Ipv4Addr::new(93, 184, 216, 34),
        });
        rrset
    }

    fn sample_rrsig() -> RrsigRecord {
        RrsigRecord {
            type_covered: 1,
            algorithm: 8,
            labels: 1,
            original_ttl: 300,
            signature_expiration: 2000000000,
            signature_inception: 1000000000,
            key_tag: 12345,
            signer_name: "example.".to_string(),
            signature: vec![0u8; 256],
        }
    }

    #[test]
    fn bogus_signature_does_not_panic_and_fails_closed() {
        let rrset = sample_rrset();
        let rrsig = sample_rrsig();
        let key = DnskeyRecord {
            flags: 256,
            protocol: 3,
            algorithm: 8,
            public_key: {
                let mut k = vec![1u8];
                k.extend(std::iter::repeat(0xAA).take(256));
                k
            },
        };
        let result = verify_rrsig(&rrset, &rrsig, &key);
        assert!(matches!(result, Ok(false) | Err(_)));
    }

    #[test]
    fn unsupported_algorithm_is_rejected() {
        let rrset = sample_rrset();
        let mut rrsig = sample_rrsig();
        rrsig.algorithm = 200;
        let key = DnskeyRecord {
            flags: 256,
            protocol: 3,
            algorithm: 200,
            public_key: vec![1, 2, 3],
        };
        let result = verify_rrsig(&rrset, &rrsig, &key);
        assert!(matches!(result, Err(TrustWalkError::UnsupportedAlgorithm(200))));
    }

    #[test]
    fn unsupported_digest_type_is_rejected() {
        let ds = DsRecord {
            key_tag: 1,
            algorithm: 8,
            digest_type: 9,
            digest: vec![],
        };
        let key = DnskeyRecord {
            flags: 257,
            protocol: 3,
            algorithm: 8,
            public_key: vec![1, 2, 3],
        };
        let result = verify_ds(&ds, &key, "example.");
        assert!(matches!(result, Err(TrustWalkError::UnsupportedDigest(9))));
    }
}
