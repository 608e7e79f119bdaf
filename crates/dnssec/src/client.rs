//! DNS client facade (§4.6): builds an EDNS0 query, sends it over UDP
//! with `tokio`, and maps the response into a typed `RRSet` + companion
//! RRSIGs. Wire construction/parsing is handled entirely by
//! `hickory-proto`, following the donor's `message_builder`/
//! `response_parser` split, generalized here to also decode the DNSSEC
//! record types via `hickory_proto::dnssec::rdata::DNSSECRData`.

use hickory_proto::dnssec::rdata::DNSSECRData;
use hickory_proto::dnssec::PublicKey;
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{DNSClass, Name, RData, Record as HickoryRecord, RecordType as HickoryRecordType};
use hickory_proto::serialize::binary::{BinDecodable, BinEncodable, BinEncoder};
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;
use tracing::{debug, warn};
use trustwalk_domain::{RecordType, TrustWalkError};

use crate::record::{DnskeyRecord, DsRecord, Record, RrsigRecord};
use crate::resolver::Resolver;
use crate::rrset::RRSet;

const EDNS_MAX_PAYLOAD: u16 = 4096;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const DNS_PORT: u16 = 53;

pub struct DnsClient {
    timeout: Duration,
}

impl Default for DnsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsClient {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// `query(qname, rdtype, want_dnssec, resolver) → RRSet` (§4.6).
    pub async fn query(
        &self,
        qname: &str,
        rdtype: RecordType,
        want_dnssec: bool,
        resolver: &Resolver,
    ) -> Result<RRSet, TrustWalkError> {
        let request = self.build_query(qname, rdtype, want_dnssec)?;
        let response_bytes = self.send(&request, resolver.ip_addr, qname, rdtype).await?;
        let response = Message::from_vec(&response_bytes)
            .map_err(|e| TrustWalkError::WireDecode(e.to_string()))?;

        if response.response_code() != ResponseCode::NoError {
            return Err(TrustWalkError::QueryError {
                detail: format!("{:?}", response.response_code()),
            });
        }

        let section: Vec<&HickoryRecord> = if !response.answers().is_empty() {
            response.answers().iter().collect()
        } else if !response.name_servers().is_empty() {
            response.name_servers().iter().collect()
        } else {
            return Err(TrustWalkError::QueryError {
                detail: "no answer".into(),
            });
        };

        let mut typed = Vec::new();
        let mut sigs = Vec::new();
        for record in &section {
            if record.record_type() == HickoryRecordType::RRSIG {
                sigs.push(*record);
            } else {
                typed.push(*record);
            }
        }

        if want_dnssec && sigs.is_empty() {
            return Err(TrustWalkError::QueryNoResponse {
                detail: "DNSSEC not supported".into(),
            });
        }

        if typed.is_empty() {
            return Err(TrustWalkError::QueryError {
                detail: "unknown record type".into(),
            });
        }

        let owner = typed[0].name().to_utf8();
        let ttl = typed[0].ttl();
        let mut rrset = RRSet::new(owner, u16::from(typed[0].record_type()), 1, ttl);
        for record in &typed {
            rrset.records.push(to_record(record)?);
        }
        if want_dnssec {
            for sig in &sigs {
                rrset.rrsigs.push(to_rrsig(sig)?);
            }
        }
        Ok(rrset)
    }

    fn build_query(
        &self,
        qname: &str,
        rdtype: RecordType,
        want_dnssec: bool,
    ) -> Result<Vec<u8>, TrustWalkError> {
        let name = Name::from_str(qname)
            .map_err(|e| TrustWalkError::InvalidDomainName(format!("{qname}: {e}")))?;

        let mut query = Query::new();
        query.set_name(name);
        query.set_query_type(to_hickory_type(rdtype));
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.set_recursion_desired(true);
        message.add_query(query);

        let mut edns = Edns::new();
        edns.set_max_payload(EDNS_MAX_PAYLOAD);
        edns.set_dnssec_ok(want_dnssec);
        message.set_edns(edns);

        let mut buf = Vec::new();
        let mut encoder = BinEncoder::new(&mut buf);
        message
            .emit(&mut encoder)
            .map_err(|e| TrustWalkError::WireDecode(e.to_string()))?;
        Ok(buf)
    }

    async fn send(
        &self,
        request: &[u8],
        ip: IpAddr,
        qname: &str,
        rdtype: RecordType,
    ) -> Result<Vec<u8>, TrustWalkError> {
        let bind_addr: SocketAddr = match ip {
            IpAddr::V4(_) => (std::net::Ipv4Addr::UNSPECIFIED, 0).into(),
            IpAddr::V6(_) => (std::net::Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let dest = SocketAddr::new(ip, DNS_PORT);
        let request = request.to_vec();

        let exchange = async move {
            let socket = UdpSocket::bind(bind_addr).await?;
            let sent = socket.send_to(&request, dest).await?;
            debug!(server = %dest, bytes_sent = sent, "DNS query sent");
            let mut buf = vec![0u8; 65535];
            let (len, from) = socket.recv_from(&mut buf).await?;
            if from.ip() != dest.ip() {
                warn!(expected = %dest, received_from = %from, "DNS response from unexpected source");
            }
            buf.truncate(len);
            debug!(server = %dest, bytes_received = len, "DNS response received");
            Ok::<Vec<u8>, std::io::Error>(buf)
        };

        match timeout(self.timeout, exchange).await {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(e)) => Err(TrustWalkError::Io(e)),
            Err(_) => {
                warn!(server = %dest, %qname, rdtype = %rdtype, "DNS query timed out");
                Err(TrustWalkError::QueryTimeout {
                    origin: ip.to_string(),
                    qname: qname.to_string(),
                    rdtype: rdtype.to_string(),
                })
            }
        }
    }
}

fn to_hickory_type(rdtype: RecordType) -> HickoryRecordType {
    match rdtype {
        RecordType::A => HickoryRecordType::A,
        RecordType::AAAA => HickoryRecordType::AAAA,
        RecordType::NS => HickoryRecordType::NS,
        RecordType::SOA => HickoryRecordType::SOA,
        RecordType::MX => HickoryRecordType::MX,
        RecordType::TXT => HickoryRecordType::TXT,
        RecordType::PTR => HickoryRecordType::PTR,
        RecordType::DS => HickoryRecordType::DS,
        RecordType::DNSKEY => HickoryRecordType::DNSKEY,
        RecordType::RRSIG => HickoryRecordType::RRSIG,
    }
}

fn to_record(record: &HickoryRecord) -> Result<Record, TrustWalkError> {
    match record.data() {
        RData::A(a) => Ok(Record::A { address: a.0 }),
        RData::AAAA(aaaa) => Ok(Record::Aaaa { address: aaaa.0 }),
        RData::NS(ns) => Ok(Record::Ns {
            target: ns.0.to_utf8(),
        }),
        RData::PTR(ptr) => Ok(Record::Ptr {
            target: ptr.0.to_utf8(),
        }),
        RData::MX(mx) => Ok(Record::Mx {
            preference: mx.preference(),
            target: mx.exchange().to_utf8(),
        }),
        RData::TXT(txt) => {
            let joined: String = txt
                .txt_data()
                .iter()
                .map(|seg| String::from_utf8_lossy(seg).into_owned())
                .collect();
            Ok(Record::Txt { value: joined })
        }
        RData::SOA(soa) => Ok(Record::Soa {
            mname: soa.mname().to_utf8(),
            rname: soa.rname().to_utf8(),
            serial: soa.serial(),
            refresh: soa.refresh() as u32,
            retry: soa.retry() as u32,
            expire: soa.expire() as u32,
            minimum: soa.minimum(),
        }),
        RData::DNSSEC(DNSSECRData::DS(ds)) => Ok(Record::Ds(DsRecord {
            key_tag: ds.key_tag(),
            algorithm: u8::from(ds.algorithm()),
            digest_type: u8::from(ds.digest_type()),
            digest: ds.digest().to_vec(),
        })),
        RData::DNSSEC(DNSSECRData::DNSKEY(dnskey)) => {
            let pk = dnskey.public_key();
            Ok(Record::Dnskey(DnskeyRecord {
                flags: dnskey.flags(),
                protocol: 3,
                algorithm: u8::from(<dyn PublicKey>::algorithm(pk)),
                public_key: <dyn PublicKey>::public_bytes(pk).to_vec(),
            }))
        }
        _ => Err(TrustWalkError::QueryError {
            detail: "unknown record type".into(),
        }),
    }
}

fn to_rrsig(record: &HickoryRecord) -> Result<RrsigRecord, TrustWalkError> {
    match record.data() {
        RData::DNSSEC(DNSSECRData::RRSIG(rrsig)) => {
            let input = rrsig.input();
            Ok(RrsigRecord {
                type_covered: u16::from(input.type_covered),
                algorithm: u8::from(input.algorithm),
                labels: input.num_labels,
                original_ttl: input.original_ttl,
                signature_expiration: input.sig_expiration.get(),
                signature_inception: input.sig_inception.get(),
                key_tag: input.key_tag,
                signer_name: input.signer_name.to_string(),
                signature: rrsig.sig().to_vec(),
            })
        }
        _ => Err(TrustWalkError::QueryError {
            detail: "expected RRSIG record".into(),
        }),
    }
}
