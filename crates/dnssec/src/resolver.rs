//! Resolver selector (§3, §4.7): "which server to ask next."

use std::net::IpAddr;

use trustwalk_domain::{RecordType, TrustWalkError};

use crate::client::DnsClient;
use crate::record::Record;
use crate::rng::Rng;

/// `(ip_addr, display_name)`. Immutable after construction; both fields
/// are always populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolver {
    pub ip_addr: IpAddr,
    pub display_name: String,
}

const DEFAULT_RESOLVER_NAME: &str = "default.resolver";
/// Used only if `/etc/resolv.conf` cannot be read or contains no
/// `nameserver` line — a well-known public resolver, not a guess.
const FALLBACK_RESOLVER_IP: IpAddr = IpAddr::V4(std::net::Ipv4Addr::new(1, 1, 1, 1));

impl Resolver {
    /// Default mode: the host's system resolver, named `"default.resolver"`.
    pub fn default_resolver() -> Self {
        Self {
            ip_addr: system_resolver_ip(),
            display_name: DEFAULT_RESOLVER_NAME.to_string(),
        }
    }

    /// Constructs a resolver from a literal IP with an explicit display
    /// name, without performing any lookup (used for the fixed public
    /// resolvers in the simple-query battery, §4.9).
    pub fn from_both(ip_addr: IpAddr, display_name: impl Into<String>) -> Self {
        Self {
            ip_addr,
            display_name: display_name.into(),
        }
    }

    /// Name-only mode: resolves `name` to an A record via `via`, then
    /// picks one address uniformly at random (§4.7).
    pub async fn from_name(
        name: &str,
        via: &Resolver,
        client: &DnsClient,
        rng: &dyn Rng,
    ) -> Result<Self, TrustWalkError> {
        let rrset = client.query(name, RecordType::A, false, via).await?;
        let addresses: Vec<IpAddr> = rrset
            .records
            .iter()
            .filter_map(|r| match r {
                Record::A { address } => Some(IpAddr::V4(*address)),
                Record::Aaaa { address } => Some(IpAddr::V6(*address)),
                _ => None,
            })
            .collect();
        if addresses.is_empty() {
            return Err(TrustWalkError::QueryError {
                detail: format!("no A records for {name}"),
            });
        }
        let chosen = addresses[rng.pick(addresses.len())];
        Ok(Self {
            ip_addr: chosen,
            display_name: name.to_string(),
        })
    }

    /// IP-only mode: resolves `ip` to a display name via a PTR lookup
    /// through `via`.
    pub async fn from_ip(
        ip: IpAddr,
        via: &Resolver,
        client: &DnsClient,
    ) -> Result<Self, TrustWalkError> {
        let ptr_name = reverse_dns_name(ip);
        let rrset = client.query(&ptr_name, RecordType::PTR, false, via).await?;
        let display_name = rrset
            .records
            .iter()
            .find_map(|r| match r {
                Record::Ptr { target } => Some(target.clone()),
                _ => None,
            })
            .unwrap_or_else(|| ip.to_string());
        Ok(Self {
            ip_addr: ip,
            display_name,
        })
    }
}

fn reverse_dns_name(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            format!(
                "{}.{}.{}.{}.in-addr.arpa.",
                octets[3], octets[2], octets[1], octets[0]
            )
        }
        IpAddr::V6(v6) => {
            let mut nibbles = String::new();
            for segment in v6.segments().iter().rev() {
                for shift in [0, 4, 8, 12] {
                    nibbles.push_str(&format!("{:x}.", (segment >> shift) & 0xF));
                }
            }
            format!("{nibbles}ip6.arpa.")
        }
    }
}

fn system_resolver_ip() -> IpAddr {
    read_resolv_conf().unwrap_or(FALLBACK_RESOLVER_IP)
}

#[cfg(unix)]
fn read_resolv_conf() -> Option<IpAddr> {
    let contents = std::fs::read_to_string("/etc/resolv.conf").ok()?;
    contents.lines().find_map(|line| {
        let line = line.trim();
        let rest = line.strip_prefix("nameserver")?;
        rest.trim().parse().ok()
    })
}

#[cfg(not(unix))]
fn read_resolv_conf() -> Option<IpAddr> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ptr_name_for_ipv4() {
        let ip: IpAddr = "93.184.216.34".parse().unwrap();
        assert_eq!(reverse_dns_name(ip), "34.216.184.93.in-addr.arpa.");
    }
}
