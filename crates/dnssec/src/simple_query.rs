//! Simple-query executor (§4.9): a fixed battery of (resolver,
//! record-type) pairs, run independently of the DNSSEC walker.

use std::net::IpAddr;

use trustwalk_domain::RecordType;

use crate::client::DnsClient;
use crate::report::{TestCase, TestStep};
use crate::resolver::Resolver;

const RECORD_TYPES: [RecordType; 6] = [
    RecordType::SOA,
    RecordType::NS,
    RecordType::A,
    RecordType::AAAA,
    RecordType::MX,
    RecordType::TXT,
];

/// Record types that are legitimately absent on many zones: a
/// `QueryNoResponse`/empty answer for these is a WARNING, not an ERROR.
fn absence_is_benign(rdtype: RecordType) -> bool {
    matches!(rdtype, RecordType::MX | RecordType::TXT)
}

/// The default fixed battery, used when no config overrides it.
pub fn default_resolvers() -> Vec<Resolver> {
    vec![
        Resolver::default_resolver(),
        Resolver::from_both(IpAddr::V4([8, 8, 8, 8].into()), "8.8.8.8"),
        Resolver::from_both(IpAddr::V4([9, 9, 9, 9].into()), "9.9.9.9"),
        Resolver::from_both(IpAddr::V4([1, 1, 1, 1].into()), "1.1.1.1"),
    ]
}

/// Builds the probe battery from config's extra resolver list (§4.9's
/// ambient "resolvers list" config, SPEC_FULL), always probing the
/// host's own default resolver first regardless of what's configured.
/// Entries that don't parse as an IP address are skipped with a
/// warning rather than failing the whole run.
pub fn resolvers_from_config(extra: &[String]) -> Vec<Resolver> {
    let mut resolvers = vec![Resolver::default_resolver()];
    for entry in extra {
        match entry.parse::<IpAddr>() {
            Ok(ip) => resolvers.push(Resolver::from_both(ip, entry.clone())),
            Err(_) => tracing::warn!(entry = %entry, "skipping unparsable resolver in config"),
        }
    }
    resolvers
}

pub async fn run(qname: &str, client: &DnsClient, resolvers: &[Resolver]) -> TestCase {
    let mut case = TestCase::new(format!("simple query battery for {qname}"));
    for resolver in resolvers {
        for rdtype in RECORD_TYPES {
            let description = format!("{rdtype} via {}", resolver.display_name);
            match client.query(qname, rdtype, false, resolver).await {
                Ok(rrset) if !rrset.records.is_empty() => {
                    case.push(TestStep::success(
                        description,
                        format!("{} record(s) returned", rrset.records.len()),
                    ));
                }
                Ok(_) => {
                    case.push(step_for_empty_answer(description, rdtype));
                }
                Err(e) if e.is_unsigned_zone() => {
                    case.push(step_for_empty_answer(description, rdtype));
                }
                Err(e) => {
                    case.push(TestStep::error(description, format!("{e}")));
                }
            }
        }
    }
    case
}

fn step_for_empty_answer(description: String, rdtype: RecordType) -> TestStep {
    if absence_is_benign(rdtype) {
        TestStep::warning(description, "no answer (absence is not inherently an error)")
    } else {
        TestStep::error(description, "no answer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mx_and_txt_absence_is_benign() {
        assert!(absence_is_benign(RecordType::MX));
        assert!(absence_is_benign(RecordType::TXT));
        assert!(!absence_is_benign(RecordType::A));
    }

    #[test]
    fn four_resolvers_are_fixed_by_default() {
        let resolvers = default_resolvers();
        assert_eq!(resolvers.len(), 4);
        assert_eq!(resolvers[1].display_name, "8.8.8.8");
    }

    #[test]
    fn config_resolvers_always_include_system_default_first() {
        let resolvers = resolvers_from_config(&["1.1.1.1".to_string()]);
        assert_eq!(resolvers.len(), 2);
        assert_eq!(resolvers[0].display_name, "default.resolver");
        assert_eq!(resolvers[1].display_name, "1.1.1.1");
    }

    #[test]
    fn unparsable_config_resolver_is_skipped() {
        let resolvers = resolvers_from_config(&["not-an-ip".to_string()]);
        assert_eq!(resolvers.len(), 1);
    }
}
