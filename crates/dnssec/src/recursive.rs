//! Recursive-NS-walk executor (§4.10): follows `split_qname`
//! label-by-label, querying `NS` at each label and hopping to a
//! uniformly-chosen target for the next.

use trustwalk_domain::RecordType;

use crate::client::DnsClient;
use crate::record::Record;
use crate::report::{TestCase, TestStep};
use crate::resolver::Resolver;
use crate::rng::Rng;
use crate::wire::split_qname;

pub async fn run(qname: &str, client: &DnsClient, rng: &dyn Rng) -> TestCase {
    let mut case = TestCase::new(format!("recursive NS walk for {qname}"));
    let mut resolver = Resolver::default_resolver();

    for label in split_qname(qname) {
        match client.query(&label, RecordType::NS, false, &resolver).await {
            Ok(rrset) => {
                let targets: Vec<&str> = rrset
                    .records
                    .iter()
                    .filter_map(|r| match r {
                        Record::Ns { target } => Some(target.as_str()),
                        _ => None,
                    })
                    .collect();
                if targets.is_empty() {
                    case.push(TestStep::error(
                        format!("NS for {label}"),
                        "no NS entry in response".to_string(),
                    ));
                    continue;
                }
                case.push(TestStep::success(
                    format!("NS for {label}"),
                    targets.join(", "),
                ));
                let chosen = targets[rng.pick(targets.len())].to_string();
                match Resolver::from_name(&chosen, &resolver, client, rng).await {
                    Ok(next) => resolver = next,
                    Err(e) => {
                        case.push(TestStep::error(
                            format!("resolve NS target for {label}"),
                            format!("{chosen}: {e}"),
                        ));
                    }
                }
            }
            Err(e) => {
                case.push(TestStep::error(format!("NS for {label}"), format!("{e}")));
            }
        }
    }

    case
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_one_step_candidate_per_label() {
        let labels = split_qname("www.example.com.");
        assert_eq!(labels.len(), 4);
    }
}
