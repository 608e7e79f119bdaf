pub mod chain;
pub mod client;
pub mod crypto;
pub mod record;
pub mod recursive;
pub mod report;
pub mod resolver;
pub mod rng;
pub mod rrset;
pub mod simple_query;
pub mod walker;
pub mod wire;

pub use chain::ChainOfTrust;
pub use client::DnsClient;
pub use record::{DnskeyRecord, DsRecord, Record, RrsigRecord};
pub use report::{Status, TestCase, TestStep, TestSuite};
pub use resolver::Resolver;
pub use rng::{FastrandRng, FixedRng, Rng};
pub use rrset::RRSet;
