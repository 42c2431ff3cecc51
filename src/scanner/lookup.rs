//! DNS and WHOIS lookup seams for the resolver pool.
//!
//! The pool itself only deals in two narrow traits:
//! - [`RecordLookup`] - one upstream resolver answering one record type
//! - [`CreationDateLookup`] - best-effort registration date for a name
//!
//! Production implementations ([`HickoryLookup`], [`WhoisCreationDate`]) live
//! here too. Tests drive the pool with scripted implementations instead,
//! which is what makes the fallback-order and depth-cutoff properties
//! observable.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use hickory_resolver::config::{NameServerConfig, Protocol, ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType};
use hickory_resolver::TokioAsyncResolver;
use strum_macros::{Display, EnumIter};
use thiserror::Error;
use whois_service::WhoisClient;

/// DNS record types probed for every candidate, in this exact order.
pub const PROBE_ORDER: [RecordKind; 7] = [
    RecordKind::A,
    RecordKind::Aaaa,
    RecordKind::Cname,
    RecordKind::Mx,
    RecordKind::Txt,
    RecordKind::Ns,
    RecordKind::Soa,
];

/// Tag for a DNS record type in a result's record map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum RecordKind {
    /// IPv4 address record
    #[strum(serialize = "A")]
    A,
    /// IPv6 address record
    #[strum(serialize = "AAAA")]
    Aaaa,
    /// Canonical name record
    #[strum(serialize = "CNAME")]
    Cname,
    /// Mail exchanger record
    #[strum(serialize = "MX")]
    Mx,
    /// Text record
    #[strum(serialize = "TXT")]
    Txt,
    /// Nameserver record
    #[strum(serialize = "NS")]
    Ns,
    /// Start-of-authority record
    #[strum(serialize = "SOA")]
    Soa,
}

impl RecordKind {
    /// The record-type tag used as a key in record maps and CSV columns.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::A => "A",
            RecordKind::Aaaa => "AAAA",
            RecordKind::Cname => "CNAME",
            RecordKind::Mx => "MX",
            RecordKind::Txt => "TXT",
            RecordKind::Ns => "NS",
            RecordKind::Soa => "SOA",
        }
    }

    fn record_type(&self) -> RecordType {
        match self {
            RecordKind::A => RecordType::A,
            RecordKind::Aaaa => RecordType::AAAA,
            RecordKind::Cname => RecordType::CNAME,
            RecordKind::Mx => RecordType::MX,
            RecordKind::Txt => RecordType::TXT,
            RecordKind::Ns => RecordType::NS,
            RecordKind::Soa => RecordType::SOA,
        }
    }
}

/// Failure of a single upstream exchange.
///
/// Either way the pool reacts identically: try the next resolver in the
/// fallback table. The distinction exists for logging.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The exchange failed at the transport level (socket error, timeout).
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream answered with a response code other than `NOERROR`.
    #[error("response code {0}")]
    Rcode(String),
}

/// One upstream recursive resolver answering one record type at a time.
#[async_trait]
pub trait RecordLookup: Send + Sync {
    /// Upstream identifier used in log lines (e.g. `8.8.8.8:53`).
    fn name(&self) -> &str;

    /// Queries `fqdn` for `kind`, returning formatted answer values.
    ///
    /// `Ok(vec![])` means the upstream authoritatively answered `NOERROR`
    /// with an empty answer section; the pool stops falling back in that
    /// case. Any `Err` sends the pool on to the next upstream.
    async fn lookup(&self, fqdn: &str, kind: RecordKind) -> Result<Vec<String>, LookupError>;
}

/// Best-effort registration date source for a name.
#[async_trait]
pub trait CreationDateLookup: Send + Sync {
    /// Returns the provider's creation-date string for `domain`, if any.
    ///
    /// `Ok(None)` means the lookup succeeded but the record carries no
    /// creation date; the pool does not retry that case.
    async fn creation_date(&self, domain: &str) -> Result<Option<String>, WhoisError>;
}

/// Failure of a single WHOIS attempt. Both variants are retried.
#[derive(Debug, Error)]
pub enum WhoisError {
    /// The lookup failed before a response was obtained.
    #[error("whois transport failure: {0}")]
    Transport(String),

    /// A response was obtained but could not be parsed.
    #[error("whois parse failure: {0}")]
    Parse(String),
}

/// [`RecordLookup`] backed by a single upstream via `hickory-resolver`.
pub struct HickoryLookup {
    name: String,
    resolver: TokioAsyncResolver,
}

impl HickoryLookup {
    /// Builds a resolver pinned to one upstream address.
    ///
    /// Fallback across upstreams belongs to the pool, so each instance gets
    /// exactly one nameserver and a single attempt. `ndots` is zeroed to
    /// prevent search-domain appending on already-qualified names.
    pub fn new(upstream: SocketAddr, timeout: Duration) -> Self {
        let mut config = ResolverConfig::new();
        config.add_name_server(NameServerConfig {
            socket_addr: upstream,
            protocol: Protocol::Udp,
            tls_dns_name: None,
            trust_negative_responses: false,
            bind_addr: None,
        });

        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        opts.ndots = 0;
        opts.recursion_desired = true;

        Self {
            name: upstream.to_string(),
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl RecordLookup for HickoryLookup {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, fqdn: &str, kind: RecordKind) -> Result<Vec<String>, LookupError> {
        match self.resolver.lookup(fqdn, kind.record_type()).await {
            Ok(lookup) => Ok(lookup
                .iter()
                .filter_map(|rdata| format_rdata(kind, rdata))
                .collect()),
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { response_code, .. } => {
                    // An empty NOERROR answer is a real answer; anything else
                    // (NXDOMAIN, SERVFAIL, REFUSED) sends us to the next
                    // upstream in the chain.
                    if *response_code == ResponseCode::NoError {
                        Ok(Vec::new())
                    } else {
                        Err(LookupError::Rcode(response_code.to_string()))
                    }
                }
                _ => Err(LookupError::Transport(e.to_string())),
            },
        }
    }
}

/// Formats one resource record into its display string for `kind`.
///
/// Records of a different type than asked for (e.g. the CNAME accompanying
/// an A answer) are dropped so each map entry holds only its own type.
fn format_rdata(kind: RecordKind, rdata: &RData) -> Option<String> {
    match (kind, rdata) {
        (RecordKind::A, RData::A(a)) => Some(a.0.to_string()),
        (RecordKind::Aaaa, RData::AAAA(aaaa)) => Some(aaaa.0.to_string()),
        (RecordKind::Cname, RData::CNAME(cname)) => Some(cname.to_utf8()),
        (RecordKind::Mx, RData::MX(mx)) => {
            Some(format!("{} {}", mx.preference(), mx.exchange().to_utf8()))
        }
        (RecordKind::Txt, RData::TXT(txt)) => Some(
            txt.iter()
                .map(|fragment| String::from_utf8_lossy(fragment).to_string())
                .collect::<Vec<String>>()
                .join(" "),
        ),
        (RecordKind::Ns, RData::NS(ns)) => Some(ns.to_utf8()),
        (RecordKind::Soa, RData::SOA(soa)) => Some(format!(
            "{} {} {} {} {} {} {}",
            soa.mname().to_utf8(),
            soa.rname().to_utf8(),
            soa.serial(),
            soa.refresh(),
            soa.retry(),
            soa.expire(),
            soa.minimum()
        )),
        _ => None,
    }
}

/// [`CreationDateLookup`] backed by the `whois-service` client.
///
/// The client is cheap to construct, so a fresh instance is created per
/// lookup rather than held for the life of the job.
#[derive(Debug, Default)]
pub struct WhoisCreationDate;

#[async_trait]
impl CreationDateLookup for WhoisCreationDate {
    async fn creation_date(&self, domain: &str) -> Result<Option<String>, WhoisError> {
        let client = WhoisClient::new()
            .await
            .map_err(|e| WhoisError::Transport(e.to_string()))?;
        let response = client
            .lookup(domain)
            .await
            .map_err(|e| WhoisError::Transport(e.to_string()))?;
        match response.parsed_data {
            Some(parsed) => Ok(parsed.creation_date),
            None => Err(WhoisError::Parse(format!(
                "no structured data for {domain}"
            ))),
        }
    }
}

/// Formats a provider creation-date string for display.
///
/// RFC3339-parseable dates become `YYYY-MM-DD`; anything else passes
/// through untouched, since WHOIS providers disagree wildly on formats.
pub fn format_creation_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_probe_order_is_fixed() {
        let tags: Vec<&str> = PROBE_ORDER.iter().map(|k| k.as_str()).collect();
        assert_eq!(tags, vec!["A", "AAAA", "CNAME", "MX", "TXT", "NS", "SOA"]);
    }

    #[test]
    fn test_probe_order_covers_every_kind() {
        for kind in RecordKind::iter() {
            assert!(PROBE_ORDER.contains(&kind), "{kind} missing from probe order");
        }
    }

    #[test]
    fn test_record_kind_display_matches_as_str() {
        for kind in RecordKind::iter() {
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_format_creation_date_rfc3339() {
        assert_eq!(
            format_creation_date("1997-09-15T04:00:00Z"),
            "1997-09-15"
        );
        assert_eq!(
            format_creation_date("2010-03-01T12:30:45+02:00"),
            "2010-03-01"
        );
    }

    #[test]
    fn test_format_creation_date_passthrough() {
        assert_eq!(
            format_creation_date("15-Sep-1997"),
            "15-Sep-1997"
        );
        assert_eq!(format_creation_date("before Aug-1996"), "before Aug-1996");
    }
}
