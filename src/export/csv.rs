//! CSV serialization of scan results.
//!
//! One row per discovered subdomain, with multi-valued cells joined by
//! `", "`. The column order mirrors the record-type probe order.

use std::io::Write;

use anyhow::{Context, Result};
use csv::Writer;

use crate::scanner::{RecordKind, SubdomainResult, PROBE_ORDER};

/// Fixed column layout of the export.
pub const CSV_HEADER: [&str; 10] = [
    "Subdomain",
    "IP Addresses",
    "Creation Date",
    "A Records",
    "AAAA Records",
    "CNAME Records",
    "MX Records",
    "TXT Records",
    "NS Records",
    "SOA Records",
];

/// Writes `results` as CSV to `writer`, returning the number of data rows.
pub fn write_results_csv<W: Write>(results: &[SubdomainResult], writer: W) -> Result<usize> {
    let mut csv_writer = Writer::from_writer(writer);

    csv_writer
        .write_record(CSV_HEADER)
        .context("Failed to write CSV header")?;

    for result in results {
        let mut row = vec![
            result.subdomain.clone(),
            result.ip_addresses.join(", "),
            result.creation_date.clone(),
        ];
        for kind in PROBE_ORDER {
            row.push(record_cell(result, kind));
        }
        csv_writer
            .write_record(&row)
            .context("Failed to write CSV row")?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(results.len())
}

/// Renders `results` as an in-memory CSV document.
pub fn results_to_csv_string(results: &[SubdomainResult]) -> Result<String> {
    let mut buffer = Vec::new();
    write_results_csv(results, &mut buffer)?;
    String::from_utf8(buffer).context("CSV output was not valid UTF-8")
}

fn record_cell(result: &SubdomainResult, kind: RecordKind) -> String {
    result
        .dns_records
        .get(kind.as_str())
        .map(|values| values.join(", "))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::RecordSet;

    fn sample_result() -> SubdomainResult {
        let mut records = RecordSet::new();
        records.insert("A".into(), vec!["1.2.3.4".into(), "5.6.7.8".into()]);
        records.insert("MX".into(), vec!["10 mail.example.com.".into()]);
        SubdomainResult {
            subdomain: "api.example.com".into(),
            ip_addresses: vec!["1.2.3.4".into(), "5.6.7.8".into()],
            dns_records: records,
            creation_date: "1997-09-15".into(),
        }
    }

    #[test]
    fn test_header_row() {
        let csv = results_to_csv_string(&[]).expect("csv");
        assert_eq!(
            csv.trim_end(),
            "Subdomain,IP Addresses,Creation Date,A Records,AAAA Records,CNAME Records,MX Records,TXT Records,NS Records,SOA Records"
        );
    }

    #[test]
    fn test_multi_valued_cells_join_with_comma_space() {
        let csv = results_to_csv_string(&[sample_result()]).expect("csv");
        assert!(csv.contains("\"1.2.3.4, 5.6.7.8\""));
        assert!(csv.contains("10 mail.example.com."));
    }

    #[test]
    fn test_absent_record_types_are_empty_cells() {
        let csv = results_to_csv_string(&[sample_result()]).expect("csv");
        let data_row = csv.lines().nth(1).expect("data row");
        // AAAA, CNAME, TXT, NS, SOA were never answered
        assert!(data_row.ends_with(",,,"));
    }

    #[test]
    fn test_round_trip_preserves_values() {
        let original = sample_result();
        let csv = results_to_csv_string(std::slice::from_ref(&original)).expect("csv");

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let record = reader
            .records()
            .next()
            .expect("one data row")
            .expect("valid row");

        assert_eq!(&record[0], "api.example.com");
        assert_eq!(&record[2], "1997-09-15");
        let ips: Vec<&str> = record[1].split(", ").collect();
        assert_eq!(ips, vec!["1.2.3.4", "5.6.7.8"]);
    }
}
