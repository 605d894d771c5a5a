//! Report rendering.
//!
//! Turns probe results into tables (plain, CSV, TSV) or JSON. Failed probes
//! show up as status cells ("Timeout", "NXDOMAIN", ...) rather than being
//! dropped.

use crate::cli::OutputFormat;
use crate::dns::types::{AddressReachability, NameserverProbe, ProbeRow};
use crate::error::Result;
use crate::public_ip::PublicIpReport;
use crate::system::AdapterNameservers;
use serde::Serialize;
use std::net::IpAddr;

/// A titled table whose cells may span several lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: impl Into<String>, headers: &[&str]) -> Self {
        Self {
            title: title.into(),
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                let longest = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                if let Some(w) = widths.get_mut(idx) {
                    *w = (*w).max(longest);
                }
            }
        }
        widths
    }

    /// Aligned columns; multi-line cells continue on the following lines.
    #[must_use]
    pub fn render_text(&self) -> String {
        let widths = self.widths();
        let line = |cells: &[&str]| -> String {
            let padded: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(idx, w)| format!("{:<w$}", cells.get(idx).copied().unwrap_or(""), w = *w))
                .collect();
            padded.join("  ").trim_end().to_string()
        };

        let mut out = String::new();
        if !self.title.is_empty() {
            out.push_str(&self.title);
            out.push('\n');
        }
        let headers: Vec<&str> = self.headers.iter().map(String::as_str).collect();
        out.push_str(&line(&headers));
        out.push('\n');
        let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(total));
        out.push('\n');

        for row in &self.rows {
            let split: Vec<Vec<&str>> = row.iter().map(|c| c.lines().collect()).collect();
            let height = split.iter().map(Vec::len).max().unwrap_or(0).max(1);
            for i in 0..height {
                let cells: Vec<&str> = split
                    .iter()
                    .map(|lines| lines.get(i).copied().unwrap_or(""))
                    .collect();
                out.push_str(&line(&cells));
                out.push('\n');
            }
        }
        out
    }

    /// Delimited rows with a `#`-prefixed header; line breaks in cells become
    /// spaces.
    #[must_use]
    pub fn render_delimited(&self, sep: char) -> String {
        let flatten = |cell: &str| cell.lines().collect::<Vec<_>>().join(" ");
        let mut out = format!("#{}\n", self.headers.join(&sep.to_string()));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(|c| flatten(c)).collect();
            out.push_str(&cells.join(&sep.to_string()));
            out.push('\n');
        }
        out
    }

    /// Render for a non-JSON format.
    #[must_use]
    pub fn render(&self, format: OutputFormat) -> String {
        match format {
            OutputFormat::Csv => self.render_delimited(','),
            OutputFormat::Tsv => self.render_delimited('\t'),
            OutputFormat::Table | OutputFormat::Json => self.render_text(),
        }
    }
}

fn join_lines<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolution table: one row per query, answers or status.
#[must_use]
pub fn query_table(domain: &str, rows: &[ProbeRow]) -> Table {
    let mut table = Table::new(format!("query {domain}"), &["nameserver", "type", "ip_address"]);
    for row in rows {
        table.push(vec![
            row.nameserver.to_string(),
            row.record_type.to_string(),
            row.outcome.to_string(),
        ]);
    }
    table
}

/// Reachability table: one row per resolved address.
#[must_use]
pub fn ping_table(domain: &str, results: &[AddressReachability]) -> Table {
    let mut table = Table::new(format!("ping {domain}"), &["ip_address", "ping", "nameservers"]);
    for r in results {
        table.push(vec![
            r.address.to_string(),
            r.latency.to_string(),
            join_lines(&r.nameservers),
        ]);
    }
    table
}

/// Nameserver probe table.
#[must_use]
pub fn probe_table(domain: &str, results: &[NameserverProbe]) -> Table {
    let mut table = Table::new(format!("probe {domain}"), &["nameserver", "ping", "resolve"]);
    for r in results {
        table.push(vec![
            r.nameserver.to_string(),
            r.ping.to_string(),
            r.resolve.to_string(),
        ]);
    }
    table
}

/// Local nameservers, one per line.
#[must_use]
pub fn nameserver_list(nameservers: &[IpAddr]) -> String {
    nameservers.iter().map(|ns| format!("{ns}\n")).collect()
}

/// One `<adapter>(<description>): <servers>` line per adapter.
#[must_use]
pub fn adapter_list(adapters: &[AdapterNameservers]) -> String {
    adapters.iter().map(|a| format!("{a}\n")).collect()
}

/// Public IP report as plain text.
#[must_use]
pub fn public_ip_text(report: &PublicIpReport, show_sites: bool) -> String {
    if show_sites {
        report.verbose_lines().join("\n")
    } else {
        report.to_string()
    }
}

/// Pretty JSON for any result.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::types::{LatencyResult, QueryOutcome};
    use std::collections::BTreeSet;
    use std::time::Duration;
    use trust_dns_resolver::proto::rr::RecordType;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_query_table_cells() {
        let rows = vec![
            ProbeRow::new(
                ip("8.8.8.8"),
                RecordType::A,
                QueryOutcome::Answer(vec![ip("10.0.0.1"), ip("10.0.0.2")]),
            ),
            ProbeRow::new(ip("1.1.1.1"), RecordType::A, QueryOutcome::NxDomain),
        ];
        let table = query_table("example.com", &rows);
        assert_eq!(table.title, "query example.com");
        assert_eq!(table.rows[0][2], "10.0.0.1\n10.0.0.2");
        assert_eq!(table.rows[1][2], "NXDOMAIN");
    }

    #[test]
    fn test_render_text_multiline() {
        let mut table = Table::new("t", &["a", "bb"]);
        table.push(vec!["x".into(), "1\n2".into()]);
        let text = table.render_text();
        assert_eq!(text, "t\na  bb\n-----\nx  1\n   2\n");
    }

    #[test]
    fn test_render_delimited() {
        let mut table = Table::new("t", &["a", "b"]);
        table.push(vec!["x".into(), "1\n2".into()]);
        assert_eq!(table.render(OutputFormat::Csv), "#a,b\nx,1 2\n");
        assert_eq!(table.render(OutputFormat::Tsv), "#a\tb\nx\t1 2\n");
    }

    #[test]
    fn test_status_cells() {
        let results = vec![
            NameserverProbe {
                nameserver: ip("8.8.8.8"),
                ping: LatencyResult::measured(Duration::from_millis(3)),
                resolve: LatencyResult::Timeout,
            },
        ];
        let table = probe_table("example.com", &results);
        assert_eq!(table.rows[0], vec!["8.8.8.8", "3.00ms", "Timeout"]);

        let reach = vec![AddressReachability {
            address: ip("10.0.0.1"),
            latency: LatencyResult::Unreachable,
            nameservers: BTreeSet::from([ip("8.8.8.8"), ip("1.1.1.1")]),
        }];
        let table = ping_table("example.com", &reach);
        assert_eq!(table.rows[0], vec!["10.0.0.1", "Unreachable", "1.1.1.1\n8.8.8.8"]);
    }

    #[test]
    fn test_adapter_list() {
        let adapters = vec![AdapterNameservers {
            name: "Wi-Fi".into(),
            description: "Wireless LAN adapter".into(),
            nameservers: vec![ip("192.168.0.1")],
        }];
        assert_eq!(adapter_list(&adapters), "Wi-Fi(Wireless LAN adapter): 192.168.0.1\n");
    }

    #[test]
    fn test_nameserver_list() {
        assert_eq!(nameserver_list(&[ip("1.1.1.1"), ip("::1")]), "1.1.1.1\n::1\n");
        assert_eq!(nameserver_list(&[]), "");
    }
}
