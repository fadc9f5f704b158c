//! # Port List Resolver
//!
//! Expands what the operator asked for into the concrete [`PortSpec`] the
//! worker pool iterates over. Resolution never fails: input that yields no
//! valid port simply yields an empty spec.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::str::FromStr;

pub const MIN_PORT: u16 = 1;
pub const MAX_PORT: u16 = u16::MAX;

/// The 100 most frequently open TCP ports, ascending.
pub const TOP_100_TCP: [u16; 100] = [
    7, 9, 13, 21, 22, 23, 25, 26, 37, 53, 79, 80, 81, 88, 106, 110, 111, 113, 119, 135, 139, 143,
    144, 179, 199, 389, 427, 443, 444, 445, 465, 513, 514, 515, 543, 544, 548, 554, 587, 631, 646,
    873, 990, 993, 995, 1025, 1026, 1027, 1028, 1029, 1110, 1433, 1720, 1723, 1755, 1900, 2000,
    2001, 2049, 2121, 2717, 3000, 3128, 3306, 3389, 3986, 4899, 5000, 5009, 5051, 5060, 5101, 5190,
    5357, 5432, 5631, 5666, 5800, 5900, 6000, 6001, 6646, 7070, 8000, 8008, 8009, 8080, 8081, 8443,
    8888, 9100, 9999, 10000, 32768, 49152, 49153, 49154, 49155, 49156, 49157,
];

/// The 100 most frequently open UDP ports, ascending.
pub const TOP_100_UDP: [u16; 100] = [
    7, 9, 17, 19, 49, 53, 67, 68, 69, 80, 88, 111, 120, 123, 135, 136, 137, 138, 139, 158, 161, 162,
    177, 427, 443, 445, 497, 500, 514, 515, 518, 520, 593, 623, 626, 631, 996, 997, 998, 999, 1022,
    1023, 1025, 1026, 1027, 1028, 1029, 1030, 1433, 1434, 1645, 1646, 1701, 1718, 1719, 1812, 1813,
    1900, 2000, 2048, 2049, 2222, 2223, 3283, 3456, 3703, 4444, 4500, 5000, 5060, 5353, 5632, 9200,
    10000, 17185, 20031, 30718, 31337, 32768, 32769, 32771, 32815, 33281, 49152, 49153, 49154,
    49156, 49181, 49182, 49185, 49186, 49188, 49190, 49191, 49192, 49193, 49194, 49200, 49201,
    65024,
];

/// What the operator asked to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Comma separated ports and `a-b` ranges, exactly as typed.
    Explicit(String),
    /// Union of [`TOP_100_TCP`] and [`TOP_100_UDP`].
    Top100,
    /// Every port from 1 to 65535.
    All,
}

impl FromStr for Selection {
    type Err = Infallible;

    /// Keywords are matched case-insensitively: `all`, `top100`, `top 100`
    /// and `top-100`. Anything else is treated as an explicit list.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keyword: String = s.trim().to_ascii_lowercase();
        let selection = match keyword.as_str() {
            "all" => Selection::All,
            "top100" | "top 100" | "top-100" => Selection::Top100,
            _ => Selection::Explicit(s.to_string()),
        };
        Ok(selection)
    }
}

/// Ascending, duplicate-free set of ports in `1..=65535`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSpec {
    ports: Vec<u16>,
}

impl PortSpec {
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.ports
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.ports.iter().copied()
    }
}

impl FromIterator<u16> for PortSpec {
    /// Port 0 is dropped; duplicates collapse; the result is sorted.
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let unique: BTreeSet<u16> = iter.into_iter().filter(|p| *p >= MIN_PORT).collect();
        Self {
            ports: unique.into_iter().collect(),
        }
    }
}

pub fn resolve(selection: &Selection) -> PortSpec {
    match selection {
        Selection::Explicit(list) => parse_explicit(list),
        Selection::Top100 => TOP_100_TCP.iter().chain(TOP_100_UDP.iter()).copied().collect(),
        Selection::All => (MIN_PORT..=MAX_PORT).collect(),
    }
}

/// Invalid tokens are dropped silently.
fn parse_explicit(list: &str) -> PortSpec {
    list.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .flat_map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> Vec<u16> {
    if let Some((start, end)) = token.split_once('-') {
        return match (parse_port(start.trim()), parse_port(end.trim())) {
            (Some(start), Some(end)) if start <= end => (start..=end).collect(),
            _ => Vec::new(),
        };
    }

    parse_port(token).into_iter().collect()
}

fn parse_port(token: &str) -> Option<u16> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    token.parse::<u16>().ok().filter(|port| *port >= MIN_PORT)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
