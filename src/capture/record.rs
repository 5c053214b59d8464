use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::parse::hop_address;

pub const SOURCE_COLUMN: usize = 0;
pub const TTL_COLUMN: usize = 3;
pub const STATUS_COLUMN: usize = 5;
pub const ADDR_COLUMN: usize = 6;
pub const CITY_COLUMN: usize = 10;
pub const COUNTRY_CODE_COLUMN: usize = 12;
pub const LATITUDE_COLUMN: usize = 17;
pub const LONGITUDE_COLUMN: usize = 18;
pub const ASN_COLUMN: usize = 21;
pub const ORG_COLUMN: usize = 22;

/// Status token of a query that got an answer.
pub const SUCCESS_STATUS: &str = "success";

/// One row of a capture's hop table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HopRecord {
    pub index: usize,
    columns: Vec<String>,
}

impl HopRecord {
    pub fn new(index: usize, columns: Vec<String>) -> Self {
        Self { index, columns }
    }

    /// Positional column, `None` when the row is too short or the cell is empty.
    pub fn column(&self, position: usize) -> Option<&str> {
        self.columns
            .get(position)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Every non-empty cell of the row in column order.
    pub fn fields(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .collect()
    }

    pub fn status(&self) -> &str {
        self.column(STATUS_COLUMN).unwrap_or_default()
    }

    pub fn is_success(&self) -> bool {
        self.status() == SUCCESS_STATUS
    }

    pub fn address(&self) -> Option<&str> {
        self.column(ADDR_COLUMN)
    }

    /// Text handed to the geocoder: `"<city>, <country_code>,"`.
    pub fn location_text(&self) -> String {
        format!(
            "{}, {},",
            self.column(CITY_COLUMN).unwrap_or_default(),
            self.column(COUNTRY_CODE_COLUMN).unwrap_or_default()
        )
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.column(LATITUDE_COLUMN)?.parse::<f64>().ok()?;
        let lng = self.column(LONGITUDE_COLUMN)?.parse::<f64>().ok()?;
        (lat.is_finite() && lng.is_finite()).then_some((lat, lng))
    }

    pub fn hop_label(&self) -> String {
        format!(
            "{} ({}, {}, {}, {})",
            self.address().unwrap_or_default(),
            self.column(CITY_COLUMN).unwrap_or_default(),
            self.column(COUNTRY_CODE_COLUMN).unwrap_or_default(),
            self.column(ASN_COLUMN).unwrap_or_default(),
            self.column(ORG_COLUMN).unwrap_or_default(),
        )
    }

    pub fn root_label(&self) -> String {
        format!("{} (root)", self.column(SOURCE_COLUMN).unwrap_or_default())
    }
}

/// One recorded traceroute run: the structured hop table plus the raw trace text.
#[derive(Debug)]
pub struct Capture {
    pub id: String,
    pub raw_lines: Vec<String>,
    pub table: Vec<HopRecord>,
    filtered: OnceLock<Vec<HopRecord>>,
}

impl Capture {
    pub fn new(id: impl Into<String>, raw_lines: Vec<String>, table: Vec<HopRecord>) -> Self {
        Self {
            id: id.into(),
            raw_lines,
            table,
            filtered: OnceLock::new(),
        }
    }

    /// First row per TTL, successful answers only, original order kept.
    pub fn filtered_hops(&self) -> &[HopRecord] {
        self.filtered.get_or_init(|| filter_hops(&self.table))
    }

    /// Addresses of the raw trace lines with wildcard and failed hops skipped.
    pub fn hop_chain(&self) -> Vec<&str> {
        self.raw_lines
            .iter()
            .filter_map(|line| hop_address(line))
            .collect()
    }

    pub fn recorded_at(&self) -> Option<SystemTime> {
        let seconds = self.id.parse::<u64>().ok()?;
        UNIX_EPOCH.checked_add(Duration::from_secs(seconds))
    }

    /// Whether the capture was recorded less than `window` before `now`.
    pub fn is_live(&self, now: SystemTime, window: Duration) -> bool {
        self.recorded_at()
            .and_then(|recorded| now.duration_since(recorded).ok())
            .is_some_and(|age| age < window)
    }
}

impl Clone for Capture {
    fn clone(&self) -> Self {
        Self::new(self.id.clone(), self.raw_lines.clone(), self.table.clone())
    }
}

impl PartialEq for Capture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.raw_lines == other.raw_lines && self.table == other.table
    }
}

fn filter_hops(table: &[HopRecord]) -> Vec<HopRecord> {
    let mut seen = HashSet::new();
    table
        .iter()
        .filter(|row| seen.insert(row.column(TTL_COLUMN).unwrap_or_default()))
        .filter(|row| row.is_success() && row.address().is_some())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(index: usize, ttl: &str, status: &str, addr: &str) -> HopRecord {
        let mut columns = vec![String::new(); 23];
        columns[SOURCE_COLUMN] = "10.1.10.20".to_owned();
        columns[TTL_COLUMN] = ttl.to_owned();
        columns[STATUS_COLUMN] = status.to_owned();
        columns[ADDR_COLUMN] = addr.to_owned();
        HopRecord::new(index, columns)
    }

    #[test]
    fn fields_drop_empty_cells() {
        let record = row(0, "1", "success", "10.1.10.1");
        let fields = record.fields();
        assert_eq!(fields, vec!["10.1.10.20", "1", "success", "10.1.10.1"]);
        assert!(fields.iter().all(|field| !field.is_empty()));
    }

    #[test]
    fn filtered_hops_keep_first_row_per_ttl_and_success_only() {
        let capture = Capture::new(
            "1650000000",
            Vec::new(),
            vec![
                row(0, "ttl", "query_result", "addr"),
                row(1, "1", "success", "10.1.10.1"),
                row(2, "1", "success", "10.1.10.1"),
                row(3, "2", "timeout", ""),
                row(4, "2", "success", "72.14.1.1"),
                row(5, "3", "success", "8.8.8.8"),
            ],
        );

        let indices = capture
            .filtered_hops()
            .iter()
            .map(|hop| hop.index)
            .collect::<Vec<_>>();
        assert_eq!(indices, vec![1, 5]);
    }

    #[test]
    fn filtered_hops_is_subsequence_without_duplicates() {
        let table = (0..20)
            .map(|index| {
                let status = if index % 3 == 0 { "timeout" } else { "success" };
                row(index, &(index / 2).to_string(), status, &format!("10.0.0.{index}"))
            })
            .collect::<Vec<_>>();
        let capture = Capture::new("1", Vec::new(), table);

        let filtered = capture.filtered_hops();
        let mut cursor = capture.table.iter();
        for hop in filtered {
            assert!(cursor.any(|candidate| candidate == hop));
            assert!(hop.is_success());
        }

        let mut ttls = filtered
            .iter()
            .filter_map(|hop| hop.column(TTL_COLUMN))
            .collect::<Vec<_>>();
        let total = ttls.len();
        ttls.sort_unstable();
        ttls.dedup();
        assert_eq!(ttls.len(), total);
    }

    #[test]
    fn short_rows_are_excluded() {
        let capture = Capture::new(
            "1",
            Vec::new(),
            vec![
                HopRecord::new(0, vec!["10.1.10.20".to_owned(), "8.8.8.8".to_owned()]),
                row(1, "1", "success", "10.1.10.1"),
            ],
        );
        assert_eq!(capture.filtered_hops().len(), 1);
        assert_eq!(capture.filtered_hops()[0].index, 1);
    }

    #[test]
    fn hop_chain_skips_wildcards() {
        let capture = Capture::new(
            "1",
            vec![
                "1: 10.1.10.1 (2ms)".to_owned(),
                "2: * *".to_owned(),
                "3: X".to_owned(),
                "4: 72.14.1.1 (9ms)".to_owned(),
                String::new(),
            ],
            Vec::new(),
        );
        assert_eq!(capture.hop_chain(), vec!["10.1.10.1", "72.14.1.1"]);
    }

    #[test]
    fn live_window_uses_id_timestamp() {
        let capture = Capture::new("1650000000", Vec::new(), Vec::new());
        let recorded = UNIX_EPOCH + Duration::from_secs(1_650_000_000);
        let window = Duration::from_secs(20 * 60);

        assert!(capture.is_live(recorded + Duration::from_secs(60), window));
        assert!(!capture.is_live(recorded + Duration::from_secs(21 * 60), window));
        assert!(!Capture::new("offline", Vec::new(), Vec::new()).is_live(recorded, window));
    }

    #[test]
    fn labels_follow_column_layout() {
        let mut columns = vec![String::new(); 23];
        columns[SOURCE_COLUMN] = "10.1.10.20".to_owned();
        columns[ADDR_COLUMN] = "8.8.8.8".to_owned();
        columns[CITY_COLUMN] = "Mountain View".to_owned();
        columns[COUNTRY_CODE_COLUMN] = "US".to_owned();
        columns[ASN_COLUMN] = "AS15169".to_owned();
        columns[ORG_COLUMN] = "GOOGLE".to_owned();
        let record = HopRecord::new(3, columns);

        assert_eq!(record.hop_label(), "8.8.8.8 (Mountain View, US, AS15169, GOOGLE)");
        assert_eq!(record.root_label(), "10.1.10.20 (root)");
        assert_eq!(record.location_text(), "Mountain View, US,");
    }
}
