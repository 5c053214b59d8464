use anyhow::{Context, Result, anyhow};

use super::record::HopRecord;

/// Second whitespace-separated token of a trace line, unless it marks a
/// timeout (`*`) or a failed query (`X`).
pub fn hop_address(line: &str) -> Option<&str> {
    line.split_whitespace()
        .nth(1)
        .filter(|token| !token.is_empty() && !token.contains('*') && !token.contains('X'))
}

/// Parses a hop table. Rows keep their raw columns; ragged rows are accepted and
/// later dropped by the filtered view rather than failing the capture.
pub(super) fn parse_hop_table(raw: &str) -> Result<Vec<HopRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("invalid CSV record at row {index}"))?;
        let columns = record.iter().map(str::to_owned).collect();
        rows.push(HopRecord::new(index, columns));
    }

    Ok(rows)
}

pub(super) fn split_trace_lines(raw: &str) -> Vec<String> {
    raw.lines().map(|line| line.trim_end().to_owned()).collect()
}

/// Splits `<timestamp>-<name>.csv` into the capture id and the trace file stem.
pub(super) fn split_capture_file_name(file_name: &str) -> Result<(String, String)> {
    let stem = file_name.strip_suffix(".csv").unwrap_or(file_name);
    let (id, trace_name) = stem
        .split_once('-')
        .ok_or_else(|| anyhow!("capture file name {file_name:?} has no '-' separator"))?;

    if id.is_empty() || trace_name.is_empty() {
        return Err(anyhow!("capture file name {file_name:?} is missing a part"));
    }

    let trace_name = trace_name.split('-').next().unwrap_or(trace_name);
    Ok((id.to_owned(), trace_name.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hop_address_takes_second_token() {
        assert_eq!(hop_address("1: 10.1.10.1 (3ms)  10.1.10.1 (2ms)"), Some("10.1.10.1"));
        assert_eq!(hop_address("  7:   8.8.8.8   (12ms)"), Some("8.8.8.8"));
        assert_eq!(hop_address("2: *  *  *"), None);
        assert_eq!(hop_address("3: X  *"), None);
        assert_eq!(hop_address("4:"), None);
        assert_eq!(hop_address(""), None);
    }

    #[test]
    fn ragged_rows_are_kept() {
        let rows = parse_hop_table("a,b,c\n1,2\n\n,x,,y\n").expect("table parses");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].fields(), vec!["1", "2"]);
        assert_eq!(rows[2].fields(), vec!["x", "y"]);
        assert_eq!(rows[2].index, 2);
    }

    #[test]
    fn file_name_parts() {
        let (id, trace) = split_capture_file_name("1650000000-8.8.8.8.csv").expect("valid name");
        assert_eq!(id, "1650000000");
        assert_eq!(trace, "8.8.8.8");

        assert!(split_capture_file_name("capture.csv").is_err());
        assert!(split_capture_file_name("-name.csv").is_err());
    }
}
