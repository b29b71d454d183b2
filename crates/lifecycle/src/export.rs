use std::fmt::Write as _;

use crate::record::Record;
use crate::status::StatusModel;

/// Flattens a record collection to CSV rows:
/// `id,date,customer,total,status,items`.
///
/// Pure function, no I/O; fields containing a comma, quote or newline are
/// quoted per RFC 4180.
pub fn to_csv<S: StatusModel>(records: &[Record<S>]) -> String {
    let mut out = String::from("id,date,customer,total,status,items\n");
    for record in records {
        let _ = writeln!(
            out,
            "{},{},{},{},{},{}",
            escape(&record.id.0),
            record.created_at.format("%Y-%m-%d"),
            escape(&record.customer.name),
            record.total,
            record.status.as_str(),
            record.items.len(),
        );
    }
    out
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
