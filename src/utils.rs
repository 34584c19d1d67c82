use std::collections::HashSet;

use chrono::NaiveDate;

use crate::types::Record;

/// Page size of a search request.
pub const SEARCH_PAGE_SIZE: u64 = 50;

/// Offset at which the search endpoint stops answering.
pub const SEARCH_OFFSET_CEILING: u64 = 1000;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Splits `items` into consecutive chunks of `size`.
///
/// The last chunk may be shorter, order is kept, empty input gives no chunks.
/// A `size` of zero is treated as one.
pub fn batch<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    items.chunks(size.max(1)).map(|c| c.to_vec()).collect()
}

/// Returns every three letter lowercase prefix, `aaa` to `zzz`, in
/// lexicographic order.
pub fn enumerate_prefixes() -> Vec<String> {
    let mut prefixes = Vec::with_capacity(ALPHABET.len().pow(3));
    for &c1 in ALPHABET {
        for &c2 in ALPHABET {
            for &c3 in ALPHABET {
                prefixes.push(String::from_utf8_lossy(&[c1, c2, c3]).into_owned());
            }
        }
    }
    prefixes
}

/// Builds the offset pages needed to read a search result past its first page.
///
/// Offsets run `50, 100, 150, ...` while below `total` and below the search
/// offset ceiling. Results past the ceiling cannot be reached at all.
pub fn resolve_overflow(base_url: &str, total: u64) -> Vec<String> {
    let limit = total.min(SEARCH_OFFSET_CEILING);
    (1..)
        .map(|page| page * SEARCH_PAGE_SIZE)
        .take_while(|offset| *offset < limit)
        .map(|offset| format!("{base_url}&offset={offset}"))
        .collect()
}

/// Whether a search reported more results than the offset ceiling lets us read.
pub fn is_truncated(total: u64) -> bool {
    total > SEARCH_OFFSET_CEILING
}

/// Drops empty and repeated ids, keeping the first occurrence.
pub fn unique_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter()
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Name of the dated output folder, e.g. `2022_05_17`.
pub fn dated_folder_name(date: NaiveDate) -> String {
    date.format("%Y_%m_%d").to_string()
}

/// Serializes a row struct into a record, fields in declaration order.
pub fn to_record<T: serde::Serialize>(row: &T) -> Result<Record, String> {
    match serde_json::to_value(row).map_err(|e| e.to_string())? {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(format!("expected an object, got {other}")),
    }
}
