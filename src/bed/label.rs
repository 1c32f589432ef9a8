use super::{read_bed9, BedRecord};
use crate::error::Result;
use crate::track::IntervalTable;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Category names by descending total length, so long annotations are drawn
/// first and never hide short ones. Ties keep first-seen order.
pub fn category_order(records: &[BedRecord]) -> Vec<String> {
    let mut totals: FxHashMap<&str, u64> = FxHashMap::default();
    let mut order: Vec<&str> = Vec::new();
    for r in records {
        let total = totals.entry(r.name.as_str()).or_insert_with(|| {
            order.push(r.name.as_str());
            0
        });
        *total += r.length();
    }
    order.sort_by_key(|name| std::cmp::Reverse(totals[name]));
    order.into_iter().map(str::to_string).collect()
}

pub fn read_bed_label(path: &Path, chrom: Option<&str>) -> Result<IntervalTable> {
    let records = read_bed9(path, chrom)?;
    let categories = category_order(&records);
    Ok(IntervalTable { records, categories })
}
