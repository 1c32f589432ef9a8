use super::{read_bed9, BedRecord};
use crate::color::{monomer_color, MONOMER_LEN};
use crate::error::Result;
use crate::track::{HorReadOptions, HorSortBy, SortOrder};
use log::debug;
use rustc_hash::FxHashMap;
use std::path::Path;

/// Monomers per HOR unit, clamped to `1..=100`.
fn mer_of(length: u64) -> u8 {
    let mer = (length as f64 / MONOMER_LEN as f64).round();
    mer.clamp(1.0, 100.0) as u8
}

/// Annotate, filter, color and sort HOR records.
pub fn prepare_hor(records: Vec<BedRecord>, opts: &HorReadOptions) -> Vec<BedRecord> {
    let mut records: Vec<BedRecord> = records
        .into_iter()
        .map(|mut r| {
            r.mer = Some(mer_of(r.length()));
            r
        })
        .filter(|r| !opts.live_only || r.name.contains('L'))
        .filter(|r| r.mer.unwrap_or(0) >= opts.mer_filter)
        .collect();

    for r in records.iter_mut() {
        r.color = Some(if opts.use_item_rgb {
            r.item_rgb
        } else {
            monomer_color(r.mer.unwrap_or(1))
        });
    }

    let mut counts: FxHashMap<String, usize> = FxHashMap::default();
    for r in &records {
        *counts.entry(r.name.clone()).or_insert(0) += 1;
    }
    for r in records.iter_mut() {
        r.hor_count = counts.get(&r.name).copied();
    }

    if let Some(min_count) = opts.hor_filter {
        records.retain(|r| r.hor_count.unwrap_or(0) >= min_count);
    }

    // Stable sort keeps genomic order within equal keys.
    let key = |r: &BedRecord| match opts.sort_by {
        HorSortBy::Mer => r.mer.unwrap_or(0) as usize,
        HorSortBy::HorCount => r.hor_count.unwrap_or(0),
    };
    match opts.sort_order {
        SortOrder::Ascending => records.sort_by_key(key),
        SortOrder::Descending => records.sort_by_key(|r| std::cmp::Reverse(key(r))),
    }
    records
}

/// Read a HOR BED9 file, see [`prepare_hor`].
pub fn read_bed_hor(path: &Path, chrom: Option<&str>, opts: &HorReadOptions) -> Result<Vec<BedRecord>> {
    let records = prepare_hor(read_bed9(path, chrom)?, opts);
    debug!("Kept {} HORs from {:?}", records.len(), path);
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba;

    fn hor(st: u64, mers: u64, name: &str) -> BedRecord {
        BedRecord::new("chr1", st, st + mers * MONOMER_LEN, name)
    }

    #[test]
    fn mer_is_rounded_and_clamped() {
        assert_eq!(mer_of(0), 1);
        assert_eq!(mer_of(170 * 12 + 80), 12);
        assert_eq!(mer_of(170 * 500), 100);
    }

    #[test]
    fn filters_live_and_small_hors() {
        let recs = vec![hor(0, 12, "S1C1H1L"), hor(5000, 12, "S1C1H1d"), hor(9000, 1, "S1C1H2L")];
        let out = prepare_hor(recs, &HorReadOptions::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "S1C1H1L");
        assert_eq!(out[0].mer, Some(12));
        assert_eq!(out[0].color, Some(monomer_color(12)));
    }

    #[test]
    fn counts_names_and_applies_hor_filter() {
        let recs = vec![hor(0, 6, "A L"), hor(2000, 6, "A L"), hor(4000, 8, "B L")];
        let opts = HorReadOptions {
            hor_filter: Some(2),
            ..HorReadOptions::default()
        };
        let out = prepare_hor(recs, &opts);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.hor_count == Some(2)));
    }

    #[test]
    fn sorts_by_requested_key() {
        let recs = vec![hor(0, 3, "aL"), hor(1000, 9, "bL"), hor(3000, 3, "aL")];

        let out = prepare_hor(recs.clone(), &HorReadOptions::default());
        let mers: Vec<u8> = out.iter().filter_map(|r| r.mer).collect();
        assert_eq!(mers, vec![9, 3, 3]);
        // Equal keys keep genomic order.
        assert_eq!((out[1].chrom_st, out[2].chrom_st), (0, 3000));

        let opts = HorReadOptions {
            sort_by: HorSortBy::HorCount,
            sort_order: SortOrder::Ascending,
            ..HorReadOptions::default()
        };
        let out = prepare_hor(recs, &opts);
        assert_eq!(out[0].name, "bL");
    }

    #[test]
    fn item_rgb_can_override_palette() {
        let mut rec = hor(0, 4, "xL");
        rec.item_rgb = Rgba::rgb(1, 2, 3);
        let opts = HorReadOptions {
            use_item_rgb: true,
            ..HorReadOptions::default()
        };
        let out = prepare_hor(vec![rec], &opts);
        assert_eq!(out[0].color, Some(Rgba::rgb(1, 2, 3)));
    }
}
