use std::{ops::Range, sync::Arc};

use crate::{
    align::AlignmentHit,
    depth::{DepthRecord, DepthTable},
};

/// Masked and flanking subsets of a depth table for one target at one
/// flank length.  Stored as index ranges into the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSet {
    target: Arc<str>,
    masked: Range<usize>,
    left: Range<usize>,
    right: Range<usize>,
}

impl RegionSet {
    /// masked: start <= p <= end
    /// flanking: start - cutlen <= p < start - fixlen and end + fixlen < p <= end + cutlen
    pub fn extract(table: &DepthTable, hit: &AlignmentHit, cutlen: usize, fixlen: usize) -> Self {
        let (start, end) = (hit.start(), hit.end());
        let masked = table.span(start, end);
        let left = match start.checked_sub(fixlen + 1) {
            Some(hi) => table.span(start.saturating_sub(cutlen), hi),
            None => masked.start..masked.start,
        };
        let right = table.span(end + fixlen + 1, end + cutlen);
        trace!(
            "{} cutlen {} fixlen {}: masked {}, flanking {} + {}",
            hit,
            cutlen,
            fixlen,
            masked.len(),
            left.len(),
            right.len()
        );
        Self {
            target: hit.target().clone(),
            masked,
            left,
            right,
        }
    }

    pub fn target(&self) -> &Arc<str> {
        &self.target
    }

    pub fn masked<'a>(&self, table: &'a DepthTable) -> &'a [DepthRecord] {
        table.slice(self.masked.clone())
    }

    /// Both flanks, left then right, in position order
    pub fn flanking(&self, table: &DepthTable) -> Vec<DepthRecord> {
        let mut v = Vec::with_capacity(self.n_flanking());
        v.extend_from_slice(table.slice(self.left.clone()));
        v.extend_from_slice(table.slice(self.right.clone()));
        v
    }

    pub fn n_masked(&self) -> usize {
        self.masked.len()
    }

    pub fn n_flanking(&self) -> usize {
        self.left.len() + self.right.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn table() -> DepthTable {
        let recs = (1..=2000).map(|pos| DepthRecord { pos, depth: 1.0 }).collect();
        DepthTable::new("chr1", recs).unwrap()
    }

    fn positions(v: &[DepthRecord]) -> Vec<usize> {
        v.iter().map(|r| r.pos).collect()
    }

    #[rstest]
    fn flanks_without_margin(table: DepthTable) {
        let hit = AlignmentHit::new("T1", 1000, 1010);
        let rs = RegionSet::extract(&table, &hit, 5, 0);
        assert_eq!(positions(rs.masked(&table)), (1000..=1010).collect::<Vec<_>>());
        assert_eq!(
            positions(&rs.flanking(&table)),
            vec![995, 996, 997, 998, 999, 1011, 1012, 1013, 1014, 1015]
        );
    }

    #[rstest]
    fn flanks_with_margin(table: DepthTable) {
        let hit = AlignmentHit::new("T1", 1000, 1010);
        let rs = RegionSet::extract(&table, &hit, 5, 2);
        assert_eq!(
            positions(&rs.flanking(&table)),
            vec![995, 996, 997, 1013, 1014, 1015]
        );
        // Margin as wide as the flank leaves nothing
        let rs = RegionSet::extract(&table, &hit, 5, 5);
        assert_eq!(rs.n_flanking(), 0);
    }

    #[rstest]
    #[case(1, 100)]
    #[case(3, 2500)]
    #[case(1995, 1999)]
    fn clamped_to_table(table: DepthTable, #[case] start: usize, #[case] end: usize) {
        let hit = AlignmentHit::new("T1", start, end);
        let rs = RegionSet::extract(&table, &hit, 50, 0);
        for r in rs.masked(&table).iter().chain(rs.flanking(&table).iter()) {
            assert!(r.pos >= 1 && r.pos <= 2000);
        }
    }

    #[rstest]
    fn disjoint_and_outside_target(table: DepthTable) {
        for (s, e) in [(10, 20), (500, 900), (1990, 2000)] {
            let hit = AlignmentHit::new("T1", s, e);
            for cutlen in [1, 7, 100, 5000] {
                for fixlen in [0, 3, 50] {
                    let rs = RegionSet::extract(&table, &hit, cutlen, fixlen);
                    let masked = positions(rs.masked(&table));
                    for r in rs.flanking(&table) {
                        assert!(r.pos < s || r.pos > e);
                        assert!(!masked.contains(&r.pos));
                    }
                }
            }
        }
    }

    #[rstest]
    fn margin_only_shrinks_flanks(table: DepthTable) {
        let hit = AlignmentHit::new("T1", 600, 700);
        for cutlen in [10, 200] {
            let base = positions(&RegionSet::extract(&table, &hit, cutlen, 0).flanking(&table));
            let mut last = base.len();
            for fixlen in 1..=cutlen + 2 {
                let f = positions(&RegionSet::extract(&table, &hit, cutlen, fixlen).flanking(&table));
                assert!(f.iter().all(|p| base.contains(p)));
                assert!(f.len() < last || f.is_empty());
                last = f.len();
            }
        }
    }
}
