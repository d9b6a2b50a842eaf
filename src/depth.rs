use std::{io::BufRead, ops::Range, path::Path};

use anyhow::Context;
use compress_io::compress::CompressIo;

/// Read depth at one 1-based position
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DepthRecord {
    pub pos: usize,
    pub depth: f64,
}

/// Per position depth for a single reference sequence, sorted by position
/// with no duplicate positions.  Read only once loaded.
pub struct DepthTable {
    ref_id: Box<str>,
    recs: Vec<DepthRecord>,
}

impl DepthTable {
    pub fn new(ref_id: &str, mut recs: Vec<DepthRecord>) -> anyhow::Result<Self> {
        recs.sort_unstable_by_key(|r| r.pos);
        if let Some(w) = recs.windows(2).find(|w| w[0].pos == w[1].pos) {
            return Err(anyhow!(
                "Duplicate depth entry for {}:{}",
                ref_id,
                w[0].pos
            ));
        }
        Ok(Self {
            ref_id: Box::from(ref_id),
            recs,
        })
    }

    /// Read a depth table (reference_id, position, depth).  If `contig` is
    /// given, only rows for that reference are kept; otherwise the table
    /// must hold a single reference.
    pub fn from_reader<R: BufRead>(mut rdr: R, contig: Option<&str>) -> anyhow::Result<Self> {
        let mut buf = String::new();
        let mut recs = Vec::new();
        let mut ref_id: Option<Box<str>> = None;
        let mut line = 0;
        let mut skipped = 0;
        loop {
            buf.clear();
            if rdr.read_line(&mut buf)? == 0 {
                break;
            }
            line += 1;
            let s = buf.trim_end();
            if s.is_empty() {
                continue;
            }
            let fields: Vec<_> = s.split('\t').collect();
            if fields.len() < 3 {
                return Err(anyhow!(
                    "Short line {} in depth table (saw {} columns, expected 3)",
                    line,
                    fields.len()
                ));
            }
            let ctg = fields[0];
            match (contig, ref_id.as_deref()) {
                (Some(c), _) if c != ctg => {
                    skipped += 1;
                    continue;
                }
                (None, Some(r)) if r != ctg => {
                    return Err(anyhow!(
                        "Depth table has multiple references ({} and {}); select one with --contig",
                        r,
                        ctg
                    ))
                }
                _ => (),
            }
            if ref_id.is_none() {
                ref_id = Some(Box::from(ctg))
            }
            let pos = fields[1]
                .parse::<usize>()
                .ok()
                .filter(|&p| p > 0)
                .ok_or_else(|| anyhow!("Illegal position '{}' at line {}", fields[1], line))?;
            let depth = fields[2]
                .parse::<f64>()
                .ok()
                .filter(|d| d.is_finite() && *d >= 0.0)
                .ok_or_else(|| anyhow!("Illegal depth '{}' at line {}", fields[2], line))?;
            recs.push(DepthRecord { pos, depth });
        }
        if skipped > 0 {
            debug!("Skipped {} depth entries from other references", skipped);
        }
        let ref_id = match (ref_id, contig) {
            (Some(r), _) => r,
            (None, Some(c)) => return Err(anyhow!("No depth entries found for reference {}", c)),
            (None, None) => return Err(anyhow!("Empty depth table")),
        };
        Self::new(&ref_id, recs)
    }

    pub fn from_path<S: AsRef<Path>>(file: S, contig: Option<&str>) -> anyhow::Result<Self> {
        let file = file.as_ref();
        let rdr = CompressIo::new().path(file).bufreader()?;
        debug!("Opened {} for input", file.display());
        Self::from_reader(rdr, contig)
            .with_context(|| format!("Error reading depth table {}", file.display()))
    }

    pub fn ref_id(&self) -> &str {
        &self.ref_id
    }

    pub fn len(&self) -> usize {
        self.recs.len()
    }

    pub fn records(&self) -> &[DepthRecord] {
        &self.recs
    }

    /// Index range of records with lo <= pos <= hi (empty if hi < lo)
    pub fn span(&self, lo: usize, hi: usize) -> Range<usize> {
        let a = self.recs.partition_point(|r| r.pos < lo);
        let b = self.recs.partition_point(|r| r.pos <= hi).max(a);
        a..b
    }

    pub fn slice(&self, r: Range<usize>) -> &[DepthRecord] {
        &self.recs[r]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TAB: &str = "chr1\t3\t7\nchr1\t1\t5\n\nchr1\t2\t6.5\n";

    #[test]
    fn read_and_sort() {
        let t = DepthTable::from_reader(TAB.as_bytes(), None).unwrap();
        assert_eq!(t.ref_id(), "chr1");
        let p: Vec<_> = t.records().iter().map(|r| r.pos).collect();
        assert_eq!(p, vec![1, 2, 3]);
        assert_eq!(t.records()[1].depth, 6.5);
    }

    #[test]
    fn multiple_references_need_contig() {
        let s = "chr1\t1\t5\nchrM\t1\t9\nchrM\t2\t8\n";
        assert!(DepthTable::from_reader(s.as_bytes(), None).is_err());
        let t = DepthTable::from_reader(s.as_bytes(), Some("chrM")).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.ref_id(), "chrM");
        assert!(DepthTable::from_reader(s.as_bytes(), Some("chrX")).is_err());
    }

    #[test]
    fn bad_rows_rejected() {
        assert!(DepthTable::from_reader("chr1\t1\n".as_bytes(), None).is_err());
        assert!(DepthTable::from_reader("chr1\t0\t4\n".as_bytes(), None).is_err());
        assert!(DepthTable::from_reader("chr1\t1\t-4\n".as_bytes(), None).is_err());
        assert!(DepthTable::from_reader("chr1\t1\t4\nchr1\t1\t5\n".as_bytes(), None).is_err());
        assert!(DepthTable::from_reader("".as_bytes(), None).is_err());
    }

    #[test]
    fn span_clamps_to_table() {
        let recs = (10..=20).map(|pos| DepthRecord { pos, depth: 1.0 }).collect();
        let t = DepthTable::new("chr1", recs).unwrap();
        assert_eq!(t.span(0, 12), 0..3);
        assert_eq!(t.span(18, 100), 8..11);
        assert_eq!(t.span(30, 40), 11..11);
        assert!(t.span(15, 14).is_empty());
    }

    #[test]
    fn read_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(TAB.as_bytes()).unwrap();
        f.flush().unwrap();
        let t = DepthTable::from_path(f.path(), None).unwrap();
        assert_eq!(t.len(), 3);
    }
}
