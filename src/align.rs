use std::{collections::HashMap, fmt, io::BufRead, path::Path, sync::Arc};

mod blastn;

pub use blastn::Blastn;

/// Location of the best alignment of one target on the reference.
/// Coordinates are 1-based and inclusive with `start <= end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentHit {
    target: Arc<str>,
    start: usize,
    end: usize,
}

impl AlignmentHit {
    /// Reverse strand hits (start > end) are swapped so that start <= end
    pub fn new(target: &str, start: usize, end: usize) -> Self {
        let (start, end) = if start > end {
            (end, start)
        } else {
            (start, end)
        };
        Self {
            target: Arc::from(target),
            start,
            end,
        }
    }

    pub fn target(&self) -> &Arc<str> {
        &self.target
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }
}

impl fmt::Display for AlignmentHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.target, self.start, self.end)
    }
}

/// Hits for every target that aligned (in target file order) and the names
/// of those that did not
#[derive(Debug, Default, Clone)]
pub struct Alignments {
    hits: Vec<AlignmentHit>,
    misses: Vec<Box<str>>,
}

impl Alignments {
    /// Match raw (start, end) spans against the list of target names.  Each
    /// target without a span is logged once and recorded as a miss.
    pub fn resolve(names: &[Box<str>], mut spans: HashMap<Box<str>, (usize, usize)>) -> Self {
        let mut hits = Vec::with_capacity(names.len());
        let mut misses = Vec::new();
        for name in names.iter() {
            match spans.remove(name) {
                Some((s, e)) => {
                    let hit = AlignmentHit::new(name, s, e);
                    debug!("Target {} aligned to {}-{}", name, hit.start, hit.end);
                    hits.push(hit)
                }
                None => {
                    warn!("{} no alignment found - target excluded", name);
                    misses.push(name.clone())
                }
            }
        }
        for name in spans.keys() {
            warn!("Aligner reported unknown query {} - ignored", name)
        }
        Self { hits, misses }
    }

    pub fn hits(&self) -> &[AlignmentHit] {
        &self.hits
    }

    pub fn misses(&self) -> &[Box<str>] {
        &self.misses
    }
}

/// Anything that can place target sequences on a reference
pub trait AlignmentLocator {
    fn locate(&self, reference: &Path, targets: &Path) -> anyhow::Result<Alignments>;
}

/// Parse aligner tabular output (query, subject, subject start, subject end, ...).
/// Rows for a query arrive best first, so only the first row per query is kept.
pub fn parse_tabular<R: BufRead>(mut rdr: R) -> anyhow::Result<HashMap<Box<str>, (usize, usize)>> {
    let mut buf = String::new();
    let mut spans = HashMap::new();
    let mut line = 0;
    let parse = |s: &str, line: usize| {
        s.parse::<usize>().map_err(|e| {
            anyhow!(
                "Could not parse coordinate '{}' at line {} of aligner output: {}",
                s,
                line,
                e
            )
        })
    };
    loop {
        buf.clear();
        if rdr.read_line(&mut buf)? == 0 {
            break;
        }
        line += 1;
        let s = buf.trim_end();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }
        let fields: Vec<_> = s.split('\t').collect();
        if fields.len() < 4 {
            return Err(anyhow!(
                "Short line {} in aligner output (saw {} columns, expected at least 4)",
                line,
                fields.len()
            ));
        }
        let start = parse(fields[2], line)?;
        let end = parse(fields[3], line)?;
        spans.entry(Box::from(fields[0])).or_insert((start, end));
    }
    Ok(spans)
}
