use std::{collections::HashSet, io::BufRead, path::Path};

use compress_io::compress::CompressIo;

/// Record names (first word of each header line) from a FASTA file, in file order.
///
/// Sequence lines are skipped without checking their content.
pub fn read_names<R: BufRead>(mut rdr: R) -> anyhow::Result<Vec<Box<str>>> {
    let mut buf = String::new();
    let mut names: Vec<Box<str>> = Vec::new();
    let mut seen = HashSet::new();
    let mut line = 0;
    loop {
        buf.clear();
        if rdr.read_line(&mut buf)? == 0 {
            break;
        }
        line += 1;
        let s = buf.trim_end();
        if let Some(hdr) = s.strip_prefix('>') {
            let name = hdr
                .split_ascii_whitespace()
                .next()
                .ok_or_else(|| anyhow!("Empty FASTA header at line {}", line))?;
            trace!("Found sequence {}", name);
            if !seen.insert(name.to_owned()) {
                return Err(anyhow!("Duplicate sequence name {} at line {}", name, line));
            }
            names.push(Box::from(name))
        } else if !s.is_empty() && names.is_empty() {
            return Err(anyhow!("Expected '>' at start of line {}", line));
        }
    }
    Ok(names)
}

pub fn read_names_from_path<S: AsRef<Path>>(file: S) -> anyhow::Result<Vec<Box<str>>> {
    let file = file.as_ref();
    let rdr = CompressIo::new().path(file).bufreader()?;
    debug!("Opened {} for input", file.display());
    let names = read_names(rdr)?;
    if names.is_empty() {
        return Err(anyhow!("No sequences read in from {}", file.display()));
    }
    debug!("Read {} sequence names from {}", names.len(), file.display());
    Ok(names)
}
