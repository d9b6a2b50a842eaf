use std::{
    io::Read,
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use anyhow::Context;

use super::{parse_tabular, Alignments, AlignmentLocator};
use crate::fasta::read_names_from_path;

const OUTFMT: &str = "6 qseqid sseqid sstart send evalue bitscore";
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs a local `blastn` with the targets as query and the mapping reference as subject
pub struct Blastn {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Blastn {
    pub fn new<S: AsRef<Path>>(program: S, timeout: Option<Duration>) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            timeout,
        }
    }

    /// Run the aligner once and return its standard output
    pub fn run(&self, reference: &Path, targets: &Path) -> anyhow::Result<Vec<u8>> {
        debug!(
            "Running {} -query {} -subject {}",
            self.program.display(),
            targets.display(),
            reference.display()
        );
        let mut child = Command::new(&self.program)
            .arg("-query")
            .arg(targets)
            .arg("-subject")
            .arg(reference)
            .arg("-outfmt")
            .arg(OUTFMT)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to execute {}", self.program.display()))?;

        // Drain both pipes in the background
        let stdout = drain(child.stdout.take())?;
        let stderr = drain(child.stderr.take())?;

        let status = match self.timeout {
            Some(limit) => wait_with_limit(&mut child, limit)
                .with_context(|| format!("{} did not complete", self.program.display()))?,
            None => child.wait()?,
        };

        let out = stdout
            .join()
            .map_err(|_| anyhow!("Output reader thread panicked"))??;
        let err = stderr
            .join()
            .map_err(|_| anyhow!("Error reader thread panicked"))??;

        if !status.success() {
            return Err(anyhow!(
                "{} returned {}: {}",
                self.program.display(),
                status,
                String::from_utf8_lossy(&err).trim()
            ));
        }
        debug!("Aligner returned {} bytes of output", out.len());
        Ok(out)
    }
}

impl AlignmentLocator for Blastn {
    fn locate(&self, reference: &Path, targets: &Path) -> anyhow::Result<Alignments> {
        let names = read_names_from_path(targets)?;
        let out = self.run(reference, targets)?;
        let spans = parse_tabular(out.as_slice())
            .with_context(|| format!("Unparseable output from {}", self.program.display()))?;
        let aln = Alignments::resolve(&names, spans);
        info!(
            "{} of {} targets aligned to the reference",
            aln.hits().len(),
            names.len()
        );
        Ok(aln)
    }
}

type Drain = thread::JoinHandle<std::io::Result<Vec<u8>>>;

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> anyhow::Result<Drain> {
    let mut pipe = pipe.ok_or_else(|| anyhow!("Aligner pipe not available"))?;
    Ok(thread::spawn(move || {
        let mut v = Vec::new();
        pipe.read_to_end(&mut v).map(|_| v)
    }))
}

fn wait_with_limit(child: &mut Child, limit: Duration) -> anyhow::Result<ExitStatus> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if start.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            return Err(anyhow!("Timed out after {}s", limit.as_secs_f64()));
        }
        thread::sleep(POLL_INTERVAL)
    }
}
