use std::{
    io::{self, BufWriter, Write},
    thread,
};

use anyhow::{Context, anyhow};
use flakeuid::{TimeSource, UidFacade, UidSource};

/// Mints `count` identifiers from `workers` threads sharing `source` and
/// writes them to `out`, one per line, grouped by worker.
///
/// Any failure aborts the whole batch before anything is written.
pub fn generate<S, W>(source: &S, count: usize, workers: usize, out: W) -> anyhow::Result<()>
where
    S: UidSource + Sync + ?Sized,
    W: Write,
{
    let per_worker = count.div_ceil(workers.max(1));

    let batches = thread::scope(|s| {
        let handles: Vec<_> = (0..workers)
            .map(|worker| {
                let start = worker * per_worker;
                let take = per_worker.min(count.saturating_sub(start));
                s.spawn(move || {
                    (0..take)
                        .map(|_| source.next_identifier())
                        .collect::<flakeuid::Result<Vec<_>>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| anyhow!("worker thread panicked")))
            .collect::<anyhow::Result<Vec<_>>>()
    })?;

    let batches = batches
        .into_iter()
        .collect::<flakeuid::Result<Vec<_>>>()
        .context("identifier generation failed")?;

    let mut out = BufWriter::new(out);
    let mut written = 0;
    for uid in batches.iter().flatten() {
        writeln!(out, "{uid}")?;
        written += 1;
    }
    out.flush()?;

    tracing::debug!(written, workers, "batch complete");
    Ok(())
}

/// Writes the fields of `uid` to `out` as `key: value` lines.
pub fn decompose<T, W>(facade: &UidFacade<T>, uid: &str, mut out: W) -> anyhow::Result<()>
where
    T: TimeSource,
    W: Write,
{
    let parts = facade
        .decompose_str(uid)
        .with_context(|| format!("cannot decompose {uid:?}"))?;

    writeln!(out, "algorithm:  {}", facade.algorithm())?;
    writeln!(out, "raw:        {}", parts.raw)?;
    writeln!(out, "timestamp:  {}", parts.timestamp)?;
    writeln!(out, "machine_id: {}", parts.machine_id)?;
    writeln!(out, "sequence:   {}", parts.sequence)?;
    match parts.datetime() {
        Some(at) => writeln!(out, "time:       {}", at.to_rfc3339())?,
        None => writeln!(out, "time:       out of range")?,
    }
    Ok(())
}

pub fn stdout() -> io::StdoutLock<'static> {
    io::stdout().lock()
}
