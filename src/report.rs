//! Console output: progress, mismatch diagnostics and the final summary.

use std::io::{self, Write};

use tracing::warn;

use crate::{
    error::Error,
    vector::{Outcome, TestCase},
    verify::Mismatch,
};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
/// Verification counts; `total == ok + nok` after every test case.
pub struct Stats {
    pub ok: u64,
    pub nok: u64,
    pub total: u64,
}

pub struct Reporter<W: Write> {
    out: W,
    stats: Stats,
    /// print progress every that many test cases, 0 for never
    interval: u64,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, interval: u64) -> Self {
        Self {
            out,
            stats: Stats::default(),
            interval,
        }
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Counts one verified test case.
    pub fn record(
        &mut self,
        curve: u32,
        case: &TestCase,
        verdict: Result<(), Mismatch>,
    ) -> io::Result<()> {
        // counted before any output
        match verdict {
            Ok(()) => self.stats.ok += 1,
            Err(_) => self.stats.nok += 1,
        }
        self.stats.total += 1;

        if let Err(mismatch) = verdict {
            warn!(curve, test = case.id, op = %case.op, %mismatch, "mismatch");
            self.mismatch(curve, case, mismatch)?;
        }

        if self.interval != 0 && self.stats.total % self.interval == 0 {
            self.progress()?;
        }
        Ok(())
    }

    pub fn progress(&mut self) -> io::Result<()> {
        let Stats { ok, nok, total } = self.stats;
        writeln!(self.out, "{:>8} {:>8} {:>8}", ok, nok, total)
    }

    fn mismatch(&mut self, curve: u32, case: &TestCase, mismatch: Mismatch) -> io::Result<()> {
        let show = |outcome: &Option<Outcome>| match outcome {
            Some(outcome) => outcome.to_string(),
            None => "<none>".to_string(),
        };
        writeln!(
            self.out,
            "Mismatch on test {}.{} ({}): {}",
            curve, case.id, case.op, mismatch
        )?;
        writeln!(self.out, "  expected: {}", show(&case.expected))?;
        writeln!(self.out, "  hardware: {}", show(&case.hardware))?;
        if case.exception {
            writeln!(self.out, "  (exception expected)")?;
        }
        Ok(())
    }

    /// Summary printed when the batch stops on a fatal error.
    pub fn fatal(&mut self, curve: u32, test: u32, error: &Error) -> io::Result<()> {
        let Stats { ok, nok, total } = self.stats;
        writeln!(self.out, "Stopped on test {}.{}", curve, test)?;
        writeln!(self.out, "OK = {}", ok)?;
        writeln!(self.out, "nOK = {}", nok)?;
        writeln!(self.out, "total = {}", total)?;
        writeln!(self.out, "--")?;
        writeln!(self.out, "Error: {}", error)?;
        self.out.flush()
    }

    /// Summary printed at the end of the input.
    pub fn finish(&mut self) -> io::Result<()> {
        let Stats { ok, nok, total } = self.stats;
        writeln!(self.out, "OK = {}", ok)?;
        writeln!(self.out, "nOK = {}", nok)?;
        writeln!(self.out, "total = {}", total)?;
        self.out.flush()
    }
}
