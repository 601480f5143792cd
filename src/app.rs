//! Host-side app driving an accelerator through a test-vector stream.

use std::io::{self, BufRead, Write};

use driver::Accelerator;
use tracing::{debug, error, info, warn};

use crate::{
    dispatch,
    error::{Error, FormatError, ProtocolError, Result},
    parser::{Effect, Parser, State},
    report::{Reporter, Stats},
    timing::timed,
    vector::Context,
    verify::verify,
    Config,
};

/// Owns the live curve and test case, the parser and the statistics.
pub struct App<A: Accelerator, W: Write> {
    accelerator: A,
    parser: Parser,
    context: Context,
    reporter: Reporter<W>,
}

impl<A: Accelerator, W: Write> App<A, W> {
    pub fn new(accelerator: A, out: W, config: &Config) -> Self {
        Self {
            accelerator,
            parser: Parser::new(),
            context: Context::default(),
            reporter: Reporter::new(out, config.progress_every),
        }
    }

    /// Reads `input` to its end, running every test case on the way.
    ///
    /// Stops on the first fatal error; mismatches are only counted.
    pub fn run<R: BufRead>(&mut self, mut input: R) -> Result<Stats> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if input.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            let text = core::str::from_utf8(&line).map_err(|_| Error::Format {
                line: self.parser.line() + 1,
                state: self.parser.state(),
                reason: FormatError::Encoding,
            })?;
            self.process_line(text)?;
        }

        if self.parser.state() != State::Idle {
            warn!(state = ?self.parser.state(), line = self.parser.line(), "input ends inside a block");
        }
        Ok(self.stats())
    }

    pub fn process_line(&mut self, line: &str) -> Result<()> {
        match self.parser.feed(line, &mut self.context)? {
            Some(Effect::InstallCurve) => self.install_curve(),
            Some(Effect::RunTest) => self.run_test(),
            None => Ok(()),
        }
    }

    fn install_curve(&mut self) -> Result<()> {
        let line = self.parser.line();
        let protocol = |source| Error::Protocol { line, source };

        let curve = &mut self.context.curve;
        let params = curve
            .params()
            .ok_or_else(|| protocol(ProtocolError::IncompleteCurve(curve.id)))?;
        let accelerator = &mut self.accelerator;
        timed("installing curve", || accelerator.set_curve(&params)).map_err(|source| {
            protocol(ProtocolError::Driver {
                call: "set_curve",
                source,
            })
        })?;
        curve.installed = true;
        info!(curve = curve.id, nn = curve.nn, "curve installed");
        Ok(())
    }

    fn run_test(&mut self) -> Result<()> {
        let line = self.parser.line();
        dispatch::run(&mut self.accelerator, &mut self.context)
            .map_err(|source| Error::Protocol { line, source })?;

        let Context { curve, case } = &mut self.context;
        let verdict = match (&case.expected, &case.hardware) {
            (Some(expected), Some(hardware)) => verify(expected, hardware),
            _ => {
                return Err(Error::Protocol {
                    line,
                    source: ProtocolError::MissingExpected,
                })
            }
        };
        debug!(curve = curve.id, test = case.id, op = %case.op, ok = verdict.is_ok(), "verified");
        self.reporter.record(curve.id, case, verdict)?;
        case.clear();
        Ok(())
    }

    /// Prints the summary for a batch stopped by `error`.
    pub fn report_fatal(&mut self, error: &Error) -> io::Result<()> {
        let (curve, test) = (self.context.curve.id, self.context.case.id);
        error!(curve, test, line = ?error.line(), "{}", error);
        self.reporter.fatal(curve, test, error)
    }

    /// Prints the summary at the end of the input.
    pub fn finish(&mut self) -> io::Result<()> {
        self.reporter.finish()
    }

    pub fn stats(&self) -> Stats {
        self.reporter.stats()
    }

    pub fn accelerator(&self) -> &A {
        &self.accelerator
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn into_output(self) -> W {
        self.reporter.into_inner()
    }
}
