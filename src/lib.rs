//! # ecc-conformance
//!
//! Runs elliptic-curve test vectors on an accelerator and checks its
//! answers.
//!
//! A vector stream defines curves (`== NEW CURVE`) and test cases
//! (`== TEST`) on the latest curve. Each curve is installed in hardware once
//! complete, each test case is run as soon as its expected result is read,
//! and the hardware result is compared with it. Malformed input and failed
//! driver calls stop the batch; mismatches are counted and reported.

pub use driver;

pub mod app;
pub use app::App;

pub mod codec;
pub use codec::LargeNumber;

pub mod dispatch;

pub mod error;
pub use error::{Error, FormatError, ProtocolError, Result};

pub mod io;

pub mod parser;
pub use parser::{Effect, Parser, State};

pub mod report;
pub use report::{Reporter, Stats};

pub mod testing;

pub mod timing;
pub use timing::{always_timed, timed};

pub mod vector;
pub use vector::{Context, Curve, Operation, Outcome, Point, TestCase};

pub mod verify;
pub use verify::{verify, Mismatch};

pub use driver::Null as Backend;

/// Progress is printed every that many test cases by default.
pub const DEFAULT_PROGRESS_EVERY: u64 = 1000;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// print a progress line every that many test cases, 0 for never
    pub progress_every: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// The accelerator the binary runs on.
pub fn backend() -> driver::Result<Backend> {
    Ok(Backend::new())
}
