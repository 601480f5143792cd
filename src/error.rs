use thiserror::Error;

use crate::{codec, parser::State, vector::Operation};

/// Fatal errors: any of these stops the batch.
///
/// Mismatches between hardware and expected results are not errors, see
/// [`crate::verify::Mismatch`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}: {reason} (in state {state:?})")]
    Format {
        line: usize,
        state: State,
        reason: FormatError,
    },
    #[error("line {line}: {source}")]
    Protocol {
        line: usize,
        #[source]
        source: ProtocolError,
    },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Format { line, .. } | Error::Protocol { line, .. } => Some(*line),
            Error::Io(_) => None,
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Malformed input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unexpected line {0:?}, expected {1}")]
    Unexpected(String, &'static str),
    #[error("invalid decimal number {0:?}")]
    Decimal(String),
    #[error("line is not valid UTF-8")]
    Encoding,
    #[error("curve width must be positive")]
    ZeroWidth,
    #[error("bad hex value for {field}: {source}")]
    Hex {
        field: &'static str,
        #[source]
        source: codec::Error,
    },
}

/// The test cannot be run as requested, or the accelerator failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("no curve installed in hardware")]
    CurveNotInstalled,
    #[error("curve #{0} is incomplete")]
    IncompleteCurve(u32),
    #[error("input {0} not set")]
    MissingInput(&'static str),
    #[error("{name} is {len} bytes, larger than the {max} bytes of the installed curve")]
    Oversized {
        name: &'static str,
        len: usize,
        max: usize,
    },
    #[error("missing expected result")]
    MissingExpected,
    #[error("operation mismatch: test is {found}, dispatched as {expected}")]
    OperationMismatch {
        expected: Operation,
        found: Operation,
    },
    #[error("driver call `{call}` failed: {source}")]
    Driver {
        call: &'static str,
        #[source]
        source: driver::Error,
    },
}
