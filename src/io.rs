//! Opening the test-vector stream.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use tracing::debug;

/// Reads from `path`, or from standard input without one.
pub fn open(path: Option<&Path>) -> io::Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "reading test vectors");
            Ok(Box::new(BufReader::new(File::open(path)?)))
        }
        None => {
            debug!("reading test vectors from standard input");
            Ok(Box::new(BufReader::new(io::stdin())))
        }
    }
}
