//! Arguments of the conformance runner.

use std::path::PathBuf;

#[derive(argh::FromArgs)]
/// Run elliptic-curve test vectors on the accelerator
pub struct Args {
    /// file of test vectors, standard input if absent
    #[argh(positional)]
    pub input: Option<PathBuf>,

    /// print progress every that many test cases, 0 for never
    #[argh(option, default = "ecc_conformance::DEFAULT_PROGRESS_EVERY")]
    pub progress_every: u64,

    /// verbose output
    #[argh(switch, short = 'v')]
    pub verbose: bool,
}

impl From<&Args> for ecc_conformance::Config {
    fn from(args: &Args) -> Self {
        Self {
            progress_every: args.progress_every,
        }
    }
}
