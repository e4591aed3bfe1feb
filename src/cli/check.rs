use std::path::PathBuf;
use std::process;

use clap::Args;

use hackc::LabelCounter;

use super::{read_source, resolve_sources};

#[derive(Args)]
pub struct CheckArgs {
    /// Input .jack file or directory of .jack files
    pub input: PathBuf,
}

/// Parse and symbol-check without writing any output.
pub fn cmd_check(args: CheckArgs) {
    let files = resolve_sources(&args.input, "jack");

    let mut labels = LabelCounter::new();
    for path in &files {
        let source = read_source(path);
        let filename = path.to_string_lossy().to_string();
        if hackc::compile_source(&source, &filename, &mut labels).is_err() {
            process::exit(1);
        }
        eprintln!("{}: OK", path.display());
    }
}
