use std::path::PathBuf;
use std::process;

use clap::Args;

use super::{read_source, write_lines};

#[derive(Args)]
pub struct AssembleArgs {
    /// Input .asm file
    pub input: PathBuf,
    /// Output .hack file (default: <input>.hack)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn cmd_assemble(args: AssembleArgs) {
    if !args.input.extension().is_some_and(|e| e == "asm") {
        eprintln!("error: input must be a .asm file");
        process::exit(1);
    }

    let source = read_source(&args.input);
    let filename = args.input.to_string_lossy().to_string();
    let words = match hackc::assemble_source(&source, &filename) {
        Ok(words) => words,
        Err(_) => process::exit(1),
    };

    let out_path = args
        .output
        .unwrap_or_else(|| args.input.with_extension("hack"));
    write_lines(&out_path, &words);
    eprintln!("Assembled -> {}", out_path.display());
}
