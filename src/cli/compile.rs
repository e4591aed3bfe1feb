use std::path::PathBuf;
use std::process;

use clap::Args;

use hackc::LabelCounter;

use super::{read_source, resolve_sources, unit_base, write_lines};

#[derive(Args)]
pub struct CompileArgs {
    /// Input .jack file or directory of .jack files
    pub input: PathBuf,
    /// Output directory for .vm files (default: next to each source)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn cmd_compile(args: CompileArgs) {
    let files = resolve_sources(&args.input, "jack");

    // one label counter for the whole run keeps labels globally unique
    let mut labels = LabelCounter::new();
    for path in files {
        let source = read_source(&path);
        let filename = path.to_string_lossy().to_string();
        let commands = match hackc::compile_source(&source, &filename, &mut labels) {
            Ok(commands) => commands,
            Err(_) => process::exit(1),
        };

        let out_path = match &args.output {
            Some(dir) => dir.join(format!("{}.vm", unit_base(&path))),
            None => path.with_extension("vm"),
        };
        let lines: Vec<String> = commands.iter().map(|c| c.to_string()).collect();
        write_lines(&out_path, &lines);
        eprintln!("Compiled -> {}", out_path.display());
    }
}
