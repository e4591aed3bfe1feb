use std::path::PathBuf;
use std::process;

use clap::Args;

use hackc::{LabelCounter, Translator};

use super::{default_output, read_source, resolve_sources, unit_base, write_lines};

#[derive(Args)]
pub struct BuildArgs {
    /// Input .jack file or directory of .jack files
    pub input: PathBuf,
    /// Output .hack file (default: <input>.hack)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Annotate the intermediate assembly with `// <command>` lines
    #[arg(long)]
    pub comments: bool,
    /// Emit the bootstrap preamble (SP = 256; call Sys.init 0)
    #[arg(long)]
    pub bootstrap: bool,
}

/// Run the whole pipeline in memory: Jack source → VM commands →
/// assembly → machine code. Only the final .hack file is written.
pub fn cmd_build(args: BuildArgs) {
    let files = resolve_sources(&args.input, "jack");

    let mut labels = LabelCounter::new();
    let mut translator = Translator::new(args.comments);
    if args.bootstrap {
        translator.bootstrap();
    }

    for path in &files {
        let source = read_source(path);
        let filename = path.to_string_lossy().to_string();
        let commands = match hackc::compile_source(&source, &filename, &mut labels) {
            Ok(commands) => commands,
            Err(_) => process::exit(1),
        };
        translator.unit(&unit_base(path), &commands);
    }

    let assembly = translator.finish();
    let assembly_text = assembly.join("\n");
    let words = match hackc::assemble_source(&assembly_text, "<generated>") {
        Ok(words) => words,
        Err(_) => process::exit(1),
    };

    let out_path = args
        .output
        .unwrap_or_else(|| default_output(&args.input, "hack"));
    write_lines(&out_path, &words);
    eprintln!("Built -> {}", out_path.display());
}
