use std::path::PathBuf;
use std::process;

use clap::Args;

use hackc::vm::parse::parse_unit;
use hackc::Translator;

use super::{default_output, read_source, resolve_sources, unit_base, write_lines};

#[derive(Args)]
pub struct TranslateArgs {
    /// Input .vm file or directory of .vm files
    pub input: PathBuf,
    /// Output .asm file (default: <input>.asm)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Annotate the output with `// <command>` lines
    #[arg(long)]
    pub comments: bool,
    /// Emit the bootstrap preamble (SP = 256; call Sys.init 0)
    #[arg(long)]
    pub bootstrap: bool,
}

pub fn cmd_translate(args: TranslateArgs) {
    let files = resolve_sources(&args.input, "vm");

    let mut translator = Translator::new(args.comments);
    if args.bootstrap {
        translator.bootstrap();
    }

    for path in &files {
        let source = read_source(path);
        let commands = match parse_unit(&source) {
            Ok(commands) => commands,
            Err(error) => {
                error.render(&path.to_string_lossy(), &source);
                process::exit(1);
            }
        };
        translator.unit(&unit_base(path), &commands);
    }

    let out_path = args
        .output
        .unwrap_or_else(|| default_output(&args.input, "asm"));
    write_lines(&out_path, &translator.finish());
    eprintln!("Translated -> {}", out_path.display());
}
