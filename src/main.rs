mod cli;

use clap::{Parser, Subcommand};

use cli::assemble::AssembleArgs;
use cli::build::BuildArgs;
use cli::check::CheckArgs;
use cli::compile::CompileArgs;
use cli::translate::TranslateArgs;

#[derive(Parser)]
#[command(
    name = "hackc",
    version,
    about = "Hack platform toolchain — Jack compiler, VM translator, assembler"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile .jack source to VM code
    Compile(CompileArgs),
    /// Translate VM code to Hack assembly
    Translate(TranslateArgs),
    /// Assemble Hack assembly to machine code
    Assemble(AssembleArgs),
    /// Run the whole pipeline: .jack source to machine code
    Build(BuildArgs),
    /// Parse and symbol-check .jack source without emitting code
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile(args) => cli::compile::cmd_compile(args),
        Command::Translate(args) => cli::translate::cmd_translate(args),
        Command::Assemble(args) => cli::assemble::cmd_assemble(args),
        Command::Build(args) => cli::build::cmd_build(args),
        Command::Check(args) => cli::check::cmd_check(args),
    }
}
