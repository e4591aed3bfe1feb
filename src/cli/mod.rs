pub mod assemble;
pub mod build;
pub mod check;
pub mod compile;
pub mod translate;

use std::path::{Path, PathBuf};
use std::process;

/// Resolve an input path to the list of source files with the given
/// extension (one file, or every match in a directory, sorted), exiting
/// on error.
pub fn resolve_sources(input: &Path, extension: &str) -> Vec<PathBuf> {
    if input.is_dir() {
        let files = collect_files(input, extension);
        if files.is_empty() {
            eprintln!(
                "error: no .{} files in '{}'",
                extension,
                input.display()
            );
            process::exit(1);
        }
        return files;
    }

    if !input.extension().is_some_and(|e| e == extension) {
        eprintln!(
            "error: input must be a .{} file or a directory",
            extension
        );
        process::exit(1);
    }
    vec![input.to_path_buf()]
}

fn collect_files(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", dir.display(), e);
            process::exit(1);
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|e| e == extension))
        .collect();
    files.sort();
    files
}

/// A unit's base name — the file stem that namespaces its statics.
pub fn unit_base(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("out")
        .to_string()
}

/// Default output path: `<stem>.<extension>` next to the input, or
/// `<dir>/<dirname>.<extension>` for a directory input.
pub fn default_output(input: &Path, extension: &str) -> PathBuf {
    if input.is_dir() {
        input.join(format!("{}.{}", unit_base(input), extension))
    } else {
        input.with_extension(extension)
    }
}

pub fn read_source(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

pub fn write_lines(path: &Path, lines: &[String]) {
    let mut text = lines.join("\n");
    text.push('\n');
    if let Err(e) = std::fs::write(path, text) {
        eprintln!("error: cannot write '{}': {}", path.display(), e);
        process::exit(1);
    }
}
