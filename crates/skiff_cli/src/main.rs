//! skiff: The skiff language CLI.
//!
//! Usage:
//!   skiff [options] [file...]
//!
//! With files, all inputs are compiled as one program and evaluated.
//! Without files, an interactive REPL starts; submissions chain so later
//! input sees earlier declarations.

use clap::Parser as ClapParser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use skiff_compiler::Compilation;
use skiff_core::SourceText;
use skiff_diagnostics::Diagnostic;
use skiff_eval::Variables;
use skiff_symbols::{
    HostRegistry, HostSignature, ImportedClassSymbol, ImportedFunctionSymbol, PackageSymbol,
    TypeSymbol, Value,
};
use skiff_syntax::SyntaxTree;

#[derive(ClapParser, Debug)]
#[command(name = "skiff", about = "skiff - A small imperative language", disable_version_flag = true)]
struct Cli {
    /// Source files to compile and run as one program.
    #[arg(value_name = "FILE")]
    files: Vec<String>,

    /// Write a placeholder binary artifact instead of evaluating.
    #[arg(long = "emit", value_name = "PATH")]
    emit: Option<PathBuf>,

    /// Also write the control flow graph in Graphviz format.
    #[arg(long = "cfg", value_name = "PATH")]
    cfg: Option<PathBuf>,

    /// Pretty-print the lowered program before running.
    #[arg(long = "show-program")]
    show_program: bool,

    /// Print diagnostics as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Print the version.
    #[arg(short = 'v', long)]
    version: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const MAGENTA: &str = "\x1b[35m";
const GRAY: &str = "\x1b[90m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    let cli = Cli::parse();

    if cli.version {
        println!("skiff {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let exit_code = if cli.files.is_empty() {
        run_repl(&cli)
    } else {
        run_compile(&cli)
    };
    process::exit(exit_code);
}

// ============================================================================
// Batch mode
// ============================================================================

fn run_compile(cli: &Cli) -> i32 {
    let mut trees = Vec::new();
    for file in &cli.files {
        let text = match std::fs::read_to_string(file) {
            Ok(text) => text,
            Err(error) => {
                print_error(&format!("failed to read '{}': {}", file, error));
                return 1;
            }
        };
        trees.push(SyntaxTree::parse_with_file(text, file.clone()));
    }

    let compilation = Compilation::with_host(default_host(), trees);

    if let Some(path) = &cli.cfg {
        if let Err(error) = write_cfg(&compilation, path) {
            print_error(&format!("failed to write '{}': {}", path.display(), error));
            return 1;
        }
    }

    if cli.show_program {
        let stdout = io::stdout();
        let _ = compilation.write_program(&mut stdout.lock());
    }

    if let Some(path) = &cli.emit {
        return run_emit(cli, &compilation, path);
    }

    let mut variables = Variables::default();
    match compilation.evaluate(&mut variables) {
        Ok(result) => {
            if result.diagnostics.is_empty() {
                if let Some(value) = result.value {
                    println!("{}", value);
                }
                0
            } else {
                print_diagnostics(&result.diagnostics, compilation.syntax_trees(), cli.json);
                2
            }
        }
        Err(fault) => {
            print_error(&fault.to_string());
            1
        }
    }
}

fn run_emit(cli: &Cli, compilation: &Compilation, path: &Path) -> i32 {
    match compilation.emit(path) {
        Ok(result) => {
            if result.success {
                if is_terminal(2) {
                    eprintln!("{}Wrote {}.{}", GRAY, path.display(), RESET);
                }
                0
            } else {
                print_diagnostics(&result.diagnostics, compilation.syntax_trees(), cli.json);
                2
            }
        }
        Err(error) => {
            print_error(&format!("failed to write '{}': {}", path.display(), error));
            1
        }
    }
}

fn write_cfg(compilation: &Compilation, path: &Path) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    compilation.write_control_flow_graph(&mut file)
}

// ============================================================================
// REPL
// ============================================================================

fn run_repl(cli: &Cli) -> i32 {
    if cli.emit.is_some() || cli.cfg.is_some() || cli.json {
        print_error("--emit, --cfg and --json require input files.");
        return 1;
    }

    let host = default_host();
    let color = is_terminal(1);
    let mut previous: Option<Arc<Compilation>> = None;
    let mut variables = Variables::default();
    let mut show_program = cli.show_program;
    let mut buffer = String::new();

    println!(
        "skiff {} (#quit to exit, #reset to start over, #show to toggle the lowered program)",
        env!("CARGO_PKG_VERSION")
    );

    let stdin = io::stdin();
    loop {
        let prompt = if buffer.is_empty() { "» " } else { "· " };
        if color {
            print!("{}{}{}", CYAN, prompt, RESET);
        } else {
            print!("{}", prompt);
        }
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => return 0,
            Ok(_) => {}
            Err(error) => {
                print_error(&format!("failed to read input: {}", error));
                return 1;
            }
        }

        if buffer.is_empty() {
            let command = line.trim();
            if command.starts_with('#') {
                match command {
                    "#quit" => return 0,
                    "#reset" => {
                        previous = None;
                        variables.clear();
                        continue;
                    }
                    "#show" => {
                        show_program = !show_program;
                        println!(
                            "{}",
                            if show_program {
                                "showing the lowered program"
                            } else {
                                "hiding the lowered program"
                            }
                        );
                        continue;
                    }
                    _ => {
                        print_error(&format!("unknown command '{}'", command));
                        continue;
                    }
                }
            }
        }

        buffer.push_str(&line);
        if !is_complete_submission(&buffer) {
            continue;
        }
        let text = std::mem::take(&mut buffer);
        if text.trim().is_empty() {
            continue;
        }

        let tree = SyntaxTree::parse(text);
        let compilation = match &previous {
            Some(previous) => Compilation::continue_with(Arc::clone(previous), vec![tree]),
            None => Compilation::with_host(host.clone(), vec![tree]),
        };

        if show_program {
            let stdout = io::stdout();
            let _ = compilation.write_program(&mut stdout.lock());
        }

        match compilation.evaluate(&mut variables) {
            Ok(result) => {
                if result.diagnostics.is_empty() {
                    if let Some(value) = result.value {
                        if color {
                            println!("{}{}{}", MAGENTA, value, RESET);
                        } else {
                            println!("{}", value);
                        }
                    }
                    // Only successful submissions join the chain.
                    previous = Some(Arc::new(compilation));
                } else {
                    print_diagnostics(&result.diagnostics, compilation.syntax_trees(), false);
                }
            }
            Err(fault) => print_error(&fault.to_string()),
        }
    }
}

/// A submission is complete when parsing it produces no error at the very
/// end of the input; an error there means more lines may still fix it.
/// A trailing blank line forces submission.
fn is_complete_submission(text: &str) -> bool {
    if text.trim().is_empty() {
        return true;
    }
    if text.ends_with("\n\n") || text.ends_with("\r\n\r\n") {
        return true;
    }
    let tree = SyntaxTree::parse(text);
    let end = tree.source().len();
    !tree
        .diagnostics()
        .iter()
        .any(|diagnostic| diagnostic.span.end() >= end)
}

// ============================================================================
// Default host packages
// ============================================================================

/// The packages every CLI compilation can `import`: integer helpers in
/// `math` and text helpers in `strings`.
fn default_host() -> HostRegistry {
    let mut host = HostRegistry::new();
    host.register_package(PackageSymbol::new(
        "math",
        vec![
            ImportedFunctionSymbol::new(
                "abs",
                vec![HostSignature::new(
                    vec![TypeSymbol::Int],
                    TypeSymbol::Int,
                    |arguments| Value::Int(int_argument(arguments, 0).wrapping_abs()),
                )],
            ),
            ImportedFunctionSymbol::new(
                "min",
                vec![HostSignature::new(
                    vec![TypeSymbol::Int, TypeSymbol::Int],
                    TypeSymbol::Int,
                    |arguments| {
                        Value::Int(int_argument(arguments, 0).min(int_argument(arguments, 1)))
                    },
                )],
            ),
            ImportedFunctionSymbol::new(
                "max",
                vec![HostSignature::new(
                    vec![TypeSymbol::Int, TypeSymbol::Int],
                    TypeSymbol::Int,
                    |arguments| {
                        Value::Int(int_argument(arguments, 0).max(int_argument(arguments, 1)))
                    },
                )],
            ),
        ],
        Vec::new(),
    ));
    host.register_package(PackageSymbol::new(
        "strings",
        vec![
            ImportedFunctionSymbol::new(
                "upper",
                vec![HostSignature::new(
                    vec![TypeSymbol::String],
                    TypeSymbol::String,
                    |arguments| Value::from(string_argument(arguments, 0).to_uppercase()),
                )],
            ),
            ImportedFunctionSymbol::new(
                "lower",
                vec![HostSignature::new(
                    vec![TypeSymbol::String],
                    TypeSymbol::String,
                    |arguments| Value::from(string_argument(arguments, 0).to_lowercase()),
                )],
            ),
            ImportedFunctionSymbol::new(
                "repeat",
                vec![HostSignature::new(
                    vec![TypeSymbol::String, TypeSymbol::Int],
                    TypeSymbol::String,
                    |arguments| {
                        let count = int_argument(arguments, 1).max(0) as usize;
                        Value::from(string_argument(arguments, 0).repeat(count))
                    },
                )],
            ),
        ],
        // Classes are part of the registry model but not reachable
        // through `pkg.member(...)` calls.
        vec![ImportedClassSymbol::new(
            "builder",
            vec![ImportedFunctionSymbol::new(
                "create",
                vec![HostSignature::new(Vec::new(), TypeSymbol::String, |_| {
                    Value::from("")
                })],
            )],
        )],
    ));
    host
}

fn int_argument(arguments: &[Value], index: usize) -> i64 {
    arguments.get(index).and_then(Value::as_int).unwrap_or(0)
}

fn string_argument(arguments: &[Value], index: usize) -> &str {
    arguments.get(index).and_then(Value::as_string).unwrap_or("")
}

// ============================================================================
// Diagnostic rendering
// ============================================================================

fn print_diagnostics(diagnostics: &[Diagnostic], trees: &[SyntaxTree], json: bool) {
    if json {
        match serde_json::to_string_pretty(diagnostics) {
            Ok(text) => println!("{}", text),
            Err(error) => print_error(&format!("failed to serialize diagnostics: {}", error)),
        }
        return;
    }

    let use_color = is_terminal(2);
    for diagnostic in diagnostics {
        print_diagnostic(diagnostic, source_for(diagnostic, trees), use_color);
    }

    let count = diagnostics.len();
    if use_color {
        eprintln!(
            "{}Found {} error{}.{}",
            RED,
            count,
            if count == 1 { "" } else { "s" },
            RESET
        );
    } else {
        eprintln!("Found {} error{}.", count, if count == 1 { "" } else { "s" });
    }
}

/// The source a diagnostic points into. Named diagnostics match by file;
/// unnamed ones come from the only tree a REPL submission has.
fn source_for<'a>(diagnostic: &Diagnostic, trees: &'a [SyntaxTree]) -> Option<&'a Arc<SourceText>> {
    match &diagnostic.file {
        Some(file) => trees
            .iter()
            .map(|tree| tree.source())
            .find(|source| source.file_name() == Some(file.as_str())),
        None => trees.first().map(|tree| tree.source()),
    }
}

/// Print one diagnostic with a caret excerpt of the offending line.
fn print_diagnostic(diagnostic: &Diagnostic, source: Option<&Arc<SourceText>>, use_color: bool) {
    let Some(source) = source else {
        eprintln!("{}", diagnostic);
        return;
    };

    let position = source.line_and_column_of(diagnostic.span.start);
    let prefix = match source.file_name() {
        Some(file) => format!("{}({},{})", file, position.line + 1, position.column + 1),
        None => format!("({},{})", position.line + 1, position.column + 1),
    };
    if use_color {
        eprintln!(
            "{}{}{}: {}{}error{} {}SK{}{}: {}",
            CYAN,
            prefix,
            RESET,
            BOLD,
            RED,
            RESET,
            CYAN,
            diagnostic.code,
            RESET,
            diagnostic.message_text
        );
    } else {
        eprintln!(
            "{}: error SK{}: {}",
            prefix, diagnostic.code, diagnostic.message_text
        );
    }

    let line_span = source.line_span(position.line);
    let line_text = source.line_text(position.line);
    if line_text.is_empty() {
        return;
    }

    // Clamp the caret run to the reported line.
    let start = diagnostic.span.start.max(line_span.start);
    let end = diagnostic.span.end().min(line_span.end()).max(start);
    let pad = " ".repeat((start - line_span.start) as usize);
    let carets = "^".repeat(((end - start) as usize).max(1));
    eprintln!("    {}", line_text);
    if use_color {
        eprintln!("    {}{}{}{}", pad, RED, carets, RESET);
    } else {
        eprintln!("    {}{}", pad, carets);
    }
}

fn print_error(msg: &str) {
    if is_terminal(2) {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn is_terminal(fd: i32) -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(fd) != 0 }
    }
    #[cfg(not(unix))]
    {
        let _ = fd;
        true
    }
}
