use boot_transpiler::{CompileError, Options, Pipeline};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

const SOURCE_SUFFIX: &str = ".boot.html";

#[derive(Parser)]
#[command(name = "boot")]
#[command(about = "Boot - compile grid and resource shorthands to plain HTML")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile .boot.html files to .html
    Compile {
        /// Path to .boot.html file or directory
        #[arg(required_unless_present = "stdin")]
        path: Option<PathBuf>,

        /// Read from stdin, write to stdout
        #[arg(long)]
        stdin: bool,

        #[command(flatten)]
        flags: CompileFlags,
    },
    /// Print the token stream as JSON
    Tokens {
        /// Path to .boot.html file
        #[arg(required_unless_present = "stdin")]
        path: Option<PathBuf>,

        /// Read from stdin
        #[arg(long)]
        stdin: bool,

        /// Decode character references while tokenizing
        #[arg(long)]
        decode_entities: bool,
    },
}

#[derive(Args)]
struct CompileFlags {
    /// Decode character references on input and escape on output
    #[arg(long)]
    decode_entities: bool,

    /// Leave grid tags and attributes untouched
    #[arg(long)]
    no_grid: bool,

    /// Leave <js>/<css> blocks untouched
    #[arg(long)]
    no_resources: bool,
}

impl CompileFlags {
    fn options(&self) -> Options {
        Options {
            preserve_character_references: !self.decode_entities,
            grid: !self.no_grid,
            resource_shorthands: !self.no_resources,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Compile { path, stdin, flags } => {
            let pipeline = Pipeline::new(flags.options());
            if stdin {
                compile_stdin(&pipeline);
            } else if let Some(path) = path {
                compile_path(&pipeline, &path);
            } else {
                eprintln!("Error: provide a file/directory or use --stdin");
                std::process::exit(1);
            }
        }
        Commands::Tokens {
            path,
            stdin,
            decode_entities,
        } => {
            let pipeline = Pipeline::new(Options {
                preserve_character_references: !decode_entities,
                ..Options::default()
            });
            let (source, filename) = if stdin {
                (read_stdin(), "<stdin>".to_string())
            } else if let Some(path) = path {
                (read_source(&path), path.display().to_string())
            } else {
                eprintln!("Error: provide a file or use --stdin");
                std::process::exit(1);
            };
            match pipeline.tokens(&source) {
                Ok(tokens) => match serde_json::to_string_pretty(&tokens) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        std::process::exit(1);
                    }
                },
                Err(e) => fail(&e, &source, &filename),
            }
        }
    }
}

/// Default to warnings; each -v raises the level and RUST_LOG wins over both
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn compile_stdin(pipeline: &Pipeline) {
    let source = read_stdin();
    match pipeline.compile(&source) {
        Ok(html) => print!("{}", html),
        Err(e) => fail(&e, &source, "<stdin>"),
    }
}

fn compile_path(pipeline: &Pipeline, path: &Path) {
    if path.is_file() {
        if !is_boot_source(path) {
            eprintln!("Error: {} is not a {} file", path.display(), SOURCE_SUFFIX);
            std::process::exit(1);
        }
        let start = Instant::now();
        if !compile_file(pipeline, path) {
            std::process::exit(1);
        }
        print_summary(1, start.elapsed());
    } else if path.is_dir() {
        compile_directory(pipeline, path);
    } else {
        eprintln!("Error: {} does not exist", path.display());
        std::process::exit(1);
    }
}

fn compile_directory(pipeline: &Pipeline, dir: &Path) {
    let start = Instant::now();
    let mut file_count = 0;
    let mut failed = 0;

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_boot_source(e.path()))
    {
        if compile_file(pipeline, entry.path()) {
            file_count += 1;
        } else {
            failed += 1;
        }
    }

    if file_count == 0 && failed == 0 {
        eprintln!("No {} files found in {}", SOURCE_SUFFIX, dir.display());
        std::process::exit(1);
    }

    print_summary(file_count, start.elapsed());
    if failed > 0 {
        std::process::exit(1);
    }
}

/// Compile one file next to itself; errors are reported, not fatal
fn compile_file(pipeline: &Pipeline, path: &Path) -> bool {
    let filename = path.display().to_string();
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(source) => {
            let err = CompileError::Io {
                path: path.to_path_buf(),
                source,
            };
            print_error(&err, "", &filename);
            return false;
        }
    };

    let html = match pipeline.compile(&source) {
        Ok(html) => html,
        Err(e) => {
            print_error(&e, &source, &filename);
            return false;
        }
    };

    let output = output_path(path);
    if let Err(source) = fs::write(&output, html) {
        eprintln!("Error: failed to write {}: {}", output.display(), source);
        return false;
    }
    print_generated(&output.display().to_string());
    true
}

fn is_boot_source(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.len() > SOURCE_SUFFIX.len() && name.ends_with(SOURCE_SUFFIX))
}

/// `page.boot.html` -> `page.html`
fn output_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    let stem = name.strip_suffix(SOURCE_SUFFIX).unwrap_or(name);
    path.with_file_name(format!("{}.html", stem))
}

fn read_stdin() -> String {
    let mut source = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut source) {
        eprintln!("Error: failed to read stdin: {}", e);
        std::process::exit(1);
    }
    source
}

fn read_source(path: &Path) -> String {
    match fs::read_to_string(path) {
        Ok(source) => source,
        Err(source) => {
            let err = CompileError::Io {
                path: path.to_path_buf(),
                source,
            };
            fail(&err, "", &path.display().to_string())
        }
    }
}

fn fail(err: &CompileError, source: &str, filename: &str) -> ! {
    print_error(err, source, filename);
    std::process::exit(1);
}

fn print_error(err: &CompileError, source: &str, filename: &str) {
    if io::stderr().is_terminal() {
        eprint!("{}", err.render_color(source, filename));
    } else {
        eprint!("{}", err.render(source, filename));
    }
}

fn print_generated(path: &str) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(count: usize, elapsed: std::time::Duration) {
    let is_tty = io::stderr().is_terminal();
    let time_str = format_duration(elapsed);
    let files_word = if count == 1 { "file" } else { "files" };

    if is_tty {
        eprintln!("\n\x1b[1m✨ Compiled {} {} in {}\x1b[0m", count, files_word, time_str);
    } else {
        eprintln!("\n✨ Compiled {} {} in {}", count, files_word, time_str);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
