use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use yapl_ast::Program;
use yapl_diags::Diagnostics;
use yapl_semant::{Analysis, CheckerConfig, SymbolTableBuilder, TypeChecker};
use yapl_tree::{DotWriter, TreePrinter};

#[derive(Parser)]
#[command(name = "yaplc")]
#[command(about = "Semantic checker for the YAPL teaching language", long_about = None)]
struct Cli {
    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and type-check a YAPL source file
    Check {
        /// The YAPL source file to check
        file: PathBuf,
        /// Give composite expressions the type synthesized from their operands
        #[arg(long)]
        propagate_types: bool,
        /// Also compare attribute and let initializers against their declared type
        #[arg(long)]
        check_initializers: bool,
        /// Exit with a failure status when type errors are found
        #[arg(long)]
        deny_type_errors: bool,
        /// Print one line per diagnostic instead of rich reports
        #[arg(long)]
        plain: bool,
    },
    /// Print the syntax tree of a YAPL source file
    Tree {
        /// The YAPL source file to print
        file: PathBuf,
        /// Also write the tree as a Graphviz DOT file
        #[arg(long, value_name = "PATH")]
        dot: Option<PathBuf>,
    },
    /// Print the attribute tables built from a YAPL source file
    Symbols {
        /// The YAPL source file to inspect
        file: PathBuf,
    },
}

/// Parser and checker output for one source file.
struct Session {
    filename: String,
    source: String,
    program: Program,
    syntax: Diagnostics,
    syntax_errors: usize,
    analysis: Analysis,
}

impl Session {
    fn has_syntax_errors(&self) -> bool {
        self.syntax_errors > 0
    }

    fn emit_plain(&self) {
        for diagnostic in self.syntax.iter().chain(self.analysis.diagnostics.iter()) {
            println!("{}", diagnostic);
        }
    }

    fn emit_rich(&self) -> Result<()> {
        for diagnostic in self.syntax.iter().chain(self.analysis.diagnostics.iter()) {
            diagnostic
                .report(&self.filename, &self.source)
                .with_context(|| "Failed to render diagnostic")?;
        }
        Ok(())
    }
}

fn main() {
    match run() {
        Ok(0) => {}
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose, !cli.no_color)?;

    match cli.command {
        Commands::Check {
            file,
            propagate_types,
            check_initializers,
            deny_type_errors,
            plain,
        } => {
            let config = CheckerConfig {
                propagate_composite_types: propagate_types,
                check_initializers,
            };
            check_command(&file, config, deny_type_errors, plain)
        }
        Commands::Tree { file, dot } => tree_command(&file, dot.as_deref()),
        Commands::Symbols { file } => symbols_command(&file),
    }
}

fn init_logging(verbosity: u8, colors: bool) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    simple_logger::SimpleLogger::new()
        .with_level(level)
        .with_colors(colors)
        .env()
        .init()
        .with_context(|| "Failed to initialize logger")
}

fn analyze(file: &Path, config: CheckerConfig) -> Result<Session> {
    validate_yapl_file(file)?;

    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    let filename = file.display().to_string();

    log::info!("parsing {}", filename);
    let mut syntax = Diagnostics::new();
    let mut parser = yapl_parser::Parser::new(&source);
    let program = parser.parse(&mut syntax);
    let syntax_errors = parser.number_of_syntax_errors();

    // The checker runs over partial trees too; only tree consumers are gated.
    log::info!("type checking {}", filename);
    let analysis = TypeChecker::new().with_config(config).check_program(&program);

    Ok(Session {
        filename,
        source,
        program,
        syntax,
        syntax_errors,
        analysis,
    })
}

fn check_command(file: &Path, config: CheckerConfig, deny_type_errors: bool, plain: bool) -> Result<i32> {
    println!("{} {}", "Checking".green().bold(), file.display());

    let session = analyze(file, config)?;
    if plain {
        session.emit_plain();
    } else {
        session.emit_rich()?;
    }

    let mismatches = session.analysis.mismatch_count();
    let unrecognized = session.analysis.unrecognized_count();

    if session.syntax_errors == 0 && mismatches == 0 && unrecognized == 0 {
        println!("{} No errors found", "✓".green().bold());
        return Ok(0);
    }

    println!(
        "{} {} syntax error(s), {} type error(s), {} unrecognized node(s)",
        "✗".red().bold(),
        session.syntax_errors,
        mismatches,
        unrecognized
    );

    if session.has_syntax_errors() || (deny_type_errors && mismatches + unrecognized > 0) {
        Ok(1)
    } else {
        Ok(0)
    }
}

fn tree_command(file: &Path, dot: Option<&Path>) -> Result<i32> {
    let session = analyze(file, CheckerConfig::default())?;
    session.emit_plain();

    if session.has_syntax_errors() {
        println!("errors were found during analysis; no tree will be generated");
        return Ok(1);
    }

    println!("{}", TreePrinter::print(&session.program));

    if let Some(path) = dot {
        fs::write(path, DotWriter::render(&session.program))
            .with_context(|| format!("Failed to write DOT file: {}", path.display()))?;
        log::info!("wrote syntax tree graph to {}", path.display());
    }

    Ok(0)
}

fn symbols_command(file: &Path) -> Result<i32> {
    let session = analyze(file, CheckerConfig::default())?;

    if session.has_syntax_errors() {
        session.emit_plain();
        println!("errors were found during analysis; no symbol tables will be printed");
        return Ok(1);
    }

    let tables = SymbolTableBuilder::build(&session.program);

    for (class, attributes) in tables.classes.sorted() {
        println!("{} {}", "class".bold(), class);
        for (name, ty) in attributes.sorted() {
            println!("  {} : {}", name, ty);
        }
    }

    if !tables.top_level.is_empty() {
        println!("{}", "top level".bold());
        for (name, ty) in tables.top_level.sorted() {
            println!("  {} : {}", name, ty);
        }
    }

    Ok(0)
}

fn validate_yapl_file(file: &Path) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }

    if file.extension() != Some(std::ffi::OsStr::new("yapl")) {
        anyhow::bail!("File must have .yapl extension: {}", file.display());
    }

    Ok(())
}
