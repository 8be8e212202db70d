mod config;
mod test_runner;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use analyser::{ModifierAnalyser, WarningCollector};
use blocktext::block::{Block, Clause, Composite, Condition, Value};
use blocktext::stack::Stack;
use blocktext::{ParseError, grammar};

const SUBCOMMANDS: &[&str] = &["parse", "test", "help"];

#[derive(Parser)]
#[command(
    name = "blocktext",
    version,
    about = "Parser and modifier analyser for textual block scripts"
)]
struct Cli {
    /// Render diagnostics and test results without ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a script and print its outline
    Parse(ParseArgs),

    /// Run .test.blk fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct ParseArgs {
    /// Script file to parse
    file: String,

    /// Parse only (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump the token stream
    #[arg(long)]
    tokens: bool,

    /// Dump the concrete syntax tree
    #[arg(long)]
    cst: bool,

    /// List every atomic block with its modifier classification
    #[arg(long)]
    modifiers: bool,

    /// TOML file declaring extra classifiers
    #[arg(long)]
    config: Option<String>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.blk file or directory containing them
    path: String,

    /// Fixture sub-directory to run; may be given more than once
    #[arg(short, long)]
    category: Vec<String>,

    /// Print the fixture categories instead of running them
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // If the first positional arg is not a known subcommand, inject "parse"
    // so `blocktext file.blk` works like `blocktext parse file.blk`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args
        .iter()
        .skip(1)
        .position(|a| !a.starts_with('-'))
        .map(|i| i + 1)
    {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "parse".to_string());
        }
    }

    let cli = Cli::parse_from(&args);

    if let Err(error) = grammar::validate() {
        eprintln!("error: invalid grammar: {}", error);
        process::exit(2);
    }

    match cli.command {
        Command::Parse(parse_args) => do_parse(parse_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn do_parse(args: ParseArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();

    let analyser = match &args.config {
        Some(path) => match config::load(Path::new(path)) {
            Ok(analyser) => analyser,
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        },
        None => ModifierAnalyser::builtin(),
    };

    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let emit = |diagnostic: &Diagnostic<usize>| {
        let _ = term::emit_to_write_style(&mut writer.lock(), &term_config, &files, diagnostic);
    };

    // --tokens: dump the token stream
    if args.tokens {
        match blocktext::tokenize(&source) {
            Ok(tokens) => {
                for token in &tokens {
                    println!(
                        "{}:{}\t{:?}\t{:?}",
                        token.position.line, token.position.column, token.kind, token.text
                    );
                }
            }
            Err(error) => {
                emit(&ParseError::from(error).to_diagnostic(file_id));
                process::exit(1);
            }
        }
    }

    let code = match blocktext::Parser::new(source.clone(), file_id).parse() {
        Ok(code) => code,
        Err(error) => {
            emit(&error.to_diagnostic(file_id));
            process::exit(1);
        }
    };

    let mut sink = WarningCollector::new(file_id);
    let results = analyser.analyse_code(&code, &mut sink);
    for warning in sink.warnings() {
        emit(&warning.to_diagnostic());
    }

    // --check: parsing and analysis succeeded
    if args.check {
        eprintln!("ok: {} parsed successfully", args.file);
        return;
    }

    // --cst: dump the tree
    if args.cst {
        println!("{:#?}", code);
    }

    // --modifiers: one line per atomic block
    if args.modifiers {
        for (atomic, classification) in &results {
            println!(
                "{}\t{}\t{}",
                test_runner::byte_offset_to_line(&source, atomic.span.start),
                atomic.label_text(),
                classification
            );
        }
    }

    if !(args.tokens || args.cst || args.modifiers) {
        for stack in code.stacks() {
            print_stack(stack, 0);
            println!();
        }
    }
}

fn print_stack(stack: &Stack, indent: usize) {
    for block in &stack.blocks {
        print_block(block, indent);
    }
}

fn print_block(block: &Block, indent: usize) {
    let pad = "  ".repeat(indent);
    match block {
        Block::Atomic(atomic) => println!("{}{}", pad, atomic.label_text()),
        Block::Composite(Composite::IfElse(if_else)) => {
            println!("{}if {}", pad, condition_text(&if_else.condition));
            print_clause(&if_else.then_clause, indent + 1);
            if let Some(branch) = &if_else.else_branch {
                println!("{}else", pad);
                print_clause(&branch.clause, indent + 1);
            }
        }
        Block::Composite(Composite::Forever(forever)) => {
            println!("{}forever", pad);
            print_clause(&forever.body, indent + 1);
        }
        Block::Composite(Composite::Repeat(repeat)) => {
            let count = match repeat.count.value() {
                Some(Value::Literal(token)) => token.text.clone(),
                _ => "_".to_string(),
            };
            println!("{}repeat {}", pad, count);
            print_clause(&repeat.body, indent + 1);
        }
        Block::Composite(Composite::RepeatUntil(repeat_until)) => {
            println!("{}repeat until {}", pad, condition_text(&repeat_until.condition));
            print_clause(&repeat_until.body, indent + 1);
        }
    }
}

fn print_clause(clause: &Clause, indent: usize) {
    if let Some(stack) = &clause.body {
        print_stack(stack, indent);
    }
}

fn condition_text(condition: &Condition) -> String {
    let inner = condition
        .predicate()
        .and_then(|predicate| predicate.atomic.as_ref())
        .map(|atomic| atomic.label_text())
        .unwrap_or_default();
    format!("<{}>", inner)
}
