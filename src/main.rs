use clap::Parser;
use codetags::error::ExtractError;
use codetags::json::{self, JsonStyle};
use codetags::log_init::{init_stderr_logger, level_for_verbosity};
use codetags::ParseOptions;

use std::io::{self, Read};

/// Extract `+tag` annotations from comment lines on stdin and print them as JSON.
#[derive(Parser, Debug)]
#[command(name = "codetags", version)]
struct Cli {
    /// Prefix that marks a line as a tag
    #[arg(long, default_value = "+")]
    marker: String,

    /// Only keep tags in this group (the part before ':')
    #[arg(long)]
    group: Option<String>,

    /// Keep everything after '=' verbatim instead of parsing values
    #[arg(long)]
    raw: bool,

    /// Group tag bodies by identifier without parsing them
    #[arg(long)]
    extract_only: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log to stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_stderr_logger(level_for_verbosity(cli.verbose));

    let mut input = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input) {
        eprintln!("Failed to read stdin: {}", e);
        std::process::exit(1);
    }
    let lines: Vec<&str> = input.lines().collect();
    let group = cli.group.as_deref();
    let style = if cli.pretty {
        JsonStyle::Pretty
    } else {
        JsonStyle::Compact
    };

    if cli.extract_only {
        let extracted = codetags::extract(&cli.marker, group, &lines);
        println!("{}", json::extracted_to_json(&extracted, style));
        return;
    }

    let options = ParseOptions::new().raw_values(cli.raw);
    match codetags::extract_and_parse_with(&cli.marker, group, &lines, &options) {
        Ok(parsed) => println!("{}", json::parsed_to_json(&parsed, style)),
        Err(err) => {
            report(&err, &lines);
            std::process::exit(1);
        }
    }
}

fn report(err: &ExtractError, lines: &[&str]) {
    let ExtractError::Parse {
        line,
        body_offset,
        source,
        ..
    } = err;
    let line_text = lines.get(*line).copied().unwrap_or("");

    eprintln!("ERROR AT LINE {}:", line + 1);
    eprintln!("{}", line_text);

    // Columns in the error are relative to the tag body.
    let body_column = line_text
        .get(..*body_offset)
        .map_or(0, |prefix| prefix.chars().count());
    let start_col = body_column + source.begin.column;
    let end_col = body_column + source.end.column;

    let mut underline = " ".repeat(start_col);
    underline.push('^');
    if end_col > start_col + 1 {
        underline.push_str(&"_".repeat(end_col - start_col - 1));
    }

    eprintln!("{}", underline);
    eprintln!("{}", err);
    eprintln!();
}
