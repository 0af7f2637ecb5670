// File: ./src/cli.rs
//! Command-line parsing and help text for the `daybook` binary.
use crate::model::parse_rule;
use anyhow::{Result, bail};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Expand { rule: String, months: Option<u32> },
    Next { rule: String },
    Scan { file: PathBuf, week: Option<String> },
    Link { file: PathBuf },
    FutureList,
    FutureAdd { rule: String, title: String },
    FutureRemove { id: String },
    FutureExport,
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub root: Option<PathBuf>,
    /// Raw `--today` value; resolved by the caller against the real date.
    pub today: Option<String>,
    pub verbose: bool,
    pub command: Command,
}

/// Parses `args` (without the program name). Flags may appear anywhere.
pub fn parse_args<I, S>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut root = None;
    let mut today = None;
    let mut week = None;
    let mut months = None;
    let mut verbose = false;
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.into_iter().map(Into::into);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" | "help" => {
                return Ok(Invocation {
                    root,
                    today,
                    verbose,
                    command: Command::Help,
                });
            }
            "-v" | "--verbose" => verbose = true,
            "-r" | "--root" => root = Some(PathBuf::from(flag_value(&mut iter, &arg)?)),
            "--today" => today = Some(flag_value(&mut iter, &arg)?),
            "--week" => week = Some(flag_value(&mut iter, &arg)?),
            "--months" => {
                let raw = flag_value(&mut iter, &arg)?;
                months = Some(
                    raw.parse::<u32>()
                        .map_err(|_| anyhow::anyhow!("Invalid --months value '{}'", raw))?,
                );
            }
            _ => positional.push(arg),
        }
    }

    let command = match positional.split_first() {
        None => Command::Help,
        Some((cmd, rest)) => match (cmd.as_str(), rest) {
            ("expand", words) if !words.is_empty() => Command::Expand {
                rule: words.join(" "),
                months,
            },
            ("next", words) if !words.is_empty() => Command::Next {
                rule: words.join(" "),
            },
            ("scan", [file]) => Command::Scan {
                file: PathBuf::from(file),
                week,
            },
            ("link", [file]) => Command::Link {
                file: PathBuf::from(file),
            },
            ("future", []) => Command::FutureList,
            ("future", [sub]) if sub == "list" => Command::FutureList,
            ("future", [sub]) if sub == "export" => Command::FutureExport,
            ("future", [sub, id]) if sub == "remove" => Command::FutureRemove { id: id.clone() },
            ("future", [sub, words @ ..]) if sub == "add" && words.len() >= 2 => {
                let (rule, title) = split_rule_and_title(words);
                Command::FutureAdd { rule, title }
            }
            _ => bail!("Unknown or incomplete command: {}", positional.join(" ")),
        },
    };

    Ok(Invocation {
        root,
        today,
        verbose,
        command,
    })
}

/// Splits `future add` words at the longest leading run that forms a known rule,
/// leaving at least one word for the title. Falls back to the first word.
fn split_rule_and_title(words: &[String]) -> (String, String) {
    let split = (1..words.len())
        .rev()
        .find(|&n| parse_rule(&words[..n].join(" ")).is_recognized())
        .unwrap_or(1);
    (words[..split].join(" "), words[split..].join(" "))
}

fn flag_value(iter: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    iter.next()
        .ok_or_else(|| anyhow::anyhow!("Missing value for {}", flag))
}

pub fn print_help(binary_name: &str) {
    println!(
        "Daybook v{} - recurrence rules, planner scanning and future log",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("USAGE:");
    println!("    {} expand <rule> [--months <n>]", binary_name);
    println!("    {} next <rule>", binary_name);
    println!("    {} scan <note.md> [--week <date>]", binary_name);
    println!("    {} link <note.md>", binary_name);
    println!("    {} future [list]", binary_name);
    println!("    {} future add <rule> <title...>   (longest known rule wins)", binary_name);
    println!("    {} future remove <id>", binary_name);
    println!("    {} future export", binary_name);
    println!();
    println!("OPTIONS:");
    println!("    -r, --root <path>     Use a different directory for config and data.");
    println!("    --today <date>        Pretend today is <date> (2025-07-16, 16.07.2025, tomorrow).");
    println!("    -v, --verbose         Log debug output to stderr.");
    println!("    -h, --help            Show this help message.");
    println!();
    println!("REPEAT RULES:");
    println!("    everyday                              Every day from today");
    println!("    everyday from <d1> to <d2>            Every day within a range");
    println!("    every <weekday>                       Weekly from today (every friday)");
    println!("    every <weekday> from <d1> to <d2>     Weekly within a range");
    println!("    <DD.MM.YYYY> | <YYYY-MM-DD> | <DD.MM> Every year on that day");
    println!();
    println!("NOTE TAGS:");
    println!("    SCHEDULED: <date>     Put a line on the planner on that day");
    println!("    REPEAT: <rule>        Repeat it (SCHEDULED: becomes the first possible day)");
    println!("    (REPEAT: <rule>)      Inline; `link` turns it into a link to the next date");
    println!();
    println!("EXAMPLES:");
    println!("    {} next every friday --today 2025-07-16", binary_name);
    println!("    {} expand \"everyday from 01.07.2025 to 03.07.2025\"", binary_name);
    println!("    {} future add 25.12 Christmas", binary_name);
    println!("    {} future add every friday Payday", binary_name);
    println!("    {} future export > future.ics", binary_name);
}
