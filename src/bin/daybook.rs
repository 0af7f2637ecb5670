use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use daybook::cli::{self, Command};
use daybook::config::Config;
use daybook::context::{AppContext, StandardContext};
use daybook::export;
use daybook::future_log::FutureLog;
use daybook::markdown::{link_repeat_tags, render_html_link};
use daybook::model::{OccurrenceWindow, RecurrenceEngine, parse_rule_in_year, parse_smart_date};
use daybook::planner::{scan_week, start_of_week};
use daybook::storage::JsonFileStore;
use log::LevelFilter;
use simplelog::{ColorChoice, TermLogger, TerminalMode};
use std::env;
use std::fs;

fn main() -> Result<()> {
    let invocation = cli::parse_args(env::args().skip(1))?;
    if invocation.command == Command::Help {
        cli::print_help("daybook");
        return Ok(());
    }

    let ctx = StandardContext::new(invocation.root.clone());
    let config = Config::load_or_default(&ctx)?;

    let level = if invocation.verbose {
        LevelFilter::Debug
    } else {
        config.log_level_filter()
    };
    // A logger may already be installed when embedded; that is fine.
    let _ = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    );

    let real_today = Local::now().date_naive();
    let today = match &invocation.today {
        Some(raw) => parse_smart_date(raw, real_today)
            .ok_or_else(|| anyhow::anyhow!("Invalid --today value '{}'", raw))?,
        None => real_today,
    };

    run(invocation.command, &ctx, &config, today)
}

fn run(command: Command, ctx: &dyn AppContext, config: &Config, today: NaiveDate) -> Result<()> {
    match command {
        Command::Help => cli::print_help("daybook"),
        Command::Expand { rule, months } => {
            let rule = parse_rule_in_year(&rule, today.year());
            let months = months.unwrap_or(config.future_log_months);
            let window = OccurrenceWindow::months_ahead(today, months);
            for date in RecurrenceEngine::expand(&rule, &window, today) {
                println!("{}", date.format("%Y-%m-%d %a"));
            }
        }
        Command::Next { rule } => {
            let rule = parse_rule_in_year(&rule, today.year());
            match RecurrenceEngine::next_occurrence(&rule, today, config.horizon_years) {
                Some(date) => println!("{}", date.format("%Y-%m-%d %a")),
                None => println!(
                    "No occurrence within {} year(s) ({})",
                    config.horizon_years,
                    rule.kind()
                ),
            }
        }
        Command::Scan { file, week } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let anchor = match week {
                Some(raw) => parse_smart_date(&raw, today)
                    .ok_or_else(|| anyhow::anyhow!("Invalid --week value '{}'", raw))?,
                None => today,
            };
            let week_start = start_of_week(anchor, config.planner_week_start);
            for column in scan_week(&text, week_start, today) {
                println!("{}", column.date.format("%a %Y-%m-%d"));
                for item in column.items {
                    let mark = if item.done { "x" } else { " " };
                    let repeat = if item.recurring { " ↻" } else { "" };
                    println!("  [{}] {}{}", mark, item.title, repeat);
                }
            }
        }
        Command::Link { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let render = render_html_link(&config.link_prefix);
            print!(
                "{}",
                link_repeat_tags(&text, today, config.horizon_years, render)
            );
        }
        Command::FutureList => {
            let store = JsonFileStore::open(ctx)?;
            let future_log = FutureLog::load(&store)?;
            for bucket in future_log.upcoming(today, config.future_log_months) {
                println!("{}-{:02}", bucket.year, bucket.month);
                for (date, title) in bucket.items {
                    println!("  {}  {}", date.format("%d %a"), title);
                }
            }
        }
        Command::FutureAdd { rule, title } => {
            let store = JsonFileStore::open(ctx)?;
            let mut future_log = FutureLog::load(&store)?;
            let id = future_log.add(&title, &rule, today)?.id.clone();
            future_log.save(&store)?;
            println!("{}", id);
        }
        Command::FutureRemove { id } => {
            let store = JsonFileStore::open(ctx)?;
            let mut future_log = FutureLog::load(&store)?;
            if !future_log.remove(&id) {
                anyhow::bail!("No future log entry with id '{}'", id);
            }
            future_log.save(&store)?;
        }
        Command::FutureExport => {
            let store = JsonFileStore::open(ctx)?;
            let future_log = FutureLog::load(&store)?;
            println!("{}", export::to_ics_string(future_log.entries(), today));
        }
    }
    Ok(())
}
