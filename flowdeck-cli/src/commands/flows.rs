//! `flowdeck flows`: an interactive pager over the flows table.

use std::io::Write;

use anyhow::Context;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use flowdeck_lib::api::FlowdeckClient;
use flowdeck_lib::flows;
use flowdeck_lib::flows::FlowsSource;
use flowdeck_lib::flows::format_date;
use flowdeck_lib::model::FlowStatus;
use flowdeck_lib::model::PopulatedFlow;
use flowdeck_lib::table::ClickOutcome;
use flowdeck_lib::table::ClickTarget;
use flowdeck_lib::table::FetchOutcome;
use flowdeck_lib::table::PaginatedTable;
use flowdeck_lib::table::SkipReason;
use flowdeck_lib::table::TableStatus;

use crate::config::Settings;

const HELP: &str = "n next  p previous  r refresh  R retry  o N open row  t N toggle row  q quit";

/// Something a table handler asked the pager to do.
#[derive(Debug)]
enum Event {
    Toggle { flow_id: String, status: FlowStatus },
    Open(Box<PopulatedFlow>),
}

/// A line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Next,
    Previous,
    Refresh,
    Retry,
    /// 1-based row number.
    Open(usize),
    Toggle(usize),
    Help,
    Quit,
    Invalid(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Self::Help;
        };
        let row = words.next().and_then(|w| w.parse::<usize>().ok()).filter(|n| *n > 0);

        match (command, row) {
            ("n" | "next", _) => Self::Next,
            ("p" | "prev" | "previous", _) => Self::Previous,
            ("r" | "refresh", _) => Self::Refresh,
            ("R" | "retry", _) => Self::Retry,
            ("o" | "open", Some(n)) => Self::Open(n),
            ("t" | "toggle", Some(n)) => Self::Toggle(n),
            ("h" | "help" | "?", _) => Self::Help,
            ("q" | "quit" | "exit", _) => Self::Quit,
            _ => Self::Invalid(line.trim().to_string()),
        }
    }
}

pub async fn run(settings: &Settings) -> anyhow::Result<()> {
    let client = super::client(settings).context("failed to create API client")?;
    let project_id = settings.require_project()?.to_string();

    let (events_tx, mut events) = mpsc::unbounded_channel();
    let toggle_tx = events_tx.clone();
    let table = flows::table(
        FlowsSource::new(client.clone(), project_id.clone()),
        settings.page_size,
        move |row| {
            let _ = toggle_tx.send(Event::Toggle {
                flow_id: row.data.id.clone(),
                status: row.data.status.toggled(),
            });
        },
        move |row| {
            let _ = events_tx.send(Event::Open(Box::new(row.data.clone())));
        },
    )?;
    let status_column = table
        .columns()
        .iter()
        .position(|column| column.id() == "status")
        .context("flows table has no status column")?;

    log::info!("Browsing flows of project {}", project_id);
    report(&table.load().await);
    print_page(&table);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Input::parse(&line) {
            Input::Next => report(&table.next_page().await),
            Input::Previous => report(&table.previous_page().await),
            Input::Refresh => report(&table.refresh().await),
            Input::Retry => report(&table.retry().await),
            Input::Open(n) => report_click(table.click(ClickTarget::Row { row: n - 1 })),
            Input::Toggle(n) => report_click(table.click(ClickTarget::Cell {
                row: n - 1,
                column: status_column,
            })),
            Input::Help => {
                println!("{}", HELP);
                continue;
            }
            Input::Quit => break,
            Input::Invalid(text) => {
                println!("Unknown command '{}'. {}", text, HELP);
                continue;
            }
        }

        let mut changed = false;
        while let Ok(event) = events.try_recv() {
            changed |= handle(&client, event).await;
        }
        if changed {
            report(&table.refresh().await);
        }
        print_page(&table);
    }

    table.dispose();
    Ok(())
}

/// Runs one handler event. Returns `true` if the listing changed.
async fn handle(client: &FlowdeckClient, event: Event) -> bool {
    match event {
        Event::Open(flow) => {
            print_flow(&flow);
            false
        }
        Event::Toggle { flow_id, status } => match client.change_status(&flow_id, status).await {
            Ok(flow) => {
                println!("{} is now {}", flow.display_name(), flow.status.label());
                true
            }
            Err(e) => {
                log::warn!("Failed to toggle flow {}: {}", flow_id, e);
                println!("Could not change status: {}", e);
                false
            }
        },
    }
}

fn report(outcome: &FetchOutcome) {
    match outcome {
        FetchOutcome::Failed(err) => println!("Failed to load flows: {}", err),
        FetchOutcome::Skipped(SkipReason::Exhausted) => println!("Already on the last page."),
        FetchOutcome::Skipped(SkipReason::NoPrevious) => println!("Already on the first page."),
        FetchOutcome::Skipped(SkipReason::NoError) => println!("Nothing to retry."),
        FetchOutcome::Skipped(reason) => log::debug!("Skipped: {:?}", reason),
        FetchOutcome::Loaded { .. } | FetchOutcome::Cancelled => {}
    }
}

fn report_click(outcome: ClickOutcome) {
    match outcome {
        ClickOutcome::ControlDisabled { .. } => {
            println!("This flow has no published version and cannot be toggled.")
        }
        ClickOutcome::Ignored => println!("No such row on this page."),
        ClickOutcome::RowClicked | ClickOutcome::ControlActivated { .. } => {}
    }
}

fn print_page(table: &PaginatedTable<PopulatedFlow>) {
    println!();
    for line in numbered(table.render_text()) {
        println!("{}", line);
    }

    let mut footer = format!("Page {}", table.page_index() + 1);
    if table.can_previous() {
        footer.push_str("  [p] previous");
    }
    if table.can_next() {
        footer.push_str("  [n] next");
    }
    if let TableStatus::Failed(err) = table.status() {
        footer.push_str(&format!("  error: {} [R] retry", err));
    } else if table.row_count() == 0 {
        footer.push_str("  no flows");
    }
    println!("{}", footer);
}

/// Prefixes row lines with their 1-based number; header and rule get blanks.
fn numbered(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| match i {
            0 | 1 => format!("     {}", line),
            n => format!("{:>3}  {}", n - 1, line),
        })
        .collect()
}

fn print_flow(flow: &PopulatedFlow) {
    println!("{}", flow.display_name());
    println!("  id       {}", flow.id);
    println!("  status   {}", flow.status.label());
    println!(
        "  folder   {}",
        flow.folder_id.as_deref().unwrap_or(flows::UNCATEGORIZED)
    );
    println!("  created  {}", format_date(&flow.created));
    println!("  updated  {}", format_date(&flow.updated));
    for action in flow.version.actions() {
        println!("  - {} ({})", action.display_name(), action.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(Input::parse("n"), Input::Next);
        assert_eq!(Input::parse("  previous "), Input::Previous);
        assert_eq!(Input::parse("R"), Input::Retry);
        assert_eq!(Input::parse("o 3"), Input::Open(3));
        assert_eq!(Input::parse("toggle 2"), Input::Toggle(2));
        assert_eq!(Input::parse(""), Input::Help);
        assert_eq!(Input::parse("q"), Input::Quit);
    }

    #[test]
    fn test_parse_input_rejects_bad_rows() {
        assert_eq!(Input::parse("o 0"), Input::Invalid("o 0".into()));
        assert_eq!(Input::parse("t x"), Input::Invalid("t x".into()));
        assert_eq!(Input::parse("o"), Input::Invalid("o".into()));
    }

    #[test]
    fn test_numbered_lines() {
        let lines = numbered(vec!["Name".into(), "----".into(), "a".into(), "b".into()]);
        assert_eq!(
            lines,
            vec!["     Name", "     ----", "  1  a", "  2  b"]
        );
    }
}
