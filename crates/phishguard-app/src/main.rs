#![warn(missing_docs)]
//! # phishguard binary
//!
//! Interactive terminal dashboard: each input line is a URL; lines starting
//! with `:` are commands.

use std::io::{self, BufRead, Write};

use anyhow::Context;
use phishguard_app::{AppConfig, Dashboard, app_version, init_tracing};
use phishguard_core::{BatchRow, HistoryEntry};
use phishguard_ui::{ChartSlot, FeatureBar, ResultView};

const HELP: &str = "\
Enter a URL to analyze it, or a command:
  :batch <url> <url> ...   analyze up to 20 URLs
  :export                  write the last batch as CSV
  :history                 list recent scans
  :open <n>                show history entry n again
  :clear                   delete scan history
  :theme                   toggle light/dark theme
  :quit                    exit";

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let mut dashboard = Dashboard::from_config(&config).context("failed to start dashboard")?;

    println!("phishguard {}  (theme: {})", app_version(), dashboard.state().theme.as_str());
    println!("{HELP}");

    let mut feature_chart = ChartSlot::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        match command {
            ":quit" | ":q" => break,
            ":help" => println!("{HELP}"),
            ":batch" => match dashboard.run_batch(rest) {
                Ok(rows) => print_batch(&rows),
                Err(error) => println!("{}", error.user_message()),
            },
            ":export" => match dashboard.export_batch(&config.export_dir) {
                Ok(path) => println!("exported {}", path.display()),
                Err(error) => println!("{}", error.user_message()),
            },
            ":history" => print_history(&dashboard.history()),
            ":open" => {
                let opened = rest
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .is_some_and(|index| dashboard.recall(index));
                match dashboard.state().result_view() {
                    Some(view) if opened => print_result(&view, &mut feature_chart),
                    _ => println!("no history entry {}", rest.trim()),
                }
            }
            ":clear" => match dashboard.clear_history() {
                Ok(()) => {
                    feature_chart.clear();
                    println!("history cleared");
                }
                Err(error) => println!("{}", error.user_message()),
            },
            ":theme" => match dashboard.toggle_theme() {
                Ok(theme) => println!("theme: {}", theme.as_str()),
                Err(error) => println!("{}", error.user_message()),
            },
            other if other.starts_with(':') => println!("unknown command {other}; try :help"),
            _ => match dashboard.analyze(line) {
                Ok(_) => {
                    if let Some(view) = dashboard.state().result_view() {
                        print_result(&view, &mut feature_chart);
                    }
                }
                Err(error) => println!("{}", error.user_message()),
            },
        }
    }

    Ok(())
}

fn print_result(view: &ResultView, feature_chart: &mut ChartSlot<Vec<FeatureBar>>) {
    println!();
    println!("{}", view.url);
    println!(
        "  risk {:>4}   {}   [{}]",
        view.percent_text,
        view.badge_text,
        view.threat_tag.text()
    );
    println!("  prediction: {}", view.prediction_text);
    println!("  {}", view.reasoning);

    for model in &view.models {
        println!("  {:<22} {:<12} {}%", model.name, model.prediction, model.percent);
    }

    println!("  features:");
    if let Some(placeholder) = view.feature_placeholder() {
        println!("    {placeholder}");
    }
    for bar in feature_chart.redraw(|| view.feature_bars.clone()) {
        let cells = (bar.width_percent / 5.0).round() as usize;
        let sign = if bar.weight > 0.0 { '+' } else { '-' };
        println!(
            "    {:<26} {:>6} {}",
            bar.label,
            bar.value_text,
            sign.to_string().repeat(cells)
        );
    }

    if !view.shap.is_empty() {
        println!("  shap:");
        for bar in &view.shap {
            println!("    {:<26} {:+.3}", bar.label, bar.value);
        }
    }
    if !view.lime.is_empty() {
        println!("  lime:");
        for bar in &view.lime {
            println!("    {:<26} {:+.3}", bar.label, bar.value);
        }
    }

    if let Some(details) = &view.technical {
        println!(
            "  redirects: {}   ssl: {}   whois: {}",
            details.redirects, details.ssl, details.domain_age
        );
        if let Some(link_threats) = &details.link_threats {
            println!("  link threats: {link_threats}");
        }
        for sign in &details.warning_signs {
            println!("  ! {sign}");
        }
    }
    println!();
}

fn print_batch(rows: &[BatchRow]) {
    println!("{:<48} {:<11} {:>5}  {}", "URL", "VERDICT", "RISK", "CONFIDENCE");
    for row in rows {
        println!(
            "{:<48} {:<11} {:>5}  {}",
            row.url, row.verdict, row.risk_percent, row.confidence_label
        );
    }
}

fn print_history(entries: &[HistoryEntry]) {
    if entries.is_empty() {
        println!("no scans yet");
        return;
    }
    for (index, entry) in entries.iter().enumerate() {
        println!(
            "{:>2}. {:>3}%  {}",
            index + 1,
            phishguard_core::percent_of(entry.probability),
            entry.url
        );
    }
}
