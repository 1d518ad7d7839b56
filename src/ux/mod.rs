use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use vibe_site::extract::Extraction;
use vibe_site::wire::ExtractionSource;
use vibe_site::RequestError;

pub fn show_plan(plan: &str) {
    println!("\n=== PLAN ===");
    if plan.trim().is_empty() {
        println!("(empty plan)");
        return;
    }
    println!("{}", plan.trim());
    println!();
}

pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N]: ", prompt);
    let _ = io::stdout().flush();
    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        let ans = s.trim().to_lowercase();
        ans == "y" || ans == "yes"
    } else {
        false
    }
}

/// Spinner shown while a request is in flight.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_extraction(ex: &Extraction) {
    let label = match ex.source {
        ExtractionSource::Structured => "[JSON]".green().bold(),
        ExtractionSource::DoubleEncoded => "[JSON, double-encoded]".green().bold(),
        ExtractionSource::EmbeddedObject => "[JSON, embedded]".yellow().bold(),
        ExtractionSource::Fenced => "[FENCED]".yellow().bold(),
        ExtractionSource::Placeholder => "[UNPARSED]".red().bold(),
    };
    println!(
        "{}  html {}B  css {}B  js {}B",
        label,
        ex.bundle.html.len(),
        ex.bundle.css.len(),
        ex.bundle.js.len()
    );
    if ex.placeholders > 0 {
        println!(
            "{}",
            format!("{} part(s) could not be extracted and hold placeholder content", ex.placeholders).yellow()
        );
    }
}

pub fn print_saved(session_root: &Path, preview: &Path) {
    println!("{} {}", "Saved site to".bold(), session_root.display());
    println!("{} {}", "Preview:".bold(), preview.display());
}

/// Explains a request failure; configuration problems get a fix-it hint.
pub fn print_request_error(err: &RequestError) {
    eprintln!("{} {}", "error:".red().bold(), err);
    if let RequestError::Configuration { name } = err {
        eprintln!(
            "hint: set {} or add `{} = \"...\"` under [keys] in your key file",
            vibe_site::credentials::env_var_name(name).bold(),
            name
        );
    }
}
