use clap::{Parser, Subcommand};

use vibe_site::config::ProviderKind;

#[derive(Parser, Debug)]
#[command(name = "vibe_site", version, about = "Describe a website, get HTML/CSS/JS, refine it with plain-language edits")]
pub struct Args {
    /// TOML config file; flags override its values.
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, value_enum)]
    pub provider: Option<ProviderKind>,

    #[arg(long)]
    pub model: Option<String>,

    /// Session directory holding plan.md, index.html, style.css, script.js.
    #[arg(long)]
    pub session: Option<String>,

    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// TOML file with a `[keys]` table, checked after the environment.
    #[arg(long)]
    pub key_file: Option<String>,

    #[arg(long, default_value_t = false)]
    pub auto_approve: bool,

    #[arg(long, default_value_t = false)]
    pub no_artifacts: bool,

    #[arg(long, default_value_t = false)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Produce a build plan for an idea and save it as plan.md.
    Plan { idea: String },
    /// Generate the site from an idea (plan first) or from the saved plan.
    Generate { idea: Option<String> },
    /// Apply a plain-language change to the current site.
    Edit { instruction: String },
    /// Rewrite preview.html from the current site.
    Preview,
    /// Restore the site as it was before the last change.
    Undo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_and_subcommand() {
        let args = Args::try_parse_from([
            "vibe_site", "--provider", "ollama", "--session", "out", "edit", "make background blue",
        ])
        .unwrap();
        assert_eq!(args.provider, Some(ProviderKind::Ollama));
        assert_eq!(args.session.as_deref(), Some("out"));
        assert!(matches!(args.command, Command::Edit { ref instruction } if instruction == "make background blue"));
    }

    #[test]
    fn generate_idea_is_optional() {
        let args = Args::try_parse_from(["vibe_site", "generate"]).unwrap();
        assert!(matches!(args.command, Command::Generate { idea: None }));
    }
}
