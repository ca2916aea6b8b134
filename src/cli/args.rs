use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "contentops")]
#[command(about = "Rule-driven content automation: social posts, newsletters and templates")]
#[command(long_about = "contentops - content automation engine

Automation rules react to triggers (a published blog article, a scheduled
time, a manual request) and run actions that generate social posts and
newsletter campaigns from templates.

QUICK START:
  contentops templates seed           Install the built-in templates
  contentops rules add rule.yaml      Add an automation rule
  contentops trigger blog post.yaml   Run rules for a published article
  contentops scheduler run            Run time-based rules in the foreground

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

DATA:
  Everything lives under $CONTENTOPS_HOME (default ~/.contentops).

For more information on a specific command, run:
  contentops <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output, or 'json' for
    /// machine-readable output suitable for scripting. Defaults to
    /// `general.default_output` from the configuration file.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage automation rules
    ///
    /// Rules pair a trigger with an ordered list of actions. They are
    /// written in YAML and stored in the local database.
    ///
    /// # Examples
    ///
    ///   contentops rules list               List all rules
    ///   contentops rules add rule.yaml      Add or replace a rule
    ///   contentops rules toggle <id>        Activate/deactivate a rule
    ///   contentops rules export rules.yaml  Export every rule
    #[command(alias = "rule")]
    Rules(RulesArgs),

    /// Manage content templates
    ///
    /// Templates are text bodies with {{variable}} placeholders used by
    /// social post and newsletter actions.
    ///
    /// # Examples
    ///
    ///   contentops templates seed                     Install built-in templates
    ///   contentops templates preview <id> --var title=Hello
    #[command(alias = "tpl")]
    Templates(TemplatesArgs),

    /// Fire a trigger and run the matching rules
    ///
    /// # Examples
    ///
    ///   contentops trigger blog post.yaml         Blog article was published
    ///   contentops trigger manual <rule-id>       Run one rule by hand
    ///   contentops trigger tick                   Evaluate time-based rules now
    Trigger(TriggerArgs),

    /// Run the time-based rule scheduler
    Scheduler(SchedulerArgs),

    /// Show generated social posts
    Posts(PostsArgs),

    /// Show generated newsletter campaigns
    Newsletters(NewslettersArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),

    /// Generate shell completions
    ///
    /// Outputs a completion script for the specified shell.
    ///
    /// Example: contentops completions bash > ~/.bash_completion.d/contentops
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for rule management.
#[derive(Args)]
pub struct RulesArgs {
    #[command(subcommand)]
    pub command: RulesCommands,
}

/// Rule subcommands.
#[derive(Subcommand)]
pub enum RulesCommands {
    /// List all rules
    ///
    /// Rules are shown in priority order, then by name.
    List,

    /// Show a rule
    Show {
        /// Rule ID
        id: String,
    },

    /// Add or replace a rule from a YAML file
    ///
    /// Replacing a rule keeps its execution history.
    Add {
        /// YAML file with one rule
        file: PathBuf,
    },

    /// Activate or deactivate a rule
    ///
    /// Without flags the current state is flipped.
    Toggle {
        /// Rule ID
        id: String,

        /// Explicitly activate
        #[arg(long, conflicts_with = "disable")]
        enable: bool,

        /// Explicitly deactivate
        #[arg(long)]
        disable: bool,
    },

    /// Delete a rule
    Delete {
        /// Rule ID
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Import a rule set from YAML
    Import {
        /// YAML file with a `rules:` list
        file: PathBuf,
    },

    /// Export all rules as a YAML rule set
    Export {
        /// Output file (stdout if omitted)
        file: Option<PathBuf>,
    },
}

/// Arguments for template management.
#[derive(Args)]
pub struct TemplatesArgs {
    #[command(subcommand)]
    pub command: TemplatesCommands,
}

/// Template subcommands.
#[derive(Subcommand)]
pub enum TemplatesCommands {
    /// List all templates
    List,

    /// Show a template
    Show {
        /// Template ID
        id: String,
    },

    /// Add or replace a template from a YAML file
    Add {
        /// YAML file with one template
        file: PathBuf,
    },

    /// Render a template with sample values
    ///
    /// Variables without a value are shown as [name].
    ///
    /// Example: contentops templates preview default-twitter-blog --var title=Hello
    Preview {
        /// Template ID
        id: String,

        /// Blog article (YAML or JSON) to take values from
        #[arg(long, short = 'b')]
        blog: Option<PathBuf>,

        /// Variable substitutions (key=value), repeatable
        #[arg(long = "var", short = 'v', value_name = "KEY=VALUE")]
        vars: Vec<String>,
    },

    /// Delete a template
    Delete {
        /// Template ID
        id: String,

        /// Skip confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Install the built-in templates that are missing
    Seed,
}

/// Arguments for firing triggers.
#[derive(Args)]
pub struct TriggerArgs {
    #[command(subcommand)]
    pub command: TriggerCommands,
}

/// Trigger subcommands.
#[derive(Subcommand)]
pub enum TriggerCommands {
    /// A blog article was published
    Blog {
        /// Article payload (YAML or JSON)
        file: PathBuf,
    },

    /// Run one rule by hand, regardless of its trigger
    Manual {
        /// Rule ID
        rule_id: String,

        /// Manual payload (YAML or JSON)
        payload: Option<PathBuf>,

        /// Who requested the run
        #[arg(long)]
        requested_by: Option<String>,
    },

    /// Evaluate time-based rules once
    Tick {
        /// Evaluate as of this RFC 3339 time instead of now
        #[arg(long)]
        at: Option<String>,
    },
}

/// Arguments for the scheduler.
#[derive(Args)]
pub struct SchedulerArgs {
    #[command(subcommand)]
    pub command: SchedulerCommands,
}

/// Scheduler subcommands.
#[derive(Subcommand)]
pub enum SchedulerCommands {
    /// Run in the foreground until Ctrl-C
    Run {
        /// Minutes between ticks (overrides configuration)
        #[arg(long, short = 'i')]
        interval: Option<u64>,
    },
}

/// Arguments for social posts.
#[derive(Args)]
pub struct PostsArgs {
    #[command(subcommand)]
    pub command: PostsCommands,
}

/// Social post subcommands.
#[derive(Subcommand)]
pub enum PostsCommands {
    /// List recent posts
    List {
        /// Maximum number of posts
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },
}

/// Arguments for newsletter campaigns.
#[derive(Args)]
pub struct NewslettersArgs {
    #[command(subcommand)]
    pub command: NewslettersCommands,
}

/// Newsletter subcommands.
#[derive(Subcommand)]
pub enum NewslettersCommands {
    /// List recent campaigns
    List {
        /// Maximum number of campaigns
        #[arg(long, short = 'n', default_value = "20")]
        limit: usize,
    },
}

/// Arguments for configuration.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Configuration subcommands.
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, short = 'f')]
        force: bool,
    },
}

/// Parse `key=value` pairs.
///
/// # Errors
///
/// Returns the offending entry if it has no `=` or an empty key.
pub fn parse_vars(vars: &[String]) -> Result<Vec<(String, String)>, String> {
    vars.iter()
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(entry.clone()),
        })
        .collect()
}
