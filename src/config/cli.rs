use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "onboard")]
#[command(about = "Business onboarding guide: recommendations and setup journey")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the snapshot file from the configuration
    #[arg(long)]
    pub state: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List the built-in questionnaire presets
    Presets,

    /// Answer the questionnaire and start a new journey
    Recommend {
        /// TOML file with questionnaire answers
        #[arg(long, conflicts_with = "preset", required_unless_present = "preset")]
        answers: Option<String>,

        /// Name of a built-in preset
        #[arg(long)]
        preset: Option<String>,

        /// Show which rules contributed to each module
        #[arg(long)]
        explain: bool,
    },

    /// Show the journey by phase
    Status,

    /// Show the setup steps of one module
    Steps { module: String },

    /// Mark a step done, or undo it
    Toggle {
        module: String,
        step: String,

        /// Toggle even if the step is locked
        #[arg(long)]
        force: bool,
    },

    /// Export recommendations and progress as CSV
    Export {
        #[arg(short, long, default_value = "onboarding.csv")]
        output: String,
    },

    /// Discard all answers and progress
    Reset,
}
