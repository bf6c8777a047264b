use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};
use switchboard_routing::{Priorities, TaskCategory};

/// Switchboard LLM dispatcher
#[derive(Debug, Parser)]
#[command(name = "switchboard", about = "Pick an LLM for a prompt, call it, and report cost and latency")]
pub struct Args {
    /// Path to configuration file; without one, providers come from `*_API_KEY` variables
    #[arg(short, long, env = "SWITCHBOARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Log filter directive
    #[arg(long, default_value = "warn", env = "SWITCHBOARD_LOG", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the model catalog
    Models,
    /// Rank models for a prompt without calling any
    Recommend(RecommendArgs),
    /// Send a prompt to one model
    Dispatch(DispatchArgs),
    /// Send the same prompt to several models concurrently
    Compare(CompareArgs),
}

/// Options shared by every command that takes a prompt
#[derive(Debug, ClapArgs)]
pub struct PromptArgs {
    /// Prompt text
    pub prompt: String,

    /// System prompt
    #[arg(long = "system")]
    pub system_prompt: Option<String>,

    /// Output token budget
    #[arg(long)]
    pub max_output_tokens: Option<u32>,

    /// Ask for JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, ClapArgs)]
pub struct RecommendArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    /// Task category; inferred from the prompt when omitted
    #[arg(long)]
    pub task: Option<TaskCategory>,

    /// Number of recommendations
    #[arg(long, default_value_t = 3)]
    pub top: usize,

    #[command(flatten)]
    pub priorities: PriorityArgs,

    /// Require image input support
    #[arg(long)]
    pub vision: bool,

    /// Model to favor in the ranking
    #[arg(long)]
    pub prefer: Option<String>,
}

#[derive(Debug, ClapArgs)]
pub struct PriorityArgs {
    /// Prefer cheaper models
    #[arg(long)]
    pub favor_cost: bool,

    /// Prefer faster providers
    #[arg(long)]
    pub favor_speed: bool,

    /// Prefer higher-tier models
    #[arg(long)]
    pub favor_quality: bool,
}

impl From<&PriorityArgs> for Priorities {
    fn from(args: &PriorityArgs) -> Self {
        Self {
            cost: args.favor_cost,
            speed: args.favor_speed,
            quality: args.favor_quality,
        }
    }
}

#[derive(Debug, ClapArgs)]
pub struct DispatchArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    /// Model to use; selected automatically when omitted
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature, 0 to 2
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Task category used for automatic selection
    #[arg(long)]
    pub task: Option<TaskCategory>,

    #[command(flatten)]
    pub priorities: PriorityArgs,

    /// Model to favor during automatic selection
    #[arg(long, conflicts_with = "model")]
    pub prefer: Option<String>,

    /// Also print the event envelope announcing the result
    #[arg(long)]
    pub emit_message: bool,
}

#[derive(Debug, ClapArgs)]
pub struct CompareArgs {
    #[command(flatten)]
    pub prompt: PromptArgs,

    /// Models to compare
    #[arg(long, value_delimiter = ',', required = true)]
    pub models: Vec<String>,

    /// Sampling temperature, 0 to 2
    #[arg(long)]
    pub temperature: Option<f64>,
}
