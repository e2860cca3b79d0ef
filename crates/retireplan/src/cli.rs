use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use retireplan_core::{ReverseRequest, RiskProfile, StandardRequest};

#[derive(Parser, Debug)]
#[command(name = "retireplan")]
#[command(about = "Historical backtesting of safe retirement withdrawals")]
pub struct Cli {
    /// JSON array of annual market returns
    #[arg(short, long)]
    pub data: PathBuf,

    /// Assumptions override file (YAML, or JSON with a .json extension)
    #[arg(short, long)]
    pub assumptions: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Highest sustainable withdrawal rate at the default allocation
    Calculate(StandardArgs),
    /// Compare stock/bond allocations and name three strategies
    Allocations(StandardArgs),
    /// Portfolio required for a desired after-tax income
    Reverse(ReverseArgs),
    /// Summary statistics of the loaded market history
    History,
}

#[derive(Args, Debug, Clone)]
pub struct StandardArgs {
    #[arg(long)]
    pub current_age: u32,

    #[arg(long)]
    pub retirement_age: u32,

    /// Tax-deferred balance (401k, traditional IRA)
    #[arg(long, default_value_t = 0.0)]
    pub retirement_balance: f64,

    #[arg(long, default_value_t = 0.0)]
    pub taxable_balance: f64,

    /// Target success rate as a fraction: 0.90, 0.95 or 0.98
    #[arg(long, default_value_t = 0.90)]
    pub success_rate: f64,
}

impl From<StandardArgs> for StandardRequest {
    fn from(args: StandardArgs) -> Self {
        StandardRequest {
            current_age: args.current_age,
            retirement_age: args.retirement_age,
            retirement_account_balance: args.retirement_balance,
            taxable_account_balance: args.taxable_balance,
            success_rate_threshold: args.success_rate,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ReverseArgs {
    /// Desired after-tax annual income
    #[arg(long)]
    pub income: f64,

    #[arg(long)]
    pub current_age: u32,

    #[arg(long)]
    pub retirement_age: u32,

    /// Target success rate as a fraction in [0.85, 0.98]
    #[arg(long, default_value_t = 0.90)]
    pub success_rate: f64,

    #[arg(long)]
    pub retirement_balance: Option<f64>,

    #[arg(long)]
    pub taxable_balance: Option<f64>,

    #[arg(long)]
    pub annual_savings: Option<f64>,

    /// Solve only this profile (conservative, moderate, aggressive)
    #[arg(long)]
    pub profile: Option<RiskProfile>,
}

impl From<ReverseArgs> for ReverseRequest {
    fn from(args: ReverseArgs) -> Self {
        ReverseRequest {
            desired_after_tax_income: args.income,
            current_age: args.current_age,
            retirement_age: args.retirement_age,
            success_rate_threshold: args.success_rate,
            current_retirement_account_balance: args.retirement_balance,
            current_taxable_account_balance: args.taxable_balance,
            annual_savings: args.annual_savings,
            preferred_risk_profile: args.profile,
        }
    }
}
