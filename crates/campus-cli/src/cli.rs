use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "campus",
    about = "Campus records: student records addressed by content hash, indexed on a ledger",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Configuration file. Defaults apply if it does not exist.
    #[arg(short, long, global = true, default_value = "campus.toml")]
    pub config: PathBuf,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Register the demo students
    Init(InitArgs),
    /// Register or overwrite a student record
    Register(RegisterArgs),
    /// Show the record for a registration number
    Query(QueryArgs),
    /// Change one field of a stored record
    Update(UpdateArgs),
    /// List stored records in registration-number order
    List(ListArgs),
    /// Show the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct InitArgs {}

#[derive(Args)]
pub struct RegisterArgs {
    pub registration_number: String,
    #[arg(long)]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    #[arg(long, default_value = "")]
    pub branch: String,
    #[arg(long, default_value = "")]
    pub blood_group: String,
    #[arg(long, default_value = "")]
    pub mobile_number: String,
    #[arg(long, default_value = "")]
    pub address: String,
    /// May be repeated.
    #[arg(long = "subject")]
    pub subjects: Vec<String>,
}

#[derive(Args)]
pub struct QueryArgs {
    pub registration_number: String,
    /// Also print the snapshot pointer the record was resolved from.
    #[arg(long)]
    pub pointer: bool,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub registration_number: String,
    /// mobileNumber, address, bloodGroup, branch, addSubject or subjects
    #[arg(short, long)]
    pub field: String,
    #[arg(long)]
    pub value: String,
}

#[derive(Args)]
pub struct ListArgs {
    #[arg(long, default_value = "")]
    pub start: String,
    #[arg(long, default_value = "")]
    pub end: String,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the effective configuration to the config file if it is missing.
    #[arg(long)]
    pub write: bool,
}
