use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "rowdb")]
#[command(about = "Row-oriented heap storage engine")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "rowdb.conf", global = true)]
    pub config: String,

    /// Control colored output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the boot page and system catalog
    Init,

    /// Register a user table in the catalog
    CreateTable {
        /// Table name
        name: String,

        /// Column specs in declaration order, e.g.
        /// `person_id:int:notnull` `first_name:varchar(20)`
        #[arg(required = true)]
        columns: Vec<String>,
    },

    /// Insert one row into a table
    Insert {
        /// Table name
        table: String,

        /// Column values in declaration order; `null` inserts a NULL
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Print every row of a table
    Scan {
        /// Table name
        table: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the boot page and a catalog summary
    Info {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}
