use clap::{Args, Parser, Subcommand};

use crate::sql::SqlStyle;

/// Reorganizes raw training material into product/module/topic folders.
///
/// Without a subcommand, prints the dry-run plan.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(flatten)]
    pub paths: PathArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct PathArgs {
    /// Input directory holding the raw chapter folders.
    #[arg(long, global = true, env = "LESSONMAP_DATA_DIR", default_value = "data")]
    pub data: String,

    /// Output root of the reorganized content tree.
    #[arg(long, global = true, env = "LESSONMAP_CONTENT_DIR", default_value = "content")]
    pub content: String,

    /// YAML chapter table (`chapter name -> {product, module}`) replacing the built-in one.
    #[arg(long, global = true, env = "LESSONMAP_CHAPTERS")]
    pub chapters: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the reorganization plan without touching any file.
    Plan,
    /// Copy files into the content tree, write metadata and the SQL import script.
    Execute(ExecuteArgs),
    /// Write the SQL import script only.
    Sql(SqlArgs),
    /// Run an external extractor over the reorganized slides and assignments.
    Extract(ExtractArgs),
    /// Turn a filled-in quiz template into a quiz import script.
    Quiz(QuizArgs),
}

#[derive(Debug, Args)]
pub struct ExecuteArgs {
    /// Skip the interactive confirmation.
    #[arg(long)]
    pub yes: bool,

    /// Output file path for the SQL import script.
    #[arg(long, default_value = "import-topics.sql")]
    pub sql_out: String,

    /// Key style of the generated SQL.
    #[arg(long, value_enum, default_value_t = SqlStyle::TopicId)]
    pub sql_style: SqlStyle,

    /// Do not write the SQL import script.
    #[arg(long)]
    pub no_sql: bool,
}

#[derive(Debug, Args)]
pub struct SqlArgs {
    /// Output file path for the SQL import script.
    #[arg(long, default_value = "import-topics.sql")]
    pub out: String,

    /// Key style of the generated SQL.
    #[arg(long, value_enum, default_value_t = SqlStyle::TopicId)]
    pub style: SqlStyle,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Extractor program; called as `<program> <file>`, prints a JSON array of pages.
    #[arg(long, env = "LESSONMAP_EXTRACTOR")]
    pub extractor: String,

    /// Output directory for per-topic JSON (default: `<content>/extracted`).
    #[arg(long)]
    pub out: Option<String>,
}

#[derive(Debug, Args)]
pub struct QuizArgs {
    /// Filled-in markdown quiz template.
    pub template: String,

    /// Output file path (default: `database/INSERT-QUIZ-<topic code>.sql`).
    #[arg(long)]
    pub out: Option<String>,
}
