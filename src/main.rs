use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    lessonmap::logging::init().context("init logging")?;

    let cli = lessonmap::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    let config = lessonmap::config::Config::from_cli(&cli.paths).context("load config")?;

    match cli.command.unwrap_or(lessonmap::cli::Command::Plan) {
        lessonmap::cli::Command::Plan => {
            lessonmap::commands::plan(&config).context("plan")?;
        }
        lessonmap::cli::Command::Execute(args) => {
            lessonmap::commands::execute(&config, args).context("execute")?;
        }
        lessonmap::cli::Command::Sql(args) => {
            lessonmap::commands::sql(&config, args).context("sql")?;
        }
        lessonmap::cli::Command::Extract(args) => {
            lessonmap::commands::extract(&config, args).context("extract")?;
        }
        lessonmap::cli::Command::Quiz(args) => {
            lessonmap::commands::quiz(args).context("quiz")?;
        }
    }

    Ok(())
}
