use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cli::{ExecuteArgs, ExtractArgs, QuizArgs, SqlArgs};
use crate::config::Config;
use crate::extract::CommandExtractor;

pub fn plan(config: &Config) -> anyhow::Result<()> {
    let plan = config.build_plan()?;
    crate::report::write(&plan, std::io::stdout().lock()).context("write dry-run report")?;
    Ok(())
}

pub fn execute(config: &Config, args: ExecuteArgs) -> anyhow::Result<()> {
    let plan = config.build_plan()?;

    if !args.yes && !confirm()? {
        println!("Cancelled.");
        return Ok(());
    }

    let summary = crate::execute::run(&plan);
    print!("{}", crate::execute::render_summary(&summary));

    if args.no_sql {
        return Ok(());
    }
    let sql_out = PathBuf::from(&args.sql_out);
    match crate::sql::write(&plan, args.sql_style, &sql_out) {
        Ok(()) => println!("SQL import script generated: {}", sql_out.display()),
        Err(err) => {
            tracing::warn!(err = %format!("{err:#}"), "sql emission failed");
            eprintln!("SQL import script not written: {err:#}");
        }
    }
    Ok(())
}

pub fn sql(config: &Config, args: SqlArgs) -> anyhow::Result<()> {
    let plan = config.build_plan()?;
    let out = PathBuf::from(&args.out);
    crate::sql::write(&plan, args.style, &out).context("write sql import script")?;
    println!("SQL import script generated: {}", out.display());
    Ok(())
}

pub fn extract(config: &Config, args: ExtractArgs) -> anyhow::Result<()> {
    let plan = config.build_plan()?;
    let out_dir = args
        .out
        .map(PathBuf::from)
        .unwrap_or_else(|| config.content_dir.join("extracted"));
    let extractor = CommandExtractor::new(args.extractor);

    let summary = crate::extract::run(&plan, &extractor, &out_dir).context("extract content")?;
    println!("Content extraction complete.");
    println!("  Topics written:   {}", summary.topics_written);
    println!("  Slides extracted: {}", summary.slides);
    println!("  Assignment pages: {}", summary.assignment_pages);
    println!("  Failed files:     {}", summary.failed_files.len());
    println!("  Output directory: {}", out_dir.display());
    Ok(())
}

pub fn quiz(args: QuizArgs) -> anyhow::Result<()> {
    let quiz = crate::quiz::load(Path::new(&args.template))?;
    let out = args
        .out
        .map(PathBuf::from)
        .unwrap_or_else(|| crate::quiz::default_output_path(&quiz));
    crate::quiz::write(&quiz, &out).context("write quiz sql")?;

    println!("Parsed quiz: {}", quiz.title);
    println!("  Topic:         {} ({})", quiz.topic_title, quiz.topic_code);
    println!("  Questions:     {}", quiz.questions.len());
    println!("  Passing score: {}%", quiz.passing_score);
    for warning in &quiz.warnings {
        println!("  Skipped:       {warning}");
    }
    println!("Quiz SQL generated: {}", out.display());
    Ok(())
}

fn confirm() -> anyhow::Result<bool> {
    println!("WARNING: This will reorganize all content files!");
    let answer = if std::io::stdin().is_terminal() {
        dialoguer::Input::<String>::new()
            .with_prompt("Are you sure? Type 'yes' to continue")
            .allow_empty(true)
            .interact_text()
            .context("read confirmation")?
    } else {
        let mut line = String::new();
        std::io::stdin()
            .read_line(&mut line)
            .context("read confirmation from stdin")?;
        line
    };
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}
