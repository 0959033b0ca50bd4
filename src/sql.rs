use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;

use crate::metadata;
use crate::plan::Plan;

/// How topic rows are keyed in the generated import script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SqlStyle {
    /// The topic id is the primary key.
    #[default]
    TopicId,
    /// `gen_random_uuid()` primary key; the topic id goes into `code`.
    Uuid,
}

/// Renders the upsert script for every topic of `plan`.
pub fn render(plan: &Plan, style: SqlStyle) -> anyhow::Result<String> {
    let mut sql = String::new();
    sql.push_str(header(style));

    for product in &plan.products {
        for module in &product.modules {
            for topic in &module.topics {
                let meta = metadata::derive(topic);
                let content_json =
                    serde_json::to_string(&meta.files).context("serialize topic content json")?;

                let (columns, key) = match style {
                    SqlStyle::TopicId => (
                        "  id,\n".to_owned(),
                        format!("  {},\n", quote(&meta.id)),
                    ),
                    SqlStyle::Uuid => (
                        "  id,\n  code,\n".to_owned(),
                        format!("  gen_random_uuid(),\n  {},\n", quote(&meta.id)),
                    ),
                };
                let conflict = match style {
                    SqlStyle::TopicId => "id",
                    SqlStyle::Uuid => "code",
                };

                sql.push_str("\nINSERT INTO topics (\n");
                sql.push_str(&columns);
                sql.push_str("  product_id,\n  position,\n  title,\n  description,\n");
                sql.push_str("  duration_minutes,\n  prerequisites,\n  content,\n  published\n");
                sql.push_str(") VALUES (\n");
                sql.push_str(&key);
                sql.push_str(&format!(
                    "  (SELECT id FROM products WHERE code = {}),\n",
                    quote(topic.product.sql_code())
                ));
                sql.push_str(&format!("  {},\n", meta.position));
                sql.push_str(&format!("  {},\n", quote(&meta.title)));
                sql.push_str(&format!("  {},\n", quote(&meta.description)));
                sql.push_str(&format!("  {},\n", meta.duration_minutes));
                sql.push_str("  '[]'::jsonb,\n");
                sql.push_str(&format!("  {}::jsonb,\n", quote(&content_json)));
                sql.push_str("  true\n");
                sql.push_str(&format!(") ON CONFLICT ({conflict}) DO UPDATE SET\n"));
                sql.push_str("  title = EXCLUDED.title,\n");
                sql.push_str("  description = EXCLUDED.description,\n");
                sql.push_str("  duration_minutes = EXCLUDED.duration_minutes,\n");
                sql.push_str("  content = EXCLUDED.content;\n");
            }
        }
    }

    Ok(sql)
}

fn header(style: SqlStyle) -> &'static str {
    match style {
        SqlStyle::TopicId => {
            "-- Auto-generated topic import script\n\
-- Run this in the SQL editor after reorganization\n"
        }
        SqlStyle::Uuid => {
            "-- Auto-generated topic import script (UUID keys)\n\
-- Run this in the SQL editor after reorganization.\n\
--\n\
-- This script uses:\n\
--   - gen_random_uuid() for the 'id' column (UUID primary key)\n\
--   - Sequential codes like 'pc-04-001' for the 'code' column (for prerequisites)\n\
--\n\
-- The 'topics' table must already have a unique 'code' column.\n"
        }
    }
}

/// SQL string literal with embedded single quotes doubled.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Writes the rendered script to `out_path`, replacing an earlier one.
pub fn write(plan: &Plan, style: SqlStyle, out_path: &Path) -> anyhow::Result<()> {
    let sql = render(plan, style).context("render import sql")?;
    write_script(out_path, &sql)?;

    tracing::info!(out = %out_path.display(), topics = plan.topic_count(), "sql import script written");
    Ok(())
}

/// Creates the parent dir of `out_path` and truncates any earlier script there.
pub fn write_script(out_path: &Path, sql: &str) -> anyhow::Result<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create sql output dir: {}", parent.display()))?;
    }

    let mut out = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(out_path)
        .with_context(|| format!("open sql output: {}", out_path.display()))?;
    out.write_all(sql.as_bytes())
        .with_context(|| format!("write sql output: {}", out_path.display()))?;
    out.flush()
        .with_context(|| format!("flush sql output: {}", out_path.display()))?;
    Ok(())
}
