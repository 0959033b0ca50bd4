use std::io::Write;

use crate::plan::Plan;

const RULE_WIDTH: usize = 80;

/// Renders the dry-run report of `plan`. Nothing on disk is touched.
pub fn render(plan: &Plan) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    out.push_str(&format!("{rule}\n"));
    out.push_str("DRY RUN REPORT - Content Reorganization\n");
    out.push_str(&format!("{rule}\n"));

    for product in &plan.products {
        out.push_str(&format!("\n{}\n", product.product.as_str().to_uppercase()));
        out.push_str(&format!("{}\n", "-".repeat(60)));

        for module in &product.modules {
            out.push_str(&format!(
                "\n  {} ({} topics)\n",
                module.module,
                module.topics.len()
            ));
            for topic in &module.topics {
                out.push_str(&format!("    {:03}. {}\n", topic.position, topic.title));
                out.push_str(&format!("         Id:    {}\n", topic.id));
                out.push_str(&format!(
                    "         From:  {}\n",
                    topic.original_path.display()
                ));
                out.push_str(&format!("         To:    {}\n", topic.new_path.display()));
                out.push_str(&format!("         Files: {}\n", topic.file_mappings.len()));
            }
        }
    }

    if !plan.warnings.is_empty() {
        out.push_str(&format!("\nWARNINGS ({}):\n", plan.warnings.len()));
        for warning in &plan.warnings {
            out.push_str(&format!("  - {warning}\n"));
        }
    }

    out.push_str(&format!("\n{rule}\n"));
    out.push_str("SUMMARY:\n");
    out.push_str(&format!("  Total Topics: {}\n", plan.topic_count()));
    out.push_str(&format!("  Total Files:  {}\n", plan.file_count()));
    out.push_str(&format!("  Products:     {}\n", plan.products.len()));
    out.push_str(&format!("{rule}\n"));
    out
}

pub fn write(plan: &Plan, mut out: impl Write) -> anyhow::Result<()> {
    out.write_all(render(plan).as_bytes())?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::chapters::ChapterMapping;
    use crate::plan::build_from_snapshot;
    use crate::snapshot::FolderNode;

    #[test]
    fn report_lists_topics_warnings_and_totals() {
        let tree = FolderNode::new("/d")
            .with_subfolder(
                FolderNode::new("/d/Chapter 5 - Claim Center Introduction")
                    .with_file("01_claims_overview.pptx")
                    .with_file("demo.mp4"),
            )
            .with_subfolder(FolderNode::new("/d/Chapter 99 - Unknown").with_file("x.pptx"));
        let plan = build_from_snapshot(
            &tree,
            Path::new("content"),
            &ChapterMapping::builtin(),
            Vec::new(),
        );

        let report = render(&plan);
        assert!(report.contains("CLAIMCENTER"));
        assert!(report.contains("  01-introduction (1 topics)"));
        assert!(report.contains("    001. Claims Overview"));
        assert!(report.contains("Id:    cc-01-001"));
        assert!(report.contains("Files: 2"));
        assert!(report.contains("unknown chapter: Chapter 99 - Unknown"));
        assert!(report.contains("Total Topics: 1"));
        assert!(report.contains("Total Files:  2"));
        assert!(report.contains("Products:     1"));
    }
}
