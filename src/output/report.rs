//! Plain-text report formatting
//!
//! Formats the per-site summary written next to a results artifact, and the
//! two human-readable documents produced by aggregation.

use crate::analysis::SourceReport;
use crate::output::plan::Plan;
use crate::output::tasks::Task;

/// Number of tasks listed in the executive summary
const EXECUTIVE_TOP_TASKS: usize = 5;

/// Formats `{site}.summary.txt` for one successful analysis
pub fn summarize_reports(reports: &[SourceReport]) -> String {
    if reports.is_empty() {
        return "No structured results".to_string();
    }

    let total: usize = reports.iter().map(|r| r.report.len()).sum();
    let mut summary = format!("Total issues: {}\n", total);
    for report in reports {
        summary.push_str(&format!("- {}: {} issues\n", report.source, report.report.len()));
    }
    summary
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".to_string()
    } else {
        items.join(", ")
    }
}

fn task_line(index: usize, task: &Task) -> String {
    format!(
        "{}. [{}] {} (site: {})\n",
        index,
        task.severity.as_str().to_uppercase(),
        task.canonical_text,
        task.site
    )
}

/// Formats `project-tasks.txt`
pub fn format_task_list(plan: &Plan) -> String {
    let mut out = String::new();

    out.push_str(&format!("Project tasks generated from run: {}\n", plan.run_path));
    out.push_str(&format!("Generated: {}\n\n", plan.generated_at));
    out.push_str(&format!(
        "Domains analyzed: {}\n",
        join_or_none(&plan.analyzed_domains)
    ));
    out.push_str(&format!(
        "Domains with errors: {}\n",
        join_or_none(&plan.errored_domains)
    ));
    out.push_str(&format!(
        "Discovered link roots: {}\n",
        join_or_none(&plan.discovered_roots)
    ));
    out.push_str(&format!("Total discovered links: {}\n", plan.discovered_links));
    out.push_str(&format!(
        "Artifacts: {} results, {} errors, {} discovered links\n\n",
        plan.artifact_counts.results, plan.artifact_counts.errors, plan.artifact_counts.discovered
    ));

    if plan.tasks.is_empty() {
        out.push_str("No actionable tasks found.\n");
        out.push_str(
            "Recommendation: Review site for SEO best practices, ensure meta tags, titles, \
             and canonical links are present and valid.\n",
        );
        return out;
    }

    out.push_str("Recommended improvements:\n");
    for (i, task) in plan.tasks.iter().enumerate() {
        out.push_str(&task_line(i + 1, task));
    }
    out
}

/// Formats `executive-summary.txt`
pub fn format_executive_summary(plan: &Plan) -> String {
    let mut out = String::new();

    out.push_str("SEO Executive Summary\n");
    out.push_str("====================\n\n");
    out.push_str(&format!(
        "This report was generated on {} from an automated SEO review of the sites below.\n\n",
        plan.generated_at
    ));

    if plan.analyzed_domains.is_empty() {
        out.push_str("No domains could be fully analyzed due to network or site issues.\n");
    } else {
        out.push_str(&format!(
            "Websites analyzed: {}\n",
            plan.analyzed_domains.join(", ")
        ));
    }
    if !plan.discovered_roots.is_empty() {
        out.push_str(&format!(
            "Crawling discovered {} unique links from: {}\n",
            plan.discovered_links,
            plan.discovered_roots.join(", ")
        ));
    }
    out.push_str(&format!(
        "\nArtifacts produced: {} analysis results, {} errors, {} discovered links.\n\n",
        plan.artifact_counts.results, plan.artifact_counts.errors, plan.artifact_counts.discovered
    ));

    let domain = plan.primary_domain();
    if plan.tasks.is_empty() {
        out.push_str("No critical SEO issues were automatically detected.\n");
        out.push_str(
            "A manual review is still recommended: every page should have a unique title, \
             meta description and canonical link, and images should have descriptive alt attributes.\n",
        );
        out.push_str(&format!(
            "\nKeeping these details in place will help {} stay well indexed.\n",
            domain
        ));
    } else {
        out.push_str("Key SEO recommendations:\n");
        for (i, task) in plan.tasks.iter().take(EXECUTIVE_TOP_TASKS).enumerate() {
            out.push_str(&task_line(i + 1, task));
        }
        if plan.tasks.len() > EXECUTIVE_TOP_TASKS {
            out.push_str(&format!(
                "...and {} more.\n",
                plan.tasks.len() - EXECUTIVE_TOP_TASKS
            ));
        }
        out.push_str(&format!(
            "\nAddressing these {} items, starting with the highest severity, should improve how \
             search engines crawl, index and present {}.\n",
            plan.tasks.len(),
            domain
        ));
    }

    out.push_str(
        "\nFindings come from automated checks and should be confirmed against the live site.\n",
    );
    out.push_str("For questions or a deeper manual audit, please contact the team that ran this review.\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RawFinding;
    use crate::output::plan::ArtifactCounts;
    use crate::output::tasks::Severity;

    fn plan_with(tasks: Vec<Task>) -> Plan {
        Plan {
            generated_at: "2024-05-01T12:00:00.000Z".to_string(),
            run_path: "reports/2024-05-01T12-00-00-000Z".to_string(),
            analyzed_domains: vec!["https://example.com".to_string()],
            errored_domains: vec![],
            discovered_roots: vec![],
            discovered_links: 0,
            artifact_counts: ArtifactCounts {
                results: 1,
                errors: 0,
                discovered: 0,
            },
            tasks,
        }
    }

    fn task(n: usize) -> Task {
        Task {
            site: "https://example.com".to_string(),
            source: "https://example.com/".to_string(),
            title: format!("t{}", n),
            severity: Severity::High,
            canonical_text: format!("Task {}", n),
        }
    }

    #[test]
    fn test_summarize_reports() {
        let reports = vec![
            SourceReport {
                source: "https://a.com/".to_string(),
                report: vec![RawFinding::default(), RawFinding::default()],
            },
            SourceReport {
                source: "https://a.com/about".to_string(),
                report: vec![],
            },
        ];
        assert_eq!(
            summarize_reports(&reports),
            "Total issues: 2\n- https://a.com/: 2 issues\n- https://a.com/about: 0 issues\n"
        );
        assert_eq!(summarize_reports(&[]), "No structured results");
    }

    #[test]
    fn test_task_list_with_tasks() {
        let text = format_task_list(&plan_with(vec![task(1)]));
        assert!(text.contains("Domains with errors: None\n"));
        assert!(text.contains("Recommended improvements:\n1. [HIGH] Task 1 (site: https://example.com)\n"));
    }

    #[test]
    fn test_empty_plan_fallback_text() {
        let text = format_task_list(&plan_with(vec![]));
        assert!(text.contains("No actionable tasks found."));
        assert!(text.contains("Recommendation: Review site for SEO best practices"));

        let summary = format_executive_summary(&plan_with(vec![]));
        assert!(summary.contains("No critical SEO issues were automatically detected."));
        assert!(summary.contains("https://example.com"));
    }

    #[test]
    fn test_executive_summary_truncates_to_top_five() {
        let tasks = (1..=7).map(task).collect();
        let summary = format_executive_summary(&plan_with(tasks));
        assert!(summary.contains("5. [HIGH] Task 5"));
        assert!(!summary.contains("Task 6"));
        assert!(summary.contains("...and 2 more.\n"));
    }

    #[test]
    fn test_executive_summary_without_analyzed_domains() {
        let mut plan = plan_with(vec![]);
        plan.analyzed_domains.clear();
        let summary = format_executive_summary(&plan);
        assert!(summary.contains("No domains could be fully analyzed"));
        assert!(summary.contains("<your website>"));
    }
}
