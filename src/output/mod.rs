//! Output module for turning run artifacts into a remediation plan
//!
//! This module handles:
//! - Normalizing raw findings and mapping them to canonical task texts
//! - Ranking tasks by severity
//! - Building and writing the plan, task list and executive summary
//! - Formatting per-site issue summaries

mod plan;
mod report;
mod tasks;

pub use plan::{
    aggregate_run, write_plan_outputs, ArtifactCounts, Plan, EXECUTIVE_SUMMARY_TXT, PLAN_JSON,
    TASKS_TXT,
};
pub use report::{format_executive_summary, format_task_list, summarize_reports};
pub use tasks::{
    canonical_text, error_task, finding_from_value, map_findings_to_tasks, rank_tasks,
    CanonicalRule, Finding, Severity, Task, CANONICAL_RULES,
};
