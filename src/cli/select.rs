//! Select command implementation.
//!
//! Prints the matches as JSON. With `--output`, also writes the documents
//! with their synthetic ids filled in, so that later `transform` runs (or
//! other tools) can address the same elements by id.

use anyhow::{Context, Result};
use serde::Serialize;

use super::args::SelectArgs;
use super::common::{
    Job, collect_inputs, finish, partition_results, plan_jobs, print_json, run_jobs,
    write_document,
};
use crate::config::ToolConfig;
use crate::log;
use crate::svg::{Document, MatchResult, SelectorQuery, select};
use crate::utils::plural_count;

/// Matches of one input, used when several inputs are selected at once.
#[derive(Debug, Serialize)]
struct FileMatches<'a> {
    path: String,
    elements: &'a [MatchResult],
}

/// Execute select command
pub fn run_select(args: &SelectArgs, config: &ToolConfig) -> Result<()> {
    let jobs = plan_jobs(collect_inputs(&args.io.paths)?, args.io.output.as_deref())?;
    let query = SelectorQuery::parse(&args.selector);

    let results = run_jobs(&jobs, |job| select_job(job, &query));
    let (succeeded, failed) = partition_results(&jobs, &results);

    let total: usize = succeeded.iter().map(|(_, matches)| matches.len()).sum();
    log!(
        "select";
        "`{}` matched {} in {}",
        args.selector,
        plural_count(total, "element"),
        plural_count(succeeded.len(), "document")
    );

    if jobs.len() == 1 {
        if let Some((_, matches)) = succeeded.first() {
            print_json(matches, config.output.pretty)?;
        }
    } else {
        let files: Vec<FileMatches<'_>> = succeeded
            .iter()
            .map(|(job, matches)| FileMatches {
                path: job.input.to_string(),
                elements: matches,
            })
            .collect();
        print_json(&files, config.output.pretty)?;
    }

    finish(failed, jobs.len())
}

fn select_job(job: &Job, query: &SelectorQuery) -> Result<Vec<MatchResult>> {
    let text = job.input.read()?;
    let mut document = Document::parse(&text).context("Failed to parse document")?;
    let matches = select(&mut document, query);

    if let Some(output) = &job.output {
        write_document(Some(output), &document.to_xml())?;
    }
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::common::Input;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_select_job_writes_assigned_ids() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in.svg");
        let output = temp.path().join("out.svg");
        fs::write(&input, r#"<svg><rect/><rect id="b"/></svg>"#).unwrap();

        let job = Job {
            input: Input::File(input),
            output: Some(output.clone()),
        };
        let matches = select_job(&job, &SelectorQuery::parse("rect")).unwrap();

        let ids: Vec<_> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["_selected_0", "b"]);
        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            r#"<svg><rect id="_selected_0"/><rect id="b"/></svg>"#
        );
    }

    #[test]
    fn test_select_job_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("broken.svg");
        fs::write(&input, "<svg><g></svg>").unwrap();

        let job = Job {
            input: Input::File(input),
            output: None,
        };
        let err = select_job(&job, &SelectorQuery::parse("g")).unwrap_err();
        assert!(err.to_string().contains("Failed to parse document"));
    }

    #[test]
    fn test_file_matches_json() {
        let elements = [];
        let value = serde_json::to_value(FileMatches {
            path: "a.svg".to_string(),
            elements: &elements,
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({"path": "a.svg", "elements": []}));
    }
}
