//! Transform command implementation.

use std::fs;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use super::args::TransformArgs;
use super::common::{
    Job, collect_inputs, finish, partition_results, plan_jobs, print_json, require_output_dir,
    run_jobs, write_document,
};
use crate::config::ToolConfig;
use crate::log;
use crate::svg::{TransformOutcome, TransformRequest, transform_matching};
use crate::utils::plural_count;

/// Outcome of one input, used for `--report` with several inputs.
#[derive(Debug, Serialize)]
struct FileOutcome<'a> {
    path: String,
    #[serde(flatten)]
    outcome: &'a TransformOutcome,
}

/// Execute transform command
pub fn run_transform(args: &TransformArgs, config: &ToolConfig) -> Result<()> {
    let request = load_request(args)?;
    for key in request.ignored_keys() {
        log!("warning"; "ignoring unknown request key `{}`", key);
    }

    let jobs = plan_jobs(collect_inputs(&args.io.paths)?, args.io.output.as_deref())?;
    if !args.report {
        require_output_dir(&jobs, "transform")?;
    }

    let to_stdout = !args.report;
    let results = run_jobs(&jobs, |job| transform_job(job, &args.selector, &request, to_stdout));
    let (succeeded, mut failed) = partition_results(&jobs, &results);

    let (mut matched, mut transformed) = (0, 0);
    for (job, outcome) in &succeeded {
        match &outcome.error {
            Some(error) => {
                log!("error"; "{}: {}", job.input, error);
                failed += 1;
            }
            None => {
                matched += outcome.matched_elements;
                transformed += 1;
            }
        }
    }
    log!(
        "transform";
        "transformed {} in {}",
        plural_count(matched, "element"),
        plural_count(transformed, "document")
    );

    if args.report {
        if jobs.len() == 1 {
            if let Some((_, outcome)) = succeeded.first() {
                print_json(outcome, config.output.pretty)?;
            }
        } else {
            let files: Vec<FileOutcome<'_>> = succeeded
                .iter()
                .map(|(job, outcome)| FileOutcome {
                    path: job.input.to_string(),
                    outcome,
                })
                .collect();
            print_json(&files, config.output.pretty)?;
        }
    }

    finish(failed, jobs.len())
}

fn load_request(args: &TransformArgs) -> Result<TransformRequest> {
    let json = match (&args.request, &args.request_file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read `{}`", path.display()))?,
        (None, None) => bail!("a transform request is required (--request or --request-file)"),
    };
    TransformRequest::from_json(&json).context("Invalid transform request")
}

/// Transform one input. The document is written only on success; a failed
/// outcome leaves the input as the only copy.
fn transform_job(
    job: &Job,
    selector: &str,
    request: &TransformRequest,
    to_stdout: bool,
) -> Result<TransformOutcome> {
    let text = job.input.read()?;
    let outcome = transform_matching(&text, selector, request);

    if outcome.success {
        match &job.output {
            Some(path) => write_document(Some(path), &outcome.modified_document)?,
            None if to_stdout => write_document(None, &outcome.modified_document)?,
            None => {}
        }
    }
    Ok(outcome)
}
