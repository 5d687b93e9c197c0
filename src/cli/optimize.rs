//! Optimize command implementation.

use anyhow::Result;

use super::args::OptimizeArgs;
use super::common::{
    Job, collect_inputs, finish, partition_results, plan_jobs, require_output_dir, run_jobs,
    write_document,
};
use crate::config::ToolConfig;
use crate::log;
use crate::svg::{OptimizeOptions, OptimizeStats, optimize};
use crate::utils::byte_size;

/// Execute optimize command
pub fn run_optimize(args: &OptimizeArgs, config: &ToolConfig) -> Result<()> {
    let options = config.optimize.options();
    let jobs = plan_jobs(collect_inputs(&args.io.paths)?, args.io.output.as_deref())?;
    require_output_dir(&jobs, "optimize")?;

    let results = run_jobs(&jobs, |job| optimize_job(job, &options));
    let (succeeded, failed) = partition_results(&jobs, &results);

    for (job, stats) in &succeeded {
        log!(
            "optimize";
            "{}: {} -> {} ({}% smaller, {})",
            job.input,
            byte_size(stats.original_size_bytes),
            byte_size(stats.optimized_size_bytes),
            stats.percentage_reduction,
            stats.level
        );
    }
    if succeeded.len() > 1 {
        let saved: i64 = succeeded.iter().map(|(_, stats)| stats.bytes_saved).sum();
        log!("optimize"; "saved {} bytes in total", saved);
    }

    finish(failed, jobs.len())
}

fn optimize_job(job: &Job, options: &OptimizeOptions) -> Result<OptimizeStats> {
    let text = job.input.read()?;
    let report = optimize(&text, options);
    write_document(job.output.as_deref(), &report.document)?;
    Ok(report.stats)
}
