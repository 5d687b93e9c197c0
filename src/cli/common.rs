//! Common utilities shared across CLI commands.
//!
//! Every command reads one or more documents, turns each into a [`Job`] that
//! knows where its result goes, and runs the jobs in parallel with rayon.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use serde::Serialize;

use crate::log;
use crate::utils::plural_count;

/// File name used for stdin input when writing into an output directory.
pub const STDIN_FILE_NAME: &str = "stdin.svg";

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    pub fn read(&self) -> Result<String> {
        match self {
            Self::Stdin => {
                let mut text = String::new();
                io::stdin()
                    .lock()
                    .read_to_string(&mut text)
                    .context("Failed to read stdin")?;
                Ok(text)
            }
            Self::File(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read `{}`", path.display())),
        }
    }

    fn file_name(&self) -> &OsStr {
        match self {
            Self::Stdin => OsStr::new(STDIN_FILE_NAME),
            Self::File(path) => path.file_name().unwrap_or(path.as_os_str()),
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Turn CLI paths into inputs. No paths means stdin.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<Input>> {
    if paths.is_empty() {
        return Ok(vec![Input::Stdin]);
    }

    let inputs: Vec<Input> = paths
        .iter()
        .map(|path| {
            if path.as_os_str() == "-" {
                Input::Stdin
            } else {
                Input::File(path.clone())
            }
        })
        .collect();

    if inputs.iter().filter(|input| **input == Input::Stdin).count() > 1 {
        bail!("stdin (`-`) can only be read once");
    }
    Ok(inputs)
}

/// One input and the place its resulting document is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: Input,
    /// `None` means stdout (or nowhere, for commands whose stdout is JSON).
    pub output: Option<PathBuf>,
}

/// Pair inputs with outputs.
///
/// A single input writes to `output` as a file. Several inputs treat
/// `output` as a directory and keep each input's file name.
pub fn plan_jobs(inputs: Vec<Input>, output: Option<&Path>) -> Result<Vec<Job>> {
    if let [input] = inputs.as_slice() {
        return Ok(vec![Job {
            input: input.clone(),
            output: output.map(Path::to_path_buf),
        }]);
    }

    let Some(dir) = output else {
        return Ok(inputs
            .into_iter()
            .map(|input| Job {
                input,
                output: None,
            })
            .collect());
    };

    let mut seen = HashSet::new();
    let mut jobs = Vec::with_capacity(inputs.len());
    for input in inputs {
        let name = input.file_name().to_os_string();
        if !seen.insert(name.clone()) {
            bail!(
                "several inputs are named `{}`; they would overwrite each other in `{}`",
                name.to_string_lossy(),
                dir.display()
            );
        }
        jobs.push(Job {
            output: Some(dir.join(&name)),
            input,
        });
    }
    Ok(jobs)
}

/// Fail early when several documents would all go to stdout.
pub fn require_output_dir(jobs: &[Job], command: &str) -> Result<()> {
    if jobs.len() > 1 && jobs.iter().any(|job| job.output.is_none()) {
        bail!("{command} with several inputs needs --output <DIR>");
    }
    Ok(())
}

/// Run `f` on every job in parallel, keeping job order in the results.
pub fn run_jobs<T, F>(jobs: &[Job], f: F) -> Vec<Result<T>>
where
    T: Send,
    F: Fn(&Job) -> Result<T> + Sync + Send,
{
    jobs.par_iter().map(f).collect()
}

/// Log failed jobs and return the successful ones with their jobs.
pub fn partition_results<'a, T>(
    jobs: &'a [Job],
    results: &'a [Result<T>],
) -> (Vec<(&'a Job, &'a T)>, usize) {
    let mut succeeded = Vec::with_capacity(results.len());
    let mut failed = 0;
    for (job, result) in jobs.iter().zip(results) {
        match result {
            Ok(value) => succeeded.push((job, value)),
            Err(err) => {
                log!("error"; "{}: {:#}", job.input, err);
                failed += 1;
            }
        }
    }
    (succeeded, failed)
}

/// Turn a failure count into the command's final result.
pub fn finish(failed: usize, total: usize) -> Result<()> {
    if failed > 0 {
        bail!("{} of {} failed", plural_count(failed, "input"), total);
    }
    Ok(())
}

/// Write a document to `output`, or to stdout when `None`.
pub fn write_document(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create `{}`", parent.display()))?;
            }
            fs::write(path, text).with_context(|| format!("Failed to write `{}`", path.display()))
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Print a value as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<()> {
    let formatted = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", formatted);
    Ok(())
}
