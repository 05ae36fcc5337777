//! Submit / poll / take job interface for long-running conversions.
//!
//! Each [`JobQueue::poll`] advances the polled job by one step: a pending job starts running,
//! a running job is handed to the [`JobRunner`] and finishes. A remote backend implements
//! [`JobRunner`] the same way the local novel converter does.

use std::collections::HashMap;

use anyhow::{Result, bail};
use log::{info, warn};
use plotline_data::StoryDef;
use regex::Regex;
use time::OffsetDateTime;

use crate::novel::{draft_story_from_chapters, split_chapters};

pub type JobId = u64;

/// Work that can be queued.
pub trait JobRunner {
    type Input;
    type Output;

    /// Short label for log lines.
    fn name(&self) -> &'static str;

    /// Run one job to completion.
    ///
    /// # Errors
    /// - whatever the runner considers a failed job
    fn run(&mut self, input: Self::Input) -> Result<Self::Output>;
}

/// Externally visible state of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed(String),
    /// Never submitted, or already taken.
    Unknown,
}

#[derive(Debug)]
enum JobState<I, O> {
    Pending(I),
    Running(I),
    Done(O),
    Failed(String),
}

#[derive(Debug)]
struct Job<I, O> {
    state: JobState<I, O>,
    submitted: OffsetDateTime,
}

pub struct JobQueue<R: JobRunner> {
    runner: R,
    next_id: JobId,
    jobs: HashMap<JobId, Job<R::Input, R::Output>>,
}

impl<R: JobRunner> JobQueue<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            next_id: 1,
            jobs: HashMap::new(),
        }
    }

    pub fn submit(&mut self, input: R::Input) -> JobId {
        let id = self.next_id;
        self.next_id += 1;
        self.jobs.insert(
            id,
            Job {
                state: JobState::Pending(input),
                submitted: OffsetDateTime::now_utc(),
            },
        );
        info!("{} job {id} submitted", self.runner.name());
        id
    }

    /// Advance the job by one step and report where it stands.
    pub fn poll(&mut self, id: JobId) -> JobStatus {
        let Some(job) = self.jobs.remove(&id) else {
            return JobStatus::Unknown;
        };
        let state = match job.state {
            JobState::Pending(input) => JobState::Running(input),
            JobState::Running(input) => match self.runner.run(input) {
                Ok(output) => {
                    let took = OffsetDateTime::now_utc() - job.submitted;
                    info!("{} job {id} done in {:.3}s", self.runner.name(), took.as_seconds_f64());
                    JobState::Done(output)
                },
                Err(err) => {
                    warn!("{} job {id} failed: {err:#}", self.runner.name());
                    JobState::Failed(format!("{err:#}"))
                },
            },
            finished => finished,
        };
        let status = match &state {
            JobState::Pending(_) => JobStatus::Pending,
            JobState::Running(_) => JobStatus::Running,
            JobState::Done(_) => JobStatus::Done,
            JobState::Failed(msg) => JobStatus::Failed(msg.clone()),
        };
        self.jobs.insert(
            id,
            Job {
                state,
                submitted: job.submitted,
            },
        );
        status
    }

    /// Remove a finished job and hand back its output.
    ///
    /// A failed job is removed too and yields `None`; its message was reported by
    /// [`JobQueue::poll`]. Pending and running jobs stay queued.
    pub fn take(&mut self, id: JobId) -> Option<R::Output> {
        match self.jobs.get(&id)?.state {
            JobState::Pending(_) | JobState::Running(_) => return None,
            JobState::Done(_) | JobState::Failed(_) => {},
        }
        match self.jobs.remove(&id)?.state {
            JobState::Done(output) => Some(output),
            _ => None,
        }
    }

    /// Jobs still held by the queue, finished or not.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Poll until the job finishes, then take its output.
    ///
    /// # Errors
    /// - if the job is unknown or fails
    pub fn wait(&mut self, id: JobId) -> Result<R::Output> {
        loop {
            match self.poll(id) {
                JobStatus::Pending | JobStatus::Running => {},
                JobStatus::Done => break,
                JobStatus::Failed(msg) => {
                    self.take(id);
                    bail!("job {id} failed: {msg}");
                },
                JobStatus::Unknown => bail!("no job with id {id}"),
            }
        }
        match self.take(id) {
            Some(output) => Ok(output),
            None => bail!("job {id} finished without output"),
        }
    }
}

/// Plain-text novel to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelSource {
    pub title: String,
    pub text: String,
}

/// Local novel converter: splits chapters and drafts a linear story.
#[derive(Debug, Clone)]
pub struct NovelConversionRunner {
    heading: Regex,
}

impl NovelConversionRunner {
    pub fn new(heading: Regex) -> Self {
        Self { heading }
    }
}

impl JobRunner for NovelConversionRunner {
    type Input = NovelSource;
    type Output = StoryDef;

    fn name(&self) -> &'static str {
        "novel conversion"
    }

    fn run(&mut self, input: NovelSource) -> Result<StoryDef> {
        let chapters = split_chapters(&input.text, &self.heading, &input.title);
        if chapters.is_empty() {
            bail!("'{}' contains no text to convert", input.title);
        }
        Ok(draft_story_from_chapters(&input.title, &chapters))
    }
}
