#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Plotline **
//! Authoring tool for branching visual novels: check, migrate, graph, export, and preview stories.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::info;

use plotline_data::{StoryDef, migrate_document, validate_story};
use plotline_engine::config::{PlotlineConfig, resolve_config};
use plotline_engine::document::{export_story_to_dir, import_story_file};
use plotline_engine::graph::StoryGraph;
use plotline_engine::jobs::{JobQueue, NovelConversionRunner, NovelSource};
use plotline_engine::novel::heading_regex;
use plotline_engine::play::run_preview;
use plotline_engine::style::StoryStyle;
use plotline_engine::titles::earned_titles;

#[derive(Parser)]
#[command(author, version, about = "Authoring tools for branching visual novels.")]
struct Cli {
    /// Configuration file (defaults to ./plotline.toml, then the user config dir).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a story and report errors and lints.
    Check(CheckArgs),
    /// Upgrade a story document to the current schema.
    Migrate(MigrateArgs),
    /// Print the scene graph with unreachable, incomplete, and dangling scenes.
    Graph(StoryArg),
    /// Normalize a story and write it as `<slug>.json`.
    Export(ExportArgs),
    /// List titles earned with the story's stored values.
    Titles(StoryArg),
    /// Draft a story from a plain-text novel.
    ImportNovel(ImportNovelArgs),
    /// Play through a story in the terminal.
    Play(StoryArg),
}

#[derive(Args)]
struct StoryArg {
    /// Story JSON file.
    story: PathBuf,
}

#[derive(Args)]
struct CheckArgs {
    story: PathBuf,
    /// Treat lints as failures.
    #[arg(long)]
    strict: bool,
}

#[derive(Args)]
struct MigrateArgs {
    story: PathBuf,
    /// Write here instead of printing to stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct ExportArgs {
    story: PathBuf,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args)]
struct ImportNovelArgs {
    /// Plain-text novel.
    novel: PathBuf,
    /// Story title (defaults to the file name).
    #[arg(long)]
    title: Option<String>,
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref());
    match run(cli.command, &config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".error_style());
            ExitCode::FAILURE
        },
    }
}

fn run(command: Commands, config: &PlotlineConfig) -> Result<ExitCode> {
    match command {
        Commands::Check(args) => check(&args.story, args.strict),
        Commands::Migrate(args) => migrate(&args.story, args.out.as_deref()),
        Commands::Graph(args) => graph(&args.story),
        Commands::Export(args) => export(&args.story, &args.out_dir, config),
        Commands::Titles(args) => titles(&args.story),
        Commands::ImportNovel(args) => import_novel(&args, config),
        Commands::Play(args) => {
            let story = load_story(&args.story)?;
            run_preview(&story, config)?;
            Ok(ExitCode::SUCCESS)
        },
    }
}

fn load_story(path: &Path) -> Result<StoryDef> {
    let story = import_story_file(path).with_context(|| format!("loading story from '{}'", path.display()))?;
    info!("loaded story '{}' from {}", story.title, path.display());
    Ok(story)
}

fn check(path: &Path, strict: bool) -> Result<ExitCode> {
    let story = load_story(path)?;
    let issues = validate_story(&story);
    let (lints, errors): (Vec<_>, Vec<_>) = issues.iter().partition(|issue| issue.is_lint());
    for issue in &errors {
        println!("{} {issue}", "error".error_style());
    }
    for issue in &lints {
        println!("{} {issue}", "lint".lint_style());
    }
    println!(
        "{}: {} scenes, {} errors, {} lints",
        story.title,
        story.scenes.len(),
        errors.len(),
        lints.len()
    );
    if !errors.is_empty() || (strict && !lints.is_empty()) {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn migrate(path: &Path, out: Option<&Path>) -> Result<ExitCode> {
    let text = fs::read_to_string(path).with_context(|| format!("reading '{}'", path.display()))?;
    let doc = serde_json::from_str(&text).with_context(|| format!("parsing '{}'", path.display()))?;
    let upgraded = migrate_document(doc).with_context(|| format!("migrating '{}'", path.display()))?;
    let json = serde_json::to_string_pretty(&upgraded).context("serializing migrated story")?;
    match out {
        Some(out) => {
            fs::write(out, json).with_context(|| format!("writing '{}'", out.display()))?;
            println!("migrated story written to {}", out.display());
        },
        None => println!("{json}"),
    }
    Ok(ExitCode::SUCCESS)
}

fn graph(path: &Path) -> Result<ExitCode> {
    let story = load_story(path)?;
    let graph = StoryGraph::build(&story);
    for edge in graph.edges() {
        println!("{} -> {} {}", edge.from, edge.to, edge.kind.to_string().section_style());
    }
    report("unreachable", &graph.unreachable_scenes());
    let incomplete: Vec<&str> = graph.incomplete_scenes().iter().map(String::as_str).collect();
    report("incomplete", &incomplete);
    let dangling: Vec<&str> = graph.dangling_edges().into_iter().map(|e| e.to.as_str()).collect();
    report("dangling", &dangling);
    Ok(ExitCode::SUCCESS)
}

fn report(label: &str, ids: &[&str]) {
    if !ids.is_empty() {
        println!("{} {}", format!("{label}:").lint_style(), ids.join(", "));
    }
}

fn export(path: &Path, out_dir: &Path, config: &PlotlineConfig) -> Result<ExitCode> {
    let story = load_story(path)?;
    let written = export_story_to_dir(&story, out_dir, config.export.pretty)
        .with_context(|| format!("exporting '{}'", story.title))?;
    println!("exported to {}", written.display());
    Ok(ExitCode::SUCCESS)
}

fn titles(path: &Path) -> Result<ExitCode> {
    let story = load_story(path)?;
    let earned = earned_titles(&story.titles, &story.global_values);
    if earned.is_empty() {
        println!("no titles earned");
    }
    for title in earned {
        match &title.description {
            Some(desc) => println!("{} - {desc}", title.name.title_earned_style()),
            None => println!("{}", title.name.title_earned_style()),
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn import_novel(args: &ImportNovelArgs, config: &PlotlineConfig) -> Result<ExitCode> {
    let is_txt = args
        .novel
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
    if !is_txt {
        bail!("'{}' is not a .txt file", args.novel.display());
    }
    let text = fs::read_to_string(&args.novel).with_context(|| format!("reading '{}'", args.novel.display()))?;
    let title = match &args.title {
        Some(title) => title.clone(),
        None => args
            .novel
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("Untitled")
            .to_string(),
    };
    let heading = heading_regex(config.novel.chapter_heading.as_deref()).context("compiling chapter heading pattern")?;

    let mut queue = JobQueue::new(NovelConversionRunner::new(heading));
    let job = queue.submit(NovelSource { title, text });
    let story = queue.wait(job)?;
    println!(
        "drafted {} scenes from {} chapters",
        story.scenes.len(),
        story.chapters.len()
    );
    let written = export_story_to_dir(&story, &args.out_dir, config.export.pretty)?;
    println!("story written to {}", written.display());
    Ok(ExitCode::SUCCESS)
}
