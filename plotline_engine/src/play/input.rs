//! Terminal input for the preview loop.
//!
//! On a terminal, lines go through `rustyline` with persistent history and tab completion of
//! the answers the current beat accepts. Piped or scripted input is read as plain lines.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

/// Outcome of reading a line from the preview prompt.
pub enum InputEvent {
    Line(String),
    Eof,
    Interrupted,
}

type PreviewEditor = Editor<PreviewHelper, DefaultHistory>;

/// Completes whatever the play loop last offered through [`InputManager::set_completions`].
#[derive(Default)]
struct PreviewHelper {
    terms: Vec<String>,
}

impl Helper for PreviewHelper {}

impl Completer for PreviewHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, matches) = complete_terms(&self.terms, line, pos);
        let pairs = matches
            .into_iter()
            .map(|term| Pair {
                display: term.to_string(),
                replacement: term.to_string(),
            })
            .collect();
        Ok((start, pairs))
    }
}

impl Hinter for PreviewHelper {
    type Hint = String;
}

impl Highlighter for PreviewHelper {}

impl Validator for PreviewHelper {}

/// Terms matching what has been typed before `pos`, and where the replacement starts.
///
/// The whole line is matched first (`buy 2`); when nothing matches a multi-word line, only
/// its last word is completed, so sequences like `up left do` complete to `down`.
fn complete_terms<'t>(terms: &'t [String], line: &str, pos: usize) -> (usize, Vec<&'t str>) {
    let typed = &line[..pos];
    let start = typed.len() - typed.trim_start().len();
    let whole = typed[start..].to_lowercase();
    let matches: Vec<&str> = terms
        .iter()
        .filter(|term| term.starts_with(&whole))
        .map(String::as_str)
        .collect();
    if !matches.is_empty() || !whole.contains(char::is_whitespace) {
        return (start, matches);
    }

    let word_start = typed
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    let word = typed[word_start..].to_lowercase();
    let words = terms
        .iter()
        .filter(|term| !term.contains(' ') && !term.starts_with(':') && term.starts_with(&word))
        .map(String::as_str)
        .collect();
    (word_start, words)
}

/// Reads preview input from the line editor when there is one, plain stdin otherwise.
pub struct InputManager {
    editor: Option<PreviewEditor>,
    history_path: Option<PathBuf>,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        if !io::stdin().is_terminal() {
            info!("stdin is not a terminal; reading plain lines");
            return Self::plain();
        }
        match open_editor() {
            Ok((editor, history_path)) => {
                info!("preview input through rustyline");
                Self {
                    editor: Some(editor),
                    history_path,
                }
            },
            Err(err) => {
                warn!("line editor unavailable ({err}); reading plain lines");
                Self::plain()
            },
        }
    }

    /// Plain stdin lines: no history, no completion.
    pub fn plain() -> Self {
        Self {
            editor: None,
            history_path: None,
        }
    }

    /// Answers offered on tab at the next prompt.
    pub fn set_completions(&mut self, terms: Vec<String>) {
        if let Some(helper) = self.editor.as_mut().and_then(|editor| editor.helper_mut()) {
            helper.terms = terms;
        }
    }

    /// Read a line. If the line editor breaks, switch to plain stdin for good and retry.
    ///
    /// # Errors
    /// - if reading from stdin fails
    pub fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        let Some(editor) = self.editor.as_mut() else {
            return read_plain(prompt);
        };
        match editor.readline(prompt) {
            Ok(line) => {
                self.remember(&line);
                Ok(InputEvent::Line(line))
            },
            Err(ReadlineError::Interrupted) => Ok(InputEvent::Interrupted),
            Err(ReadlineError::Eof) => Ok(InputEvent::Eof),
            Err(err) => {
                warn!("line editor failed ({err}); switching to plain lines");
                self.editor = None;
                read_plain(prompt)
            },
        }
    }

    fn remember(&mut self, line: &str) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        if line.trim().is_empty() {
            return;
        }
        if let Err(err) = editor.add_history_entry(line) {
            warn!("failed to append to preview history: {err}");
        }
        if let Some(path) = &self.history_path
            && let Err(err) = editor.save_history(path)
        {
            warn!("failed to save preview history to {}: {err}", path.display());
        }
    }
}

fn open_editor() -> rustyline::Result<(PreviewEditor, Option<PathBuf>)> {
    let mut editor = PreviewEditor::new()?;
    editor.set_helper(Some(PreviewHelper::default()));
    let history_path = history_file_path();
    if let Some(path) = &history_path {
        load_history(&mut editor, path);
    }
    Ok((editor, history_path))
}

fn load_history(editor: &mut PreviewEditor, path: &Path) {
    if let Some(dir) = path.parent()
        && let Err(err) = fs::create_dir_all(dir)
    {
        warn!("failed to create history directory {}: {err}", dir.display());
    }
    match editor.load_history(path) {
        Ok(()) => {},
        Err(ReadlineError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
            info!("no preview history at {} yet", path.display());
        },
        Err(err) => warn!("failed to load preview history from {}: {err}", path.display()),
    }
}

fn read_plain(prompt: &str) -> io::Result<InputEvent> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(InputEvent::Eof);
    }
    Ok(InputEvent::Line(line.trim_end_matches(['\n', '\r']).to_string()))
}

fn history_file_path() -> Option<PathBuf> {
    dirs::data_dir()
        .or_else(dirs::data_local_dir)
        .map(|base| base.join("plotline").join("preview_history.txt"))
}
