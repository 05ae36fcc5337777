//! Quick-time events and dialogue tasks.
//!
//! A qte's `qteType` selects which input spec applies: action QTEs read
//! `keySequence`, combo QTEs read `directionSequence`, unlock QTEs read
//! `unlockPattern`. The other sequences are ignored. Dialogue tasks are judged by a
//! [`ResponseJudge`]; the default only checks answer length until a real judge exists.

use plotline_data::{DialogueTaskDef, Direction, QteDef, QteType};

/// Input the player must reproduce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QteInput<'a> {
    Keys(&'a [String]),
    Directions(&'a [Direction]),
    Pattern(&'a [u32]),
}

/// Everything a QTE renderer needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QteSpec<'a> {
    pub qte_type: QteType,
    pub prompt: Option<&'a str>,
    pub time_limit: f64,
    pub input: QteInput<'a>,
}

/// Pick the input spec that matters for the qte's type.
///
/// A missing sequence yields an empty one, which no attempt can match.
pub fn input_spec(qte: &QteDef) -> QteSpec<'_> {
    let input = match qte.qte_type {
        QteType::Action => QteInput::Keys(qte.key_sequence.as_deref().unwrap_or_default()),
        QteType::Combo => QteInput::Directions(qte.direction_sequence.as_deref().unwrap_or_default()),
        QteType::Unlock => QteInput::Pattern(qte.unlock_pattern.as_deref().unwrap_or_default()),
    };
    QteSpec {
        qte_type: qte.qte_type,
        prompt: qte.prompt.as_deref(),
        time_limit: qte.time_limit,
        input,
    }
}

/// What the player entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QteResponse {
    Keys(Vec<String>),
    Directions(Vec<Direction>),
    Pattern(Vec<u32>),
}

impl QteResponse {
    /// Parse whitespace- or comma-separated input for the given qte type.
    ///
    /// Directions accept `up`/`u`, `down`/`d`, `left`/`l`, `right`/`r`; patterns accept cell numbers.
    pub fn parse(qte_type: QteType, raw: &str) -> Option<QteResponse> {
        let tokens = raw
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty());
        match qte_type {
            QteType::Action => Some(QteResponse::Keys(tokens.map(str::to_string).collect())),
            QteType::Combo => tokens
                .map(parse_direction)
                .collect::<Option<Vec<_>>>()
                .map(QteResponse::Directions),
            QteType::Unlock => tokens
                .map(|t| t.parse::<u32>().ok())
                .collect::<Option<Vec<_>>>()
                .map(QteResponse::Pattern),
        }
    }
}

fn parse_direction(token: &str) -> Option<Direction> {
    match token.to_ascii_lowercase().as_str() {
        "up" | "u" => Some(Direction::Up),
        "down" | "d" => Some(Direction::Down),
        "left" | "l" => Some(Direction::Left),
        "right" | "r" => Some(Direction::Right),
        _ => None,
    }
}

/// A timed response to a QTE.
#[derive(Debug, Clone, PartialEq)]
pub struct QteAttempt {
    pub response: QteResponse,
    /// Seconds taken.
    pub elapsed: f64,
}

/// True if the attempt matches the expected input within the time limit.
///
/// Keys compare case-insensitively. A response of the wrong kind always fails.
pub fn qte_succeeds(qte: &QteDef, attempt: &QteAttempt) -> bool {
    let spec = input_spec(qte);
    if attempt.elapsed > spec.time_limit {
        return false;
    }
    match (spec.input, &attempt.response) {
        (QteInput::Keys(expected), QteResponse::Keys(given)) => {
            !expected.is_empty()
                && expected.len() == given.len()
                && expected.iter().zip(given).all(|(e, g)| e.eq_ignore_ascii_case(g))
        },
        (QteInput::Directions(expected), QteResponse::Directions(given)) => !expected.is_empty() && expected == given.as_slice(),
        (QteInput::Pattern(expected), QteResponse::Pattern(given)) => !expected.is_empty() && expected == given.as_slice(),
        _ => false,
    }
}

/// Decides whether a free-text answer passes a dialogue task.
pub trait ResponseJudge {
    fn judge(&self, task: &DialogueTaskDef, answer: &str) -> bool;
}

/// Placeholder judge: any answer with at least `min_chars` non-padding characters passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthJudge {
    pub min_chars: usize,
}

impl Default for LengthJudge {
    fn default() -> Self {
        Self { min_chars: 5 }
    }
}

impl ResponseJudge for LengthJudge {
    fn judge(&self, _task: &DialogueTaskDef, answer: &str) -> bool {
        answer.trim().chars().count() >= self.min_chars
    }
}
