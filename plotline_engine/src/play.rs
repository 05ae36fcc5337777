//! Interactive terminal preview.
//!
//! Renders each [`Beat`] of a [`PreviewSession`] and reads the author's response. Lines advance
//! on Enter, choices take an option number (or `buy N` for price-locked options), QTEs take the
//! key, direction, or cell sequence, and dialogue tasks take free text. Colon commands work anywhere.

mod input;

use std::fmt::Write as _;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use log::info;
use plotline_data::{Direction, StoryDef};

use crate::config::PlotlineConfig;
use crate::gate::Access;
use crate::preview::{Beat, Ending, LineKind, OptionView, PreviewSession};
use crate::qte::{LengthJudge, QteAttempt, QteInput, QteResponse, QteSpec};
use crate::style::StoryStyle;
use crate::titles::earned_titles;

pub use input::{InputEvent, InputManager};

/// Commands available at every prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayCommand {
    Quit,
    Values,
    History,
    Help,
    Input(String),
}

pub fn parse_play_command(line: &str) -> PlayCommand {
    match line.trim().to_lowercase().as_str() {
        ":q" | ":quit" | ":exit" => PlayCommand::Quit,
        ":v" | ":values" => PlayCommand::Values,
        ":h" | ":history" => PlayCommand::History,
        ":help" | ":?" => PlayCommand::Help,
        _ => PlayCommand::Input(line.trim().to_string()),
    }
}

/// Response to a choice prompt. Options are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceInput {
    Pick(usize),
    Buy(usize),
}

pub fn parse_choice_input(raw: &str) -> Option<ChoiceInput> {
    let mut words = raw.split_whitespace();
    let first = words.next()?;
    let (buy, number) = if first.eq_ignore_ascii_case("buy") {
        (true, words.next()?)
    } else {
        (false, first)
    };
    if words.next().is_some() {
        return None;
    }
    let n = number.parse::<usize>().ok().filter(|n| *n > 0)?;
    Some(if buy { ChoiceInput::Buy(n) } else { ChoiceInput::Pick(n) })
}

/// Run an interactive preview of `story` until it ends or the author quits.
///
/// # Errors
/// - if the story has no start scene or terminal input fails
pub fn run_preview(story: &StoryDef, config: &PlotlineConfig) -> Result<()> {
    let mut session = PreviewSession::start(story).context("starting preview")?;
    let mut input = InputManager::new();
    let judge = LengthJudge {
        min_chars: config.preview.task_min_chars,
    };
    let width = wrap_width(config);
    let mut shown_scene = String::new();

    println!("{}", format!("Previewing \"{}\"", story.title).scene_title_style());
    println!("{}", "Type :help for commands.".section_style());

    loop {
        if !session.is_finished() && shown_scene != session.scene().id {
            shown_scene.clone_from(&session.scene().id);
            let scene = session.scene();
            let heading = if scene.title.is_empty() { &scene.id } else { &scene.title };
            println!("\n{}", heading.scene_title_style());
        }

        let beat = session.current_beat();
        print!("{}", render_beat(&beat, width));

        if let Beat::End(ending) = &beat
            && !matches!(ending, Ending::BadEnding { revival: Some(_), .. })
        {
            print_titles(story, &session);
            break;
        }

        input.set_completions(completion_terms(&beat));
        let started = Instant::now();
        let line = match input.read_line(&prompt_for(&beat)).context("reading preview input")? {
            InputEvent::Line(line) => line,
            InputEvent::Eof => break,
            InputEvent::Interrupted => continue,
        };
        let elapsed = started.elapsed().as_secs_f64();

        match parse_play_command(&line) {
            PlayCommand::Quit => break,
            PlayCommand::Help => println!("{}", HELP.section_style()),
            PlayCommand::Values => print!("{}", render_values(&session)),
            PlayCommand::History => println!("{}", session.history().join(" -> ").section_style()),
            PlayCommand::Input(raw) => {
                if let Err(err) = respond(&mut session, &beat, &raw, elapsed, &judge) {
                    println!("{}", err.to_string().error_style());
                }
            },
        }
    }
    info!("preview of '{}' closed after {} scenes", story.title, session.history().len());
    Ok(())
}

const COLON_COMMANDS: [&str; 4] = [":help", ":history", ":quit", ":values"];

const DIRECTION_WORDS: [&str; 4] = ["up", "down", "left", "right"];

/// Answers the beat accepts, offered for tab completion. Colon commands are always offered.
pub fn completion_terms(beat: &Beat<'_>) -> Vec<String> {
    let mut terms: Vec<String> = match beat {
        Beat::Choice { options, .. } => options
            .iter()
            .enumerate()
            .filter_map(|(i, view)| {
                if view.selectable() {
                    Some((i + 1).to_string())
                } else if view.access.is_purchasable() {
                    Some(format!("buy {}", i + 1))
                } else {
                    None
                }
            })
            .collect(),
        Beat::Qte { spec, .. } if matches!(spec.input, QteInput::Directions(_)) => {
            DIRECTION_WORDS.iter().map(|w| (*w).to_string()).collect()
        },
        Beat::LockedScene { .. } => vec!["buy".to_string()],
        Beat::End(Ending::BadEnding { revival: Some(_), .. }) => vec!["revive".to_string()],
        _ => Vec::new(),
    };
    terms.extend(COLON_COMMANDS.iter().map(|c| (*c).to_string()));
    terms
}

const HELP: &str = "Enter: continue | N: pick option | buy N: buy option | buy: buy scene | \
                    revive: retry from revival point | :values | :history | :quit";

fn wrap_width(config: &PlotlineConfig) -> usize {
    match config.preview.wrap_width {
        0 => textwrap::termwidth(),
        width => width,
    }
}

fn respond(
    session: &mut PreviewSession<'_>,
    beat: &Beat<'_>,
    raw: &str,
    elapsed: f64,
    judge: &LengthJudge,
) -> Result<()> {
    match beat {
        Beat::Line { .. } => session.advance()?,
        Beat::Choice { options, .. } => {
            let choice = parse_choice_input(raw).ok_or_else(|| anyhow!("enter an option number or 'buy N'"))?;
            let (ChoiceInput::Pick(n) | ChoiceInput::Buy(n)) = choice;
            let view = options
                .get(n - 1)
                .ok_or_else(|| anyhow!("there is no option {n}"))?;
            match choice {
                ChoiceInput::Pick(_) => session.choose(&view.option.id)?,
                ChoiceInput::Buy(_) => {
                    let price = session.purchase(&view.option.id)?;
                    println!("{}", format!("Purchased for {price}.").price_style());
                },
            }
        },
        Beat::LockedScene { .. } => {
            if !raw.eq_ignore_ascii_case("buy") {
                return Err(anyhow!("this scene is locked; type 'buy' to unlock it"));
            }
            let price = session.purchase_scene()?;
            println!("{}", format!("Purchased for {price}.").price_style());
        },
        Beat::Qte { spec, .. } => {
            let response = QteResponse::parse(spec.qte_type, raw)
                .ok_or_else(|| anyhow!("could not read '{raw}' as {} input", qte_kind(spec)))?;
            let attempt = QteAttempt { response, elapsed };
            let success = session.resolve_qte(&attempt)?;
            println!("{}", (if success { "Success!" } else { "Failed!" }).qte_style());
        },
        Beat::Task { .. } => {
            let accepted = session.answer_task(raw, judge)?;
            println!("{}", (if accepted { "Accepted." } else { "Not convincing." }).qte_style());
        },
        Beat::End(_) => {
            if !raw.eq_ignore_ascii_case("revive") {
                return Err(anyhow!("type 'revive' to retry or :quit to stop"));
            }
            session.revive()?;
        },
    }
    Ok(())
}

fn prompt_for(beat: &Beat<'_>) -> String {
    let prompt = match beat {
        Beat::Line { .. } => "(enter)> ",
        Beat::Choice { .. } => "choose> ",
        Beat::Qte { .. } => "quick!> ",
        Beat::Task { .. } => "say> ",
        Beat::LockedScene { .. } => "buy?> ",
        Beat::End(_) => "revive?> ",
    };
    prompt.prompt_style().to_string()
}

/// Text shown for a beat, wrapped to `width`.
pub fn render_beat(beat: &Beat<'_>, width: usize) -> String {
    let mut out = String::new();
    match beat {
        Beat::Line { kind, speaker, text } => {
            let body = textwrap::fill(text, width);
            let _ = match (kind, speaker) {
                (LineKind::Narration, _) => writeln!(out, "{}", body.narration_style()),
                (LineKind::Dialogue, Some(who)) => {
                    writeln!(out, "{}: {body}", who.name.speaker_style())
                },
                (LineKind::Thought, Some(who)) => {
                    writeln!(out, "{} {}", who.name.speaker_style(), format!("({body})").thought_style())
                },
                (LineKind::Dialogue, None) => writeln!(out, "{body}"),
                (LineKind::Thought, None) => writeln!(out, "{}", format!("({body})").thought_style()),
            };
        },
        Beat::Choice { prompt, options, .. } => {
            if let Some(prompt) = prompt {
                let _ = writeln!(out, "{}", textwrap::fill(prompt, width));
            }
            for (i, view) in options.iter().enumerate() {
                let _ = writeln!(out, "  {}. {}", i + 1, option_label(view));
            }
        },
        Beat::Qte { spec, .. } => {
            let _ = writeln!(
                out,
                "{} {}",
                format!("{} QTE", qte_kind(spec)).qte_style(),
                format!("{}s", spec.time_limit).section_style()
            );
            if let Some(prompt) = spec.prompt {
                let _ = writeln!(out, "{}", textwrap::fill(prompt, width));
            }
            let _ = writeln!(out, "Enter: {}", expected_input(&spec.input));
        },
        Beat::Task { prompt, hint, .. } => {
            let _ = writeln!(out, "{}", textwrap::fill(prompt, width));
            if let Some(hint) = hint {
                let _ = writeln!(out, "{}", format!("hint: {hint}").section_style());
            }
        },
        Beat::LockedScene { scene, price } => {
            let _ = writeln!(
                out,
                "{} {}",
                format!("Scene '{}' is locked.", scene.id).option_locked_style(),
                format!("Unlock for {price}?").price_style()
            );
        },
        Beat::End(ending) => {
            let _ = writeln!(out, "\n{}", ending_label(ending));
        },
    }
    out
}

fn option_label(view: &OptionView<'_>) -> String {
    let text = view.option.text.as_str();
    match view.access {
        _ if view.selectable() => text.option_style().to_string(),
        Access::Purchasable(price) => format!("{} {}", text.option_locked_style(), format!("(buy {price})").price_style()),
        _ => format!("{} {}", text.option_locked_style(), "(locked)".section_style()),
    }
}

fn qte_kind(spec: &QteSpec<'_>) -> &'static str {
    match spec.input {
        QteInput::Keys(_) => "action",
        QteInput::Directions(_) => "combo",
        QteInput::Pattern(_) => "unlock",
    }
}

fn expected_input(input: &QteInput<'_>) -> String {
    match input {
        QteInput::Keys(keys) => keys.join(" "),
        QteInput::Directions(dirs) => dirs
            .iter()
            .map(|d| match d {
                Direction::Up => "up",
                Direction::Down => "down",
                Direction::Left => "left",
                Direction::Right => "right",
            })
            .collect::<Vec<_>>()
            .join(" "),
        QteInput::Pattern(cells) => cells.iter().map(u32::to_string).collect::<Vec<_>>().join(","),
    }
}

fn ending_label(ending: &Ending) -> String {
    match ending {
        Ending::Complete { scene_id } => format!("THE END ({scene_id})").ending_style().to_string(),
        Ending::BadEnding { scene_id, revival } => {
            let mut label = format!("BAD ENDING ({scene_id})").bad_ending_style().to_string();
            if let Some(target) = revival {
                let _ = write!(label, " {}", format!("revive at '{target}'?").section_style());
            }
            label
        },
        Ending::DeadEnd { scene_id } => format!("Scene '{scene_id}' leads nowhere.").error_style().to_string(),
        Ending::NoTarget { scene_id } => format!("The branch taken in '{scene_id}' has no target scene.")
            .error_style()
            .to_string(),
        Ending::MissingScene { scene_id } => format!("Missing scene '{scene_id}'.").error_style().to_string(),
        Ending::Blocked { scene_id } => format!("Scene '{scene_id}' is locked for good.").error_style().to_string(),
        Ending::Loop { scene_id } => format!("Scene '{scene_id}' loops without content.").error_style().to_string(),
    }
}

fn render_values(session: &PreviewSession<'_>) -> String {
    let mut out = String::new();
    for value in session.values().as_defs() {
        let _ = writeln!(
            out,
            "  {} {}",
            format!("{} ({})", value.name, value.id).value_style(),
            value.effective()
        );
    }
    out
}

fn print_titles(story: &StoryDef, session: &PreviewSession<'_>) {
    let earned = earned_titles(&story.titles, session.values().as_defs());
    if earned.is_empty() {
        return;
    }
    println!("{}", "Titles earned:".section_style());
    for title in earned {
        println!("  {}", title.name.title_earned_style());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn colon_commands_are_global() {
        assert_eq!(parse_play_command(" :Quit "), PlayCommand::Quit);
        assert_eq!(parse_play_command(":values"), PlayCommand::Values);
        assert_eq!(parse_play_command("up left"), PlayCommand::Input("up left".into()));
    }

    #[test]
    fn choice_input_accepts_numbers_and_buy() {
        assert_eq!(parse_choice_input("2"), Some(ChoiceInput::Pick(2)));
        assert_eq!(parse_choice_input("BUY 3"), Some(ChoiceInput::Buy(3)));
        assert_eq!(parse_choice_input("0"), None);
        assert_eq!(parse_choice_input("buy"), None);
        assert_eq!(parse_choice_input("2 3"), None);
    }

    #[test]
    fn locked_options_render_their_price() {
        colored::control::set_override(false);
        let story: StoryDef = serde_json::from_value(json!({
            "title": "Shop",
            "scenes": [{"id": "s", "type": "start", "elements": [
                {"id": "c", "order": 0, "type": "choice", "prompt": "Pay?", "options": [
                    {"id": "a", "text": "Walk in"},
                    {"id": "b", "text": "VIP lounge", "locked": true, "unlockPrice": 10}
                ]}
            ]}]
        }))
        .unwrap();
        let mut session = PreviewSession::start(&story).unwrap();
        let text = render_beat(&session.current_beat(), 80);
        assert_eq!(text, "Pay?\n  1. Walk in\n  2. VIP lounge (buy 10)\n");

        assert_eq!(
            completion_terms(&session.current_beat()),
            ["1", "buy 2", ":help", ":history", ":quit", ":values"]
        );
        session.purchase("b").unwrap();
        assert_eq!(completion_terms(&session.current_beat())[..2], ["1", "2"]);
    }

    #[test]
    fn combo_qte_offers_directions() {
        let story: StoryDef = serde_json::from_value(json!({
            "title": "Dodge",
            "scenes": [{"id": "s", "type": "start", "elements": [
                {"id": "q", "order": 0, "type": "qte", "qteType": "combo", "directionSequence": ["up"]}
            ]}]
        }))
        .unwrap();
        let session = PreviewSession::start(&story).unwrap();
        let terms = completion_terms(&session.current_beat());
        assert_eq!(terms[..4], ["up", "down", "left", "right"]);
        assert!(terms.contains(&":quit".to_string()));
    }
}
