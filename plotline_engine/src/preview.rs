//! Preview session: walks a story scene by scene.
//!
//! The session starts at the story's `start` scene and visits elements in
//! ascending `order`. Lines are stepped through with [`PreviewSession::advance`];
//! choices, QTEs and dialogue tasks stop the walk until the caller resolves them.
//! Running off the end of a scene follows `nextSceneId`. A branch taken without a target
//! scene stops the walk where it is. Ending scenes stop the walk for good, except that a
//! bad ending with a revival point can be revived.
//!
//! The session owns its own [`ValueStore`]; the story is borrowed and never mutated.

use std::collections::HashSet;

use log::{info, warn};
use plotline_data::{
    CharacterDef, ChoiceDef, ChoiceOptionDef, DialogueTaskDef, ElementDef, ElementKind, Id, OutcomeDef, QteDef,
    SceneDef, SceneType, StoryDef,
};
use thiserror::Error;

use crate::gate::{Access, option_access, scene_access};
use crate::qte::{QteAttempt, QteSpec, ResponseJudge, input_spec, qte_succeeds};
use crate::values::ValueStore;

#[derive(Debug, Error, PartialEq)]
pub enum PreviewError {
    #[error("story has no start scene")]
    NoStartScene,
    #[error("the preview has ended")]
    Finished,
    #[error("no {0} is waiting for input")]
    NotPending(&'static str),
    #[error("option '{0}' is not part of the current choice")]
    UnknownOption(String),
    #[error("option '{id}' cannot be selected ({access:?})")]
    OptionUnavailable { id: String, access: Access },
    #[error("'{0}' cannot be purchased")]
    NotPurchasable(String),
    #[error("scene '{0}' offers no revival")]
    NoRevival(String),
}

/// Why a preview stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ending {
    /// Reached an `ending` scene.
    Complete { scene_id: Id },
    /// Reached a `bad-ending` scene, possibly with a way back.
    BadEnding { scene_id: Id, revival: Option<Id> },
    /// A normal scene ran out of elements with nowhere to go.
    DeadEnd { scene_id: Id },
    /// A choice option or QTE/task outcome without a target scene was taken.
    NoTarget { scene_id: Id },
    /// A branch pointed at a scene id that does not exist.
    MissingScene { scene_id: Id },
    /// Entered a locked scene with no condition or price to open it.
    Blocked { scene_id: Id },
    /// Kept falling through empty scenes without ever stopping.
    Loop { scene_id: Id },
}

impl Ending {
    pub fn scene_id(&self) -> &str {
        match self {
            Ending::Complete { scene_id }
            | Ending::BadEnding { scene_id, .. }
            | Ending::DeadEnd { scene_id }
            | Ending::NoTarget { scene_id }
            | Ending::MissingScene { scene_id }
            | Ending::Blocked { scene_id }
            | Ending::Loop { scene_id } => scene_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Narration,
    Dialogue,
    Thought,
}

/// A choice option as presented to the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionView<'a> {
    pub option: &'a ChoiceOptionDef,
    pub access: Access,
    pub purchased: bool,
}

impl OptionView<'_> {
    /// Selectable now, either because it is open or because it was bought.
    pub fn selectable(&self) -> bool {
        self.access.is_selectable() || (self.purchased && self.access.is_purchasable())
    }
}

/// What the preview is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum Beat<'a> {
    Line {
        kind: LineKind,
        speaker: Option<&'a CharacterDef>,
        text: &'a str,
    },
    Choice {
        element_id: &'a str,
        prompt: Option<&'a str>,
        options: Vec<OptionView<'a>>,
    },
    Qte {
        element_id: &'a str,
        spec: QteSpec<'a>,
    },
    Task {
        element_id: &'a str,
        prompt: &'a str,
        hint: Option<&'a str>,
    },
    LockedScene {
        scene: &'a SceneDef,
        price: f64,
    },
    End(Ending),
}

#[derive(Debug, Clone, PartialEq)]
enum Stage {
    InScene,
    AwaitingPurchase(f64),
    Ended(Ending),
}

/// A single walk through a story.
#[derive(Debug, Clone)]
pub struct PreviewSession<'a> {
    story: &'a StoryDef,
    values: ValueStore,
    scene: &'a SceneDef,
    elements: Vec<&'a ElementDef>,
    cursor: usize,
    stage: Stage,
    purchased_options: HashSet<Id>,
    purchased_scenes: HashSet<Id>,
    history: Vec<Id>,
}

impl<'a> PreviewSession<'a> {
    /// Begin at the first `start` scene with the story's stored values.
    ///
    /// # Errors
    /// - [`PreviewError::NoStartScene`] if no scene has type `start`
    pub fn start(story: &'a StoryDef) -> Result<Self, PreviewError> {
        let start = story.start_scene().ok_or(PreviewError::NoStartScene)?;
        let mut session = PreviewSession {
            story,
            values: ValueStore::from_defs(&story.global_values),
            scene: start,
            elements: Vec::new(),
            cursor: 0,
            stage: Stage::InScene,
            purchased_options: HashSet::new(),
            purchased_scenes: HashSet::new(),
            history: Vec::new(),
        };
        info!("preview of '{}' starting at scene '{}'", story.title, start.id);
        session.load(start);
        session.settle();
        Ok(session)
    }

    pub fn values(&self) -> &ValueStore {
        &self.values
    }

    pub fn scene(&self) -> &'a SceneDef {
        self.scene
    }

    /// Scene ids in the order they were entered.
    pub fn history(&self) -> &[Id] {
        &self.history
    }

    pub fn ending(&self) -> Option<&Ending> {
        match &self.stage {
            Stage::Ended(ending) => Some(ending),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.ending().is_some()
    }

    pub fn current_beat(&self) -> Beat<'a> {
        match &self.stage {
            Stage::Ended(ending) => return Beat::End(ending.clone()),
            Stage::AwaitingPurchase(price) => {
                return Beat::LockedScene {
                    scene: self.scene,
                    price: *price,
                };
            },
            Stage::InScene => {},
        }
        let Some(element) = self.elements.get(self.cursor).copied() else {
            // settle() never leaves the cursor past the end while in a scene
            return Beat::End(Ending::DeadEnd {
                scene_id: self.scene.id.clone(),
            });
        };
        match &element.kind {
            ElementKind::Narration(line) => Beat::Line {
                kind: LineKind::Narration,
                speaker: None,
                text: &line.text,
            },
            ElementKind::Dialogue(line) => Beat::Line {
                kind: LineKind::Dialogue,
                speaker: self.story.character(&line.character_id),
                text: &line.text,
            },
            ElementKind::Thought(line) => Beat::Line {
                kind: LineKind::Thought,
                speaker: self.story.character(&line.character_id),
                text: &line.text,
            },
            ElementKind::Choice(choice) => Beat::Choice {
                element_id: &element.id,
                prompt: choice.prompt.as_deref(),
                options: choice.options.iter().map(|o| self.option_view(o)).collect(),
            },
            ElementKind::Qte(qte) => Beat::Qte {
                element_id: &element.id,
                spec: input_spec(qte),
            },
            ElementKind::DialogueTask(task) => Beat::Task {
                element_id: &element.id,
                prompt: &task.prompt,
                hint: task.hint.as_deref(),
            },
        }
    }

    /// Step past the current line.
    ///
    /// # Errors
    /// - if the preview has ended or the current beat is not a line
    pub fn advance(&mut self) -> Result<(), PreviewError> {
        let element = self.pending("line")?;
        if element.kind.is_branching() {
            return Err(PreviewError::NotPending("line"));
        }
        self.cursor += 1;
        self.settle();
        Ok(())
    }

    /// Select an option of the current choice, apply its value changes and follow it.
    ///
    /// # Errors
    /// - if no choice is pending, the option is not part of it, or it is locked
    pub fn choose(&mut self, option_id: &str) -> Result<(), PreviewError> {
        let choice = self.pending_choice()?;
        let option = find_option(choice, option_id)?;
        let view = self.option_view(option);
        if !view.selectable() {
            return Err(PreviewError::OptionUnavailable {
                id: option.id.clone(),
                access: view.access,
            });
        }
        info!("option '{}' chosen", option.id);
        self.values.apply_all(&option.value_changes);
        self.follow(option.next_scene());
        Ok(())
    }

    /// Record the purchase of a price-locked option in the current choice.
    ///
    /// Payment itself happens elsewhere; this only makes the option selectable.
    ///
    /// # Errors
    /// - if no choice is pending, the option is unknown, or it has no purchase path
    pub fn purchase(&mut self, option_id: &str) -> Result<f64, PreviewError> {
        let choice = self.pending_choice()?;
        let option = find_option(choice, option_id)?;
        match option_access(option, self.values.as_defs()) {
            Access::Purchasable(price) => {
                info!("option '{}' purchased for {price}", option.id);
                self.purchased_options.insert(option.id.clone());
                Ok(price)
            },
            _ => Err(PreviewError::NotPurchasable(option.id.clone())),
        }
    }

    /// Record the purchase of the locked scene the preview is waiting at, then enter it.
    ///
    /// # Errors
    /// - if the preview is not waiting at a purchasable scene
    pub fn purchase_scene(&mut self) -> Result<f64, PreviewError> {
        let Stage::AwaitingPurchase(price) = self.stage else {
            return Err(PreviewError::NotPurchasable(self.scene.id.clone()));
        };
        info!("scene '{}' purchased for {price}", self.scene.id);
        self.purchased_scenes.insert(self.scene.id.clone());
        self.stage = Stage::InScene;
        self.settle();
        Ok(price)
    }

    /// Resolve the pending QTE. Returns whether the attempt succeeded.
    ///
    /// # Errors
    /// - if no QTE is pending
    pub fn resolve_qte(&mut self, attempt: &QteAttempt) -> Result<bool, PreviewError> {
        let qte = self.pending_qte()?;
        let success = qte_succeeds(qte, attempt);
        info!("qte resolved: {}", if success { "success" } else { "failure" });
        self.follow_outcome(if success { &qte.success } else { &qte.failure });
        Ok(success)
    }

    /// Answer the pending dialogue task. Returns whether the judge accepted the answer.
    ///
    /// # Errors
    /// - if no dialogue task is pending
    pub fn answer_task(&mut self, answer: &str, judge: &dyn ResponseJudge) -> Result<bool, PreviewError> {
        let task = self.pending_task()?;
        let success = judge.judge(task, answer);
        info!("dialogue task judged: {}", if success { "success" } else { "failure" });
        self.follow_outcome(if success { &task.success } else { &task.failure });
        Ok(success)
    }

    /// Resume from the revival point of the bad ending the preview stopped at.
    ///
    /// Values keep whatever state they had at the bad ending.
    ///
    /// # Errors
    /// - if the preview is not stopped at a bad ending with a revival point
    pub fn revive(&mut self) -> Result<(), PreviewError> {
        let revival = match &self.stage {
            Stage::Ended(Ending::BadEnding {
                revival: Some(target), ..
            }) => target.clone(),
            _ => return Err(PreviewError::NoRevival(self.scene.id.clone())),
        };
        info!("reviving at scene '{revival}'");
        self.goto(&revival);
        Ok(())
    }

    fn option_view(&self, option: &'a ChoiceOptionDef) -> OptionView<'a> {
        OptionView {
            option,
            access: option_access(option, self.values.as_defs()),
            purchased: self.purchased_options.contains(&option.id),
        }
    }

    fn pending(&self, what: &'static str) -> Result<&'a ElementDef, PreviewError> {
        match self.stage {
            Stage::Ended(_) => Err(PreviewError::Finished),
            Stage::AwaitingPurchase(_) => Err(PreviewError::NotPending(what)),
            Stage::InScene => self
                .elements
                .get(self.cursor)
                .copied()
                .ok_or(PreviewError::NotPending(what)),
        }
    }

    fn pending_choice(&self) -> Result<&'a ChoiceDef, PreviewError> {
        match &self.pending("choice")?.kind {
            ElementKind::Choice(choice) => Ok(choice),
            _ => Err(PreviewError::NotPending("choice")),
        }
    }

    fn pending_qte(&self) -> Result<&'a QteDef, PreviewError> {
        match &self.pending("qte")?.kind {
            ElementKind::Qte(qte) => Ok(qte),
            _ => Err(PreviewError::NotPending("qte")),
        }
    }

    fn pending_task(&self) -> Result<&'a DialogueTaskDef, PreviewError> {
        match &self.pending("dialogue task")?.kind {
            ElementKind::DialogueTask(task) => Ok(task),
            _ => Err(PreviewError::NotPending("dialogue task")),
        }
    }

    fn follow_outcome(&mut self, outcome: &'a OutcomeDef) {
        self.values.apply_all(&outcome.value_changes);
        self.follow(outcome.target_scene());
    }

    /// Take a branch: move to its target, or stop here when it has none.
    fn follow(&mut self, target: Option<&str>) {
        match target {
            Some(target) => self.goto(target),
            None => {
                info!("branch in scene '{}' has no target; stopping", self.scene.id);
                self.stage = Stage::Ended(Ending::NoTarget {
                    scene_id: self.scene.id.clone(),
                });
            },
        }
    }

    fn goto(&mut self, target: &str) {
        match self.story.scene(target) {
            Some(scene) => {
                self.load(scene);
                self.settle();
            },
            None => {
                warn!("branch from scene '{}' targets missing scene '{target}'", self.scene.id);
                self.stage = Stage::Ended(Ending::MissingScene {
                    scene_id: target.to_string(),
                });
            },
        }
    }

    /// Enter a scene: reset the cursor and apply the scene's own lock.
    fn load(&mut self, scene: &'a SceneDef) {
        info!("entering scene '{}'", scene.id);
        self.scene = scene;
        self.history.push(scene.id.clone());
        self.cursor = 0;
        // choices without options have nothing to show
        self.elements = scene
            .ordered_elements()
            .into_iter()
            .filter(|e| !matches!(&e.kind, ElementKind::Choice(c) if c.options.is_empty()))
            .collect();
        self.stage = match scene_access(scene, self.values.as_defs()) {
            Access::Open | Access::Unlocked => Stage::InScene,
            Access::Purchasable(_) if self.purchased_scenes.contains(&scene.id) => Stage::InScene,
            Access::Purchasable(price) => Stage::AwaitingPurchase(price),
            Access::Locked => Stage::Ended(Ending::Blocked {
                scene_id: scene.id.clone(),
            }),
        };
    }

    /// Fall through finished scenes until something needs input or the walk ends.
    fn settle(&mut self) {
        let mut hops = 0;
        while self.stage == Stage::InScene && self.cursor >= self.elements.len() {
            let scene = self.scene;
            if scene.scene_type.is_ending() {
                let ending = if scene.scene_type == SceneType::BadEnding {
                    Ending::BadEnding {
                        scene_id: scene.id.clone(),
                        revival: scene.revival_point().map(str::to_string),
                    }
                } else {
                    Ending::Complete {
                        scene_id: scene.id.clone(),
                    }
                };
                info!("preview reached ending scene '{}'", scene.id);
                self.stage = Stage::Ended(ending);
                return;
            }
            let Some(target) = scene.next_scene() else {
                info!("scene '{}' has nowhere to go", scene.id);
                self.stage = Stage::Ended(Ending::DeadEnd {
                    scene_id: scene.id.clone(),
                });
                return;
            };
            hops += 1;
            if hops > self.story.scenes.len() {
                warn!("scene '{}' falls through empty scenes forever", scene.id);
                self.stage = Stage::Ended(Ending::Loop {
                    scene_id: scene.id.clone(),
                });
                return;
            }
            match self.story.scene(target) {
                Some(next) => self.load(next),
                None => {
                    warn!("scene '{}' continues to missing scene '{target}'", scene.id);
                    self.stage = Stage::Ended(Ending::MissingScene {
                        scene_id: target.to_string(),
                    });
                },
            }
        }
    }
}

fn find_option<'a>(choice: &'a ChoiceDef, option_id: &str) -> Result<&'a ChoiceOptionDef, PreviewError> {
    choice
        .options
        .iter()
        .find(|o| o.id == option_id)
        .ok_or_else(|| PreviewError::UnknownOption(option_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qte::{LengthJudge, QteResponse};
    use serde_json::json;

    fn story() -> StoryDef {
        serde_json::from_value(json!({
            "title": "Preview",
            "characters": [{"id": "mara", "name": "Mara"}],
            "globalValues": [{"id": "trust", "name": "Trust", "initialValue": 0}],
            "scenes": [
                {"id": "open", "type": "start", "elements": [
                    {"id": "b", "order": 1, "type": "dialogue", "characterId": "mara", "text": "Well?"},
                    {"id": "a", "order": 0, "type": "narration", "text": "Rain."},
                    {"id": "c", "order": 2, "type": "choice", "options": [
                        {"id": "kind", "text": "Be kind", "nextSceneId": "gate",
                         "valueChanges": [{"valueId": "trust", "operation": "add", "value": 2}]},
                        {"id": "vip", "text": "Flash a pass", "locked": true, "unlockPrice": 10},
                        {"id": "sneak", "text": "Sneak", "locked": true, "nextSceneId": "gate",
                         "unlockConditions": [{"valueId": "trust", "operator": "gt", "targetValue": 5}]}
                    ]}
                ]},
                {"id": "gate", "elements": [
                    {"id": "q", "order": 0, "type": "qte", "qteType": "combo", "timeLimit": 3,
                     "keySequence": ["x"], "directionSequence": ["up", "down"],
                     "success": {"sceneId": "hall"}, "failure": {"sceneId": "fall"}}
                ]},
                {"id": "fall", "type": "bad-ending", "revivalPointId": "gate", "elements": [
                    {"id": "f", "order": 0, "type": "narration", "text": "You fall."}
                ]},
                {"id": "hall", "nextSceneId": "door", "elements": [
                    {"id": "t", "order": 0, "type": "dialogueTask", "prompt": "Persuade the guard",
                     "success": {"sceneId": "door",
                                 "valueChanges": [{"valueId": "trust", "operation": "set", "value": 9}]},
                     "failure": {"sceneId": "fall"}}
                ]},
                {"id": "door", "nextSceneId": "end"},
                {"id": "end", "type": "ending"}
            ]
        }))
        .unwrap()
    }

    fn combo(input: &str) -> QteAttempt {
        QteAttempt {
            response: QteResponse::parse(plotline_data::QteType::Combo, input).unwrap(),
            elapsed: 1.0,
        }
    }

    #[test]
    fn elements_play_in_order() {
        let story = story();
        let mut session = PreviewSession::start(&story).unwrap();
        assert!(matches!(session.current_beat(), Beat::Line { text: "Rain.", .. }));
        session.advance().unwrap();
        match session.current_beat() {
            Beat::Line { kind, speaker, text } => {
                assert_eq!(kind, LineKind::Dialogue);
                assert_eq!(speaker.map(|c| c.name.as_str()), Some("Mara"));
                assert_eq!(text, "Well?");
            },
            other => panic!("unexpected beat {other:?}"),
        }
    }

    #[test]
    fn price_locked_option_needs_purchase() {
        let story = story();
        let mut session = PreviewSession::start(&story).unwrap();
        session.advance().unwrap();
        session.advance().unwrap();

        let Beat::Choice { options, .. } = session.current_beat() else {
            panic!("expected a choice");
        };
        let vip = options.iter().find(|o| o.option.id == "vip").unwrap();
        assert_eq!(vip.access, Access::Purchasable(10.0));
        assert!(!vip.selectable());
        let sneak = options.iter().find(|o| o.option.id == "sneak").unwrap();
        assert_eq!(sneak.access, Access::Locked);

        assert!(matches!(
            session.choose("vip"),
            Err(PreviewError::OptionUnavailable { .. })
        ));
        assert_eq!(session.purchase("vip"), Ok(10.0));
        assert_eq!(session.purchase("sneak"), Err(PreviewError::NotPurchasable("sneak".into())));
        session.choose("vip").unwrap();
        assert_eq!(
            session.ending(),
            Some(&Ending::NoTarget {
                scene_id: "open".into()
            })
        );
        assert_eq!(session.history(), ["open"]);
    }

    #[test]
    fn full_route_applies_value_changes() {
        let story = story();
        let mut session = PreviewSession::start(&story).unwrap();
        session.advance().unwrap();
        session.advance().unwrap();
        session.choose("kind").unwrap();
        assert_eq!(session.values().current("trust"), Some(2.0));

        assert!(session.resolve_qte(&combo("up down")).unwrap());
        let judge = LengthJudge::default();
        assert!(session.answer_task("Let me through, friend.", &judge).unwrap());
        assert_eq!(session.values().current("trust"), Some(9.0));
        assert_eq!(
            session.ending(),
            Some(&Ending::Complete {
                scene_id: "end".into()
            })
        );
        assert_eq!(session.history(), ["open", "gate", "hall", "door", "end"]);
    }

    #[test]
    fn untargeted_option_stops_in_place() {
        let story: StoryDef = serde_json::from_value(json!({
            "title": "Stop",
            "globalValues": [{"id": "v", "name": "V", "initialValue": 0}],
            "scenes": [
                {"id": "a", "type": "start", "nextSceneId": "b", "elements": [
                    {"id": "c", "order": 0, "type": "choice", "options": [
                        {"id": "o", "text": "Wait",
                         "valueChanges": [{"valueId": "v", "operation": "add", "value": 1}]}
                    ]},
                    {"id": "n", "order": 1, "type": "narration", "text": "Never shown."}
                ]},
                {"id": "b", "type": "ending"}
            ]
        }))
        .unwrap();
        let mut session = PreviewSession::start(&story).unwrap();
        session.choose("o").unwrap();
        assert_eq!(session.values().current("v"), Some(1.0));
        assert_eq!(
            session.ending(),
            Some(&Ending::NoTarget {
                scene_id: "a".into()
            })
        );
        assert_eq!(session.history(), ["a"]);
        assert_eq!(session.advance(), Err(PreviewError::Finished));
    }

    #[test]
    fn outcome_without_scene_stops_in_place() {
        let story: StoryDef = serde_json::from_value(json!({
            "title": "Task",
            "scenes": [
                {"id": "a", "type": "start", "nextSceneId": "b", "elements": [
                    {"id": "t", "order": 0, "type": "dialogueTask", "prompt": "Say it",
                     "success": {}, "failure": {"sceneId": "b"}}
                ]},
                {"id": "b", "type": "ending"}
            ]
        }))
        .unwrap();
        let mut session = PreviewSession::start(&story).unwrap();
        assert!(session.answer_task("Something long", &LengthJudge::default()).unwrap());
        assert_eq!(
            session.ending(),
            Some(&Ending::NoTarget {
                scene_id: "a".into()
            })
        );
    }

    #[test]
    fn unknown_speaker_renders_without_one() {
        let story: StoryDef = serde_json::from_value(json!({
            "title": "Ghost",
            "characters": [{"id": "mara", "name": "Mara"}],
            "scenes": [
                {"id": "a", "type": "start", "elements": [
                    {"id": "d", "order": 0, "type": "dialogue", "characterId": "nobody", "text": "Hello?"},
                    {"id": "t", "order": 1, "type": "thought", "characterId": "", "text": "Quiet."}
                ]}
            ]
        }))
        .unwrap();
        let mut session = PreviewSession::start(&story).unwrap();
        assert_eq!(
            session.current_beat(),
            Beat::Line {
                kind: LineKind::Dialogue,
                speaker: None,
                text: "Hello?"
            }
        );
        session.advance().unwrap();
        assert_eq!(
            session.current_beat(),
            Beat::Line {
                kind: LineKind::Thought,
                speaker: None,
                text: "Quiet."
            }
        );
    }

    #[test]
    fn bad_ending_can_be_revived() {
        let story = story();
        let mut session = PreviewSession::start(&story).unwrap();
        session.advance().unwrap();
        session.advance().unwrap();
        session.choose("kind").unwrap();
        assert!(!session.resolve_qte(&combo("left")).unwrap());

        assert!(matches!(session.current_beat(), Beat::Line { text: "You fall.", .. }));
        session.advance().unwrap();
        assert_eq!(
            session.ending(),
            Some(&Ending::BadEnding {
                scene_id: "fall".into(),
                revival: Some("gate".into())
            })
        );
        assert_eq!(session.advance(), Err(PreviewError::Finished));

        session.revive().unwrap();
        assert!(matches!(session.current_beat(), Beat::Qte { .. }));
        assert_eq!(session.values().current("trust"), Some(2.0));
    }

    #[test]
    fn wrong_kind_of_input_is_an_error() {
        let story = story();
        let mut session = PreviewSession::start(&story).unwrap();
        assert_eq!(session.choose("kind"), Err(PreviewError::NotPending("choice")));
        assert_eq!(session.resolve_qte(&combo("up")), Err(PreviewError::NotPending("qte")));
        assert_eq!(session.revive(), Err(PreviewError::NoRevival("open".into())));
    }

    #[test]
    fn missing_start_scene_is_an_error() {
        let story = StoryDef {
            title: "Empty".into(),
            ..StoryDef::default()
        };
        assert_eq!(PreviewSession::start(&story).err(), Some(PreviewError::NoStartScene));
    }

    #[test]
    fn locked_scene_waits_for_purchase() {
        let story: StoryDef = serde_json::from_value(json!({
            "title": "Paywall",
            "scenes": [
                {"id": "s", "type": "start", "nextSceneId": "bonus"},
                {"id": "bonus", "type": "ending", "locked": true, "unlockPrice": 3, "elements": [
                    {"id": "n", "order": 0, "type": "narration", "text": "Bonus!"}
                ]}
            ]
        }))
        .unwrap();
        let mut session = PreviewSession::start(&story).unwrap();
        assert!(matches!(session.current_beat(), Beat::LockedScene { price, .. } if price == 3.0));
        assert_eq!(session.purchase_scene(), Ok(3.0));
        assert!(matches!(session.current_beat(), Beat::Line { text: "Bonus!", .. }));
    }

    #[test]
    fn dangling_next_scene_ends_the_preview() {
        let story: StoryDef = serde_json::from_value(json!({
            "title": "Dangling",
            "scenes": [{"id": "s", "type": "start", "nextSceneId": "nowhere"}]
        }))
        .unwrap();
        let session = PreviewSession::start(&story).unwrap();
        assert_eq!(
            session.ending(),
            Some(&Ending::MissingScene {
                scene_id: "nowhere".into()
            })
        );
    }

    #[test]
    fn empty_scene_cycles_are_cut_off() {
        let story: StoryDef = serde_json::from_value(json!({
            "title": "Loop",
            "scenes": [
                {"id": "a", "type": "start", "nextSceneId": "b"},
                {"id": "b", "nextSceneId": "a"}
            ]
        }))
        .unwrap();
        let session = PreviewSession::start(&story).unwrap();
        assert!(matches!(session.ending(), Some(Ending::Loop { .. })));
    }
}
