use std::collections::HashSet;
use std::fmt;

use crate::*;

/// Problem found while checking a story's references and authoring invariants.
///
/// Lints (see [`ValidationIssue::is_lint`]) describe stories that load and export fine
/// but probably won't play the way the author expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    DuplicateId { kind: &'static str, id: String },
    MissingField { field: &'static str, context: String },
    MissingReference { kind: &'static str, id: String, context: String },
    InvalidValue { context: String },
    StartSceneCount { count: usize },
    IncompleteScene { id: String },
}

impl ValidationIssue {
    /// True for advisory issues that never block saving or export.
    pub fn is_lint(&self) -> bool {
        matches!(
            self,
            ValidationIssue::StartSceneCount { .. } | ValidationIssue::IncompleteScene { .. }
        )
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::DuplicateId { kind, id } => {
                write!(f, "duplicate {kind} id '{id}'")
            },
            ValidationIssue::MissingField { field, context } => {
                write!(f, "{context} has no {field}")
            },
            ValidationIssue::MissingReference { kind, id, context } => {
                write!(f, "missing {kind} '{id}' ({context})")
            },
            ValidationIssue::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
            ValidationIssue::StartSceneCount { count } => {
                write!(f, "expected exactly one start scene, found {count}")
            },
            ValidationIssue::IncompleteScene { id } => {
                write!(f, "scene '{id}' has no way forward")
            },
        }
    }
}

impl std::error::Error for ValidationIssue {}

/// Validate cross-references and authoring invariants in a story.
///
/// ```
/// use plotline_data::{SceneDef, SceneType, StoryDef, validate_story};
///
/// let story = StoryDef {
///     title: "Demo".into(),
///     scenes: vec![SceneDef {
///         id: "opening".into(),
///         title: "Opening".into(),
///         scene_type: SceneType::Start,
///         location_id: None,
///         elements: Vec::new(),
///         next_scene_id: None,
///         revival_point_id: None,
///         position: Default::default(),
///         locked: false,
///         unlock_price: None,
///         unlock_conditions: Vec::new(),
///     }],
///     ..StoryDef::default()
/// };
/// assert!(validate_story(&story).is_empty());
/// ```
pub fn validate_story(story: &StoryDef) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let mut scenes = HashSet::new();
    let mut values = HashSet::new();
    let mut characters = HashSet::new();
    let mut locations = HashSet::new();
    let mut titles = HashSet::new();
    let mut chapters = HashSet::new();

    track_ids(
        "scene",
        story.scenes.iter().map(|s| s.id.as_str()),
        &mut scenes,
        &mut issues,
    );
    track_ids(
        "value",
        story.global_values.iter().map(|v| v.id.as_str()),
        &mut values,
        &mut issues,
    );
    track_ids(
        "character",
        story.characters.iter().map(|c| c.id.as_str()),
        &mut characters,
        &mut issues,
    );
    track_ids(
        "location",
        story.locations.iter().map(|l| l.id.as_str()),
        &mut locations,
        &mut issues,
    );
    track_ids("title", story.titles.iter().map(|t| t.id.as_str()), &mut titles, &mut issues);
    track_ids(
        "chapter",
        story.chapters.iter().map(|c| c.id.as_str()),
        &mut chapters,
        &mut issues,
    );

    let named = story
        .global_values
        .iter()
        .map(|v| ("value", &v.id, &v.name))
        .chain(story.characters.iter().map(|c| ("character", &c.id, &c.name)))
        .chain(story.locations.iter().map(|l| ("location", &l.id, &l.name)))
        .chain(story.titles.iter().map(|t| ("title", &t.id, &t.name)));
    for (kind, id, name) in named {
        check_present("name", name, || format!("{kind} '{id}'"), &mut issues);
    }

    let ids = IdSets {
        scenes: &scenes,
        values: &values,
        characters: &characters,
        locations: &locations,
    };

    let start_count = story
        .scenes
        .iter()
        .filter(|s| s.scene_type == SceneType::Start)
        .count();
    if start_count != 1 {
        issues.push(ValidationIssue::StartSceneCount { count: start_count });
    }

    for scene in &story.scenes {
        validate_scene(story, scene, &ids, &mut issues);
    }

    for title in &story.titles {
        validate_conditions(&title.conditions, &ids, &format!("title '{}'", title.id), &mut issues);
    }

    for chapter in &story.chapters {
        for scene_id in &chapter.scene_ids {
            check_ref(
                "scene",
                scene_id,
                ids.scenes,
                format!("chapter '{}'", chapter.id),
                &mut issues,
            );
        }
    }

    issues
}

/// True when a `normal` scene offers no edge at all out of itself: no `nextSceneId`,
/// no targeted choice option, and no targeted QTE or dialogue task outcome.
///
/// Ending scenes never count as incomplete.
pub fn scene_is_incomplete(scene: &SceneDef) -> bool {
    if scene.scene_type != SceneType::Normal || scene.next_scene().is_some() {
        return false;
    }
    !scene.elements.iter().any(|element| match &element.kind {
        ElementKind::Choice(choice) => choice.options.iter().any(|o| o.next_scene().is_some()),
        ElementKind::Qte(qte) => qte.success.target_scene().is_some() || qte.failure.target_scene().is_some(),
        ElementKind::DialogueTask(task) => {
            task.success.target_scene().is_some() || task.failure.target_scene().is_some()
        },
        ElementKind::Narration(_) | ElementKind::Dialogue(_) | ElementKind::Thought(_) => false,
    })
}


struct IdSets<'a> {
    scenes: &'a HashSet<String>,
    values: &'a HashSet<String>,
    characters: &'a HashSet<String>,
    locations: &'a HashSet<String>,
}

fn track_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    set: &mut HashSet<String>,
    issues: &mut Vec<ValidationIssue>,
) {
    for id in ids {
        if !set.insert(id.to_string()) {
            issues.push(ValidationIssue::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
}

fn check_ref(kind: &'static str, id: &str, set: &HashSet<String>, context: String, issues: &mut Vec<ValidationIssue>) {
    if !set.contains(id) {
        issues.push(ValidationIssue::MissingReference {
            kind,
            id: id.to_string(),
            context,
        });
    }
}

fn check_optional_scene(id: Option<&str>, ids: &IdSets<'_>, context: String, issues: &mut Vec<ValidationIssue>) {
    if let Some(id) = id {
        check_ref("scene", id, ids.scenes, context, issues);
    }
}

fn validate_scene(story: &StoryDef, scene: &SceneDef, ids: &IdSets<'_>, issues: &mut Vec<ValidationIssue>) {
    let context = format!("scene '{}'", scene.id);

    if let Some(location) = scene.location_id.as_deref().filter(|l| !l.is_empty()) {
        check_ref("location", location, ids.locations, context.clone(), issues);
    }
    check_optional_scene(scene.next_scene(), ids, format!("{context} next scene"), issues);
    validate_lock(scene.unlock_price, &scene.unlock_conditions, ids, &context, issues);

    match (scene.scene_type, scene.revival_point_id.as_deref().filter(|r| !r.is_empty())) {
        (SceneType::BadEnding, Some(target)) => match story.scene(target) {
            None => check_ref("scene", target, ids.scenes, format!("{context} revival point"), issues),
            Some(target_scene) if target_scene.scene_type == SceneType::BadEnding => {
                issues.push(ValidationIssue::InvalidValue {
                    context: format!("{context} revival point '{target}' is itself a bad ending"),
                });
            },
            Some(_) => {},
        },
        (_, Some(_)) => {
            issues.push(ValidationIssue::InvalidValue {
                context: format!("{context} has a revival point but is not a bad ending"),
            });
        },
        (_, None) => {},
    }

    let mut element_ids = HashSet::new();
    track_ids(
        "element",
        scene.elements.iter().map(|e| e.id.as_str()),
        &mut element_ids,
        issues,
    );

    for (index, element) in scene.elements.iter().enumerate() {
        let kind = element.kind.type_name();
        check_present("id", &element.id, || format!("{context} {kind} element #{index}"), issues);
        let context = format!("{context} {kind} '{}'", element.id);
        match &element.kind {
            ElementKind::Narration(_) => {},
            ElementKind::Dialogue(line) | ElementKind::Thought(line) => {
                check_ref("character", &line.character_id, ids.characters, context, issues);
            },
            ElementKind::Choice(choice) => {
                let mut option_ids = HashSet::new();
                track_ids(
                    "option",
                    choice.options.iter().map(|o| o.id.as_str()),
                    &mut option_ids,
                    issues,
                );
                for (index, option) in choice.options.iter().enumerate() {
                    check_present("id", &option.id, || format!("{context} option #{index}"), issues);
                    let context = format!("{context} option '{}'", option.id);
                    check_optional_scene(option.next_scene(), ids, context.clone(), issues);
                    validate_value_changes(&option.value_changes, ids, &context, issues);
                    validate_lock(option.unlock_price, &option.unlock_conditions, ids, &context, issues);
                }
            },
            ElementKind::Qte(qte) => {
                if qte.time_limit <= 0.0 {
                    issues.push(ValidationIssue::InvalidValue {
                        context: format!("{context}: qte time limit <= 0"),
                    });
                }
                validate_outcome(&qte.success, ids, &format!("{context} success"), issues);
                validate_outcome(&qte.failure, ids, &format!("{context} failure"), issues);
            },
            ElementKind::DialogueTask(task) => {
                validate_outcome(&task.success, ids, &format!("{context} success"), issues);
                validate_outcome(&task.failure, ids, &format!("{context} failure"), issues);
            },
        }
    }

    if scene_is_incomplete(scene) {
        issues.push(ValidationIssue::IncompleteScene { id: scene.id.clone() });
    }
}

fn validate_outcome(outcome: &OutcomeDef, ids: &IdSets<'_>, context: &str, issues: &mut Vec<ValidationIssue>) {
    check_optional_scene(outcome.target_scene(), ids, context.to_string(), issues);
    validate_value_changes(&outcome.value_changes, ids, context, issues);
}

fn validate_value_changes(
    changes: &[ValueChangeDef],
    ids: &IdSets<'_>,
    context: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    for change in changes {
        check_ref("value", &change.value_id, ids.values, context.to_string(), issues);
    }
}

fn validate_lock(
    price: Option<f64>,
    conditions: &[ConditionDef],
    ids: &IdSets<'_>,
    context: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    if let Some(price) = price {
        if price < 0.0 {
            issues.push(ValidationIssue::InvalidValue {
                context: format!("{context}: unlock price < 0"),
            });
        }
    }
    validate_conditions(conditions, ids, context, issues);
}

fn validate_conditions(conditions: &[ConditionDef], ids: &IdSets<'_>, context: &str, issues: &mut Vec<ValidationIssue>) {
    for cond in conditions {
        check_ref("value", &cond.value_id, ids.values, context.to_string(), issues);
        if cond.operator == ComparisonOp::Unknown {
            issues.push(ValidationIssue::InvalidValue {
                context: format!("{context}: condition on '{}' has an unknown operator", cond.value_id),
            });
        }
    }
}

fn check_present(field: &'static str, text: &str, context: impl FnOnce() -> String, issues: &mut Vec<ValidationIssue>) {
    if text.trim().is_empty() {
        issues.push(ValidationIssue::MissingField {
            field,
            context: context(),
        });
    }
}
