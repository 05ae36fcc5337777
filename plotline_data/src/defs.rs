use serde::{Deserialize, Serialize};

/// Stable identifier used across story references.
pub type Id = String;

/// Schema version written by this crate. Older documents are upgraded by [`crate::migrate`].
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Root story document: everything an author edits, previews, and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(default)]
    pub schema_version: u32,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub story_type: String,
    #[serde(default)]
    pub scenes: Vec<SceneDef>,
    #[serde(default)]
    pub characters: Vec<CharacterDef>,
    #[serde(default)]
    pub locations: Vec<LocationDef>,
    #[serde(default)]
    pub global_values: Vec<GlobalValueDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub titles: Vec<TitleDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chapters: Vec<ChapterDef>,
}

impl Default for StoryDef {
    fn default() -> Self {
        Self {
            id: None,
            schema_version: CURRENT_SCHEMA_VERSION,
            title: String::new(),
            author: String::new(),
            description: String::new(),
            story_type: String::new(),
            scenes: Vec::new(),
            characters: Vec::new(),
            locations: Vec::new(),
            global_values: Vec::new(),
            titles: Vec::new(),
            chapters: Vec::new(),
        }
    }
}

impl StoryDef {
    /// Look up a scene by id.
    pub fn scene(&self, id: &str) -> Option<&SceneDef> {
        self.scenes.iter().find(|s| s.id == id)
    }

    /// Look up a character by id.
    pub fn character(&self, id: &str) -> Option<&CharacterDef> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// First scene of type `start`, if any. A playable story should have exactly one.
    pub fn start_scene(&self) -> Option<&SceneDef> {
        self.scenes.iter().find(|s| s.scene_type == SceneType::Start)
    }
}

/// A named numeric variable tracked across a playthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalValueDef {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub initial_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    /// Authoring hint only; values are always compared numerically.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
}

impl GlobalValueDef {
    /// Runtime value if overridden, otherwise the initial value.
    pub fn effective(&self) -> f64 {
        self.current_value.unwrap_or(self.initial_value)
    }
}

/// Role a scene plays in the narrative graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneType {
    Start,
    #[default]
    Normal,
    Ending,
    BadEnding,
}

impl SceneType {
    /// Ending scenes are terminal once their elements have been shown.
    pub fn is_ending(self) -> bool {
        matches!(self, SceneType::Ending | SceneType::BadEnding)
    }
}

/// Editor canvas coordinates for a scene node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A scene: an ordered list of elements plus the edges leaving it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDef {
    pub id: Id,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type", default)]
    pub scene_type: SceneType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<Id>,
    #[serde(default)]
    pub elements: Vec<ElementDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_scene_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revival_point_id: Option<Id>,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unlock_conditions: Vec<ConditionDef>,
}

impl SceneDef {
    /// Linear fallthrough target, treating an empty id as absent.
    pub fn next_scene(&self) -> Option<&str> {
        non_empty(self.next_scene_id.as_deref())
    }

    /// Revival target; only meaningful on `bad-ending` scenes.
    pub fn revival_point(&self) -> Option<&str> {
        if self.scene_type == SceneType::BadEnding {
            non_empty(self.revival_point_id.as_deref())
        } else {
            None
        }
    }

    /// Elements sorted by ascending `order`; ties keep their list position.
    pub fn ordered_elements(&self) -> Vec<&ElementDef> {
        let mut elements: Vec<&ElementDef> = self.elements.iter().collect();
        elements.sort_by_key(|e| e.order);
        elements
    }
}

/// One entry in a scene's element list.
///
/// A missing `id` decodes as empty; [`crate::validate_story`] reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementDef {
    #[serde(default)]
    pub id: Id,
    #[serde(default)]
    pub order: i64,
    #[serde(flatten)]
    pub kind: ElementKind,
}

/// The six element shapes, discriminated by the `type` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ElementKind {
    Narration(LineDef),
    Dialogue(SpokenLineDef),
    Thought(SpokenLineDef),
    Choice(ChoiceDef),
    Qte(QteDef),
    DialogueTask(DialogueTaskDef),
}

impl ElementKind {
    /// The `type` tag this element is stored under.
    pub fn type_name(&self) -> &'static str {
        match self {
            ElementKind::Narration(_) => "narration",
            ElementKind::Dialogue(_) => "dialogue",
            ElementKind::Thought(_) => "thought",
            ElementKind::Choice(_) => "choice",
            ElementKind::Qte(_) => "qte",
            ElementKind::DialogueTask(_) => "dialogueTask",
        }
    }

    /// True for elements that stop the scene and branch.
    pub fn is_branching(&self) -> bool {
        matches!(
            self,
            ElementKind::Choice(_) | ElementKind::Qte(_) | ElementKind::DialogueTask(_)
        )
    }
}

/// Narration text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineDef {
    #[serde(default)]
    pub text: String,
}

/// Dialogue or thought attributed to a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpokenLineDef {
    #[serde(default)]
    pub character_id: Id,
    #[serde(default)]
    pub text: String,
}

/// A player choice between options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default)]
    pub options: Vec<ChoiceOptionDef>,
}

/// A single selectable branch of a choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOptionDef {
    #[serde(default)]
    pub id: Id,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_scene_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_changes: Vec<ValueChangeDef>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unlock_conditions: Vec<ConditionDef>,
}

impl ChoiceOptionDef {
    pub fn next_scene(&self) -> Option<&str> {
        non_empty(self.next_scene_id.as_deref())
    }
}

/// Which mini-game a QTE renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QteType {
    #[default]
    Action,
    Combo,
    Unlock,
}

/// Arrow inputs used by combo QTEs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Quick-time event with a success and a failure branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QteDef {
    #[serde(default)]
    pub qte_type: QteType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Seconds allowed for the input.
    #[serde(default = "default_time_limit")]
    pub time_limit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_sequence: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction_sequence: Option<Vec<Direction>>,
    /// Grid cell indices, in the order they must be traced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_pattern: Option<Vec<u32>>,
    #[serde(default)]
    pub success: OutcomeDef,
    #[serde(default)]
    pub failure: OutcomeDef,
}

fn default_time_limit() -> f64 {
    5.0
}

/// Free-text challenge judged for success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTaskDef {
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default)]
    pub success: OutcomeDef,
    #[serde(default)]
    pub failure: OutcomeDef,
}

/// Result branch of a QTE or dialogue task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value_changes: Vec<ValueChangeDef>,
}

impl OutcomeDef {
    pub fn target_scene(&self) -> Option<&str> {
        non_empty(self.scene_id.as_deref())
    }
}

/// How a value change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueOperation {
    #[default]
    Add,
    Subtract,
    Set,
}

/// Mutation of a global value triggered by a branch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueChangeDef {
    #[serde(default)]
    pub value_id: Id,
    #[serde(default)]
    pub operation: ValueOperation,
    #[serde(default)]
    pub value: f64,
}

/// Comparison used by unlock and title conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOp {
    Gt,
    Lt,
    Eq,
    Gte,
    Lte,
    /// Missing, or any operator string this crate does not know; never satisfied.
    #[default]
    #[serde(other)]
    Unknown,
}

/// `(value, operator, target)` triple tested against the value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionDef {
    #[serde(default)]
    pub value_id: Id,
    #[serde(default)]
    pub operator: ComparisonOp,
    #[serde(default)]
    pub target_value: f64,
}

/// Character referenced by dialogue and thought elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterDef {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Location referenced by scenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDef {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// Honor awarded when all of its conditions hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleDef {
    pub id: Id,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub conditions: Vec<ConditionDef>,
}

/// Grouping of scenes for navigation and import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDef {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub scene_ids: Vec<Id>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elements_deserialize_by_type_tag() {
        let raw = r#"{
            "id": "e1",
            "order": 2,
            "type": "dialogue",
            "characterId": "alice",
            "text": "Hello."
        }"#;
        let element: ElementDef = serde_json::from_str(raw).unwrap();
        assert_eq!(element.order, 2);
        match element.kind {
            ElementKind::Dialogue(line) => {
                assert_eq!(line.character_id, "alice");
                assert_eq!(line.text, "Hello.");
            },
            other => panic!("unexpected element {other:?}"),
        }
    }

    #[test]
    fn unknown_operator_is_tolerated() {
        let cond: ConditionDef =
            serde_json::from_str(r#"{"valueId": "v", "operator": "neq", "targetValue": 1}"#).unwrap();
        assert_eq!(cond.operator, ComparisonOp::Unknown);
    }

    #[test]
    fn partial_entries_take_defaults() {
        let cond: ConditionDef = serde_json::from_str(r#"{"valueId": "v", "operator": "gt"}"#).unwrap();
        assert_eq!(cond.operator, ComparisonOp::Gt);
        assert_eq!(cond.target_value, 0.0);
        let cond: ConditionDef = serde_json::from_str(r#"{"valueId": "v"}"#).unwrap();
        assert_eq!(cond.operator, ComparisonOp::Unknown);

        let change: ValueChangeDef = serde_json::from_str(r#"{"valueId": "v"}"#).unwrap();
        assert_eq!((change.operation, change.value), (ValueOperation::Add, 0.0));

        let element: ElementDef = serde_json::from_str(r#"{"type": "choice", "options": [{"text": "Go"}]}"#).unwrap();
        assert_eq!(element.id, "");
        assert_eq!(element.kind.type_name(), "choice");

        let character: CharacterDef = serde_json::from_str(r#"{"id": "c"}"#).unwrap();
        assert_eq!(character.name, "");
    }

    #[test]
    fn bad_ending_type_uses_kebab_case() {
        let scene: SceneDef = serde_json::from_str(r#"{"id": "s", "type": "bad-ending"}"#).unwrap();
        assert_eq!(scene.scene_type, SceneType::BadEnding);
        assert!(scene.scene_type.is_ending());
    }

    #[test]
    fn empty_targets_count_as_absent() {
        let scene: SceneDef =
            serde_json::from_str(r#"{"id": "s", "type": "bad-ending", "nextSceneId": "", "revivalPointId": "a"}"#)
                .unwrap();
        assert_eq!(scene.next_scene(), None);
        assert_eq!(scene.revival_point(), Some("a"));
    }

    #[test]
    fn revival_point_ignored_outside_bad_endings() {
        let scene: SceneDef = serde_json::from_str(r#"{"id": "s", "type": "ending", "revivalPointId": "a"}"#).unwrap();
        assert_eq!(scene.revival_point(), None);
    }

    #[test]
    fn ordered_elements_keep_ties_stable() {
        let scene: SceneDef = serde_json::from_str(
            r#"{"id": "s", "elements": [
                {"id": "b", "order": 1, "type": "narration", "text": "b"},
                {"id": "a", "order": 0, "type": "narration", "text": "a"},
                {"id": "c", "order": 1, "type": "narration", "text": "c"}
            ]}"#,
        )
        .unwrap();
        let ids: Vec<_> = scene.ordered_elements().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }
}
