//! Narrative graph built from a story's id references.
//!
//! Scenes are nodes. Edges come from `nextSceneId`, choice option targets,
//! qte / dialogue task outcomes, and revival points on bad endings. Targets are
//! plain ids and may dangle; the graph records them as-is and reports them.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use plotline_data::{ElementKind, Id, SceneType, StoryDef, scene_is_incomplete};

/// Why an edge exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    Next,
    Choice { element_id: Id, option_id: Id },
    Success { element_id: Id },
    Failure { element_id: Id },
    Revival,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Next => write!(f, "next"),
            EdgeKind::Choice { element_id, option_id } => write!(f, "choice {element_id}/{option_id}"),
            EdgeKind::Success { element_id } => write!(f, "success {element_id}"),
            EdgeKind::Failure { element_id } => write!(f, "failure {element_id}"),
            EdgeKind::Revival => write!(f, "revival"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: Id,
    pub to: Id,
    pub kind: EdgeKind,
}

/// Directed scene graph for a story.
#[derive(Debug, Clone, Default)]
pub struct StoryGraph {
    scene_ids: Vec<Id>,
    scene_types: HashMap<Id, SceneType>,
    edges: Vec<Edge>,
    incomplete: Vec<Id>,
}

impl StoryGraph {
    pub fn build(story: &StoryDef) -> Self {
        let mut graph = StoryGraph::default();

        for scene in &story.scenes {
            graph.scene_ids.push(scene.id.clone());
            graph.scene_types.insert(scene.id.clone(), scene.scene_type);
            if scene_is_incomplete(scene) {
                graph.incomplete.push(scene.id.clone());
            }

            let mut link = |to: &str, kind: EdgeKind| {
                graph.edges.push(Edge {
                    from: scene.id.clone(),
                    to: to.to_string(),
                    kind,
                });
            };

            for element in scene.ordered_elements() {
                let element_id = || element.id.clone();
                match &element.kind {
                    ElementKind::Choice(choice) => {
                        for option in &choice.options {
                            if let Some(to) = option.next_scene() {
                                link(
                                    to,
                                    EdgeKind::Choice {
                                        element_id: element_id(),
                                        option_id: option.id.clone(),
                                    },
                                );
                            }
                        }
                    },
                    ElementKind::Qte(qte) => {
                        if let Some(to) = qte.success.target_scene() {
                            link(to, EdgeKind::Success { element_id: element_id() });
                        }
                        if let Some(to) = qte.failure.target_scene() {
                            link(to, EdgeKind::Failure { element_id: element_id() });
                        }
                    },
                    ElementKind::DialogueTask(task) => {
                        if let Some(to) = task.success.target_scene() {
                            link(to, EdgeKind::Success { element_id: element_id() });
                        }
                        if let Some(to) = task.failure.target_scene() {
                            link(to, EdgeKind::Failure { element_id: element_id() });
                        }
                    },
                    ElementKind::Narration(_) | ElementKind::Dialogue(_) | ElementKind::Thought(_) => {},
                }
            }
            if let Some(to) = scene.next_scene() {
                link(to, EdgeKind::Next);
            }
            if let Some(to) = scene.revival_point() {
                link(to, EdgeKind::Revival);
            }
        }
        graph
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_from<'g>(&'g self, scene_id: &'g str) -> impl Iterator<Item = &'g Edge> + 'g {
        self.edges.iter().filter(move |e| e.from == scene_id)
    }

    /// Scenes of type `start`, in story order.
    pub fn start_scenes(&self) -> Vec<&str> {
        self.scene_ids
            .iter()
            .filter(|id| self.scene_types.get(*id) == Some(&SceneType::Start))
            .map(String::as_str)
            .collect()
    }

    pub fn contains(&self, scene_id: &str) -> bool {
        self.scene_types.contains_key(scene_id)
    }

    /// Edges whose target is not a scene in the story.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        self.edges.iter().filter(|e| !self.contains(&e.to)).collect()
    }

    /// Every scene reachable from any start scene, following all edge kinds.
    pub fn reachable_from_start(&self) -> HashSet<&str> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = self.start_scenes().into_iter().collect();
        while let Some(id) = queue.pop_front() {
            if !seen.insert(id) {
                continue;
            }
            for edge in self.edges.iter().filter(|e| e.from == id) {
                if self.contains(&edge.to) && !seen.contains(edge.to.as_str()) {
                    queue.push_back(edge.to.as_str());
                }
            }
        }
        seen
    }

    /// Scenes no start scene can reach, in story order.
    pub fn unreachable_scenes(&self) -> Vec<&str> {
        let reachable = self.reachable_from_start();
        self.scene_ids
            .iter()
            .map(String::as_str)
            .filter(|id| !reachable.contains(id))
            .collect()
    }

    /// Normal scenes with no way forward.
    pub fn incomplete_scenes(&self) -> &[Id] {
        &self.incomplete
    }

    pub fn is_incomplete(&self, scene_id: &str) -> bool {
        self.incomplete.iter().any(|id| id == scene_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn story() -> StoryDef {
        serde_json::from_value(json!({
            "title": "Graph",
            "scenes": [
                {"id": "start", "type": "start", "elements": [
                    {"id": "pick", "order": 0, "type": "choice", "options": [
                        {"id": "l", "text": "Left", "nextSceneId": "left"},
                        {"id": "r", "text": "Right", "nextSceneId": "right"},
                        {"id": "x", "text": "Stay"}
                    ]}
                ]},
                {"id": "left", "elements": [
                    {"id": "dodge", "order": 0, "type": "qte", "qteType": "action", "timeLimit": 2,
                     "keySequence": ["space"], "success": {"sceneId": "end"}, "failure": {"sceneId": "dead"}}
                ]},
                {"id": "right", "nextSceneId": "void"},
                {"id": "dead", "type": "bad-ending", "revivalPointId": "left"},
                {"id": "end", "type": "ending"},
                {"id": "island"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn edges_cover_every_branch_kind() {
        let graph = StoryGraph::build(&story());
        let from_start: Vec<_> = graph.edges_from("start").map(|e| e.to.as_str()).collect();
        assert_eq!(from_start, ["left", "right"]);

        let kinds: Vec<_> = graph.edges_from("left").map(|e| e.kind.clone()).collect();
        assert_eq!(
            kinds,
            [
                EdgeKind::Success { element_id: "dodge".into() },
                EdgeKind::Failure { element_id: "dodge".into() }
            ]
        );
        assert!(graph.edges_from("dead").any(|e| e.kind == EdgeKind::Revival));
    }

    #[test]
    fn dangling_targets_are_reported() {
        let graph = StoryGraph::build(&story());
        let dangling: Vec<_> = graph.dangling_edges().into_iter().map(|e| e.to.as_str()).collect();
        assert_eq!(dangling, ["void"]);
    }

    #[test]
    fn reachability_follows_all_edges() {
        let graph = StoryGraph::build(&story());
        let reachable = graph.reachable_from_start();
        for id in ["start", "left", "right", "dead", "end"] {
            assert!(reachable.contains(id), "{id}");
        }
        assert_eq!(graph.unreachable_scenes(), ["island"]);
    }

    #[test]
    fn incomplete_scenes_exclude_endings() {
        let graph = StoryGraph::build(&story());
        assert_eq!(graph.incomplete_scenes(), ["island".to_string()]);
        assert!(graph.is_incomplete("island"));
        assert!(!graph.is_incomplete("end"));
    }
}
