use anyhow::Result;
use plotline_data::{CURRENT_SCHEMA_VERSION, ElementKind, ValidationIssue, migrate_document, validate_story};
use plotline_engine::document::{export_story_string, export_story_to_dir, import_story_file, import_story_str};
use plotline_engine::graph::StoryGraph;
use serde_json::{Value, json};
use tempfile::tempdir;

fn legacy_doc() -> Value {
    json!({
        "title": "Lantern Festival",
        "author": "M. Reyes",
        "type": "romance",
        "characters": [{"id": "li", "name": "Li", "color": "#ff8800"}],
        "locations": [{"id": "river", "name": "River bank"}],
        "globalValues": [{"id": "affection", "name": "Affection", "initialValue": 0, "type": "number"}],
        "titles": [{"id": "sweet", "name": "Sweetheart", "conditions": [
            {"valueId": "affection", "operator": "gte", "targetValue": 5}
        ]}],
        "scenes": [
            {"id": "s1", "title": "Lanterns", "type": "start", "locationId": "river",
             "position": {"x": 0, "y": 0}, "nextSceneId": "s2", "elements": [
                {"id": "n1", "type": "narration", "text": "Paper lanterns drift past."},
                {"id": "d1", "type": "dialogue", "characterId": "li", "text": "Make a wish."},
                {"id": "q1", "type": "qte", "qteType": "action", "timeLimit": 3,
                 "keySequence": ["w"], "successSceneId": "s2", "failureSceneId": "s3"}
            ]},
            {"id": "s2", "title": "Wish", "type": "ending", "elements": []},
            {"id": "s3", "title": "Splash", "type": "bad-ending", "revivalPointId": "s1", "elements": []}
        ]
    })
}

#[test]
fn migration_is_idempotent() -> Result<()> {
    let once = migrate_document(legacy_doc())?;
    let twice = migrate_document(once.clone())?;
    assert_eq!(once, twice);
    assert_eq!(once["schemaVersion"], json!(CURRENT_SCHEMA_VERSION));
    let qte = &once["scenes"][0]["elements"][2];
    assert_eq!(qte["success"]["sceneId"], json!("s2"));
    assert!(qte.get("successSceneId").is_none());
    Ok(())
}

#[test]
fn export_then_import_is_lossless() -> Result<()> {
    let story = import_story_str(&legacy_doc().to_string())?;
    let exported = export_story_string(&story, true)?;
    assert_eq!(import_story_str(&exported)?, story);

    let dir = tempdir()?;
    let path = export_story_to_dir(&story, dir.path(), false)?;
    assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("lantern-festival.json"));
    assert_eq!(import_story_file(&path)?, story);
    Ok(())
}

#[test]
fn imported_legacy_story_has_qte_edges() -> Result<()> {
    let story = import_story_str(&legacy_doc().to_string())?;
    let element = story.scenes[0].elements.iter().find(|e| e.id == "q1").unwrap();
    let ElementKind::Qte(qte) = &element.kind else {
        panic!("expected a qte element");
    };
    assert_eq!(element.order, 2);
    assert_eq!(qte.failure.target_scene(), Some("s3"));

    let graph = StoryGraph::build(&story);
    assert!(graph.dangling_edges().is_empty());
    assert!(graph.unreachable_scenes().is_empty());
    Ok(())
}

#[test]
fn half_filled_entries_import_and_are_reported() -> Result<()> {
    let doc = json!({
        "title": "Drafty",
        "characters": [{"id": "li"}],
        "globalValues": [{"id": "v", "name": "V"}],
        "scenes": [
            {"id": "s1", "type": "start", "nextSceneId": "s2", "elements": [
                {"type": "narration", "text": "Untagged."},
                {"id": "c1", "type": "choice", "options": [
                    {"text": "Go", "nextSceneId": "s2", "locked": true,
                     "unlockConditions": [{"valueId": "v", "operator": "gt"}],
                     "valueChanges": [{"valueId": "v"}]}
                ]}
            ]},
            {"id": "s2", "type": "ending"}
        ]
    });
    let story = import_story_str(&doc.to_string())?;
    assert_eq!(story.characters[0].name, "");

    let issues = validate_story(&story);
    let missing: Vec<String> = issues
        .iter()
        .filter(|issue| matches!(issue, ValidationIssue::MissingField { .. }))
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        missing,
        [
            "character 'li' has no name",
            "scene 's1' narration element #0 has no id",
            "scene 's1' choice 'c1' option #0 has no id",
        ]
    );
    Ok(())
}
