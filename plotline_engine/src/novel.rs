//! Plain-text novel import.
//!
//! A novel is split into chapters on heading lines, then drafted into a linear story: one
//! scene per chapter, one narration element per paragraph. The draft is a starting point
//! for an author; branching is added by hand afterwards.

use log::{debug, info};
use plotline_data::{
    CURRENT_SCHEMA_VERSION, ChapterDef, ElementDef, ElementKind, LineDef, Position, SceneDef, SceneType, StoryDef,
};
use regex::Regex;

use crate::idgen::{NAMESPACE_CHAPTER, NAMESPACE_ELEMENT, NAMESPACE_SCENE, new_story_id, uuid_from_token};
use crate::slug::sanitize_slug;

/// Matches `Chapter 3`, `CHAPTER IV: The Storm`, `Part 2`, and `第十二章`.
///
/// Roman numerals must be uppercase and end the line or be followed by `:`, `.` or `-`,
/// so prose like "Part civil servant" is not a heading.
pub const DEFAULT_CHAPTER_HEADING: &str =
    r"^(?:(?i:chapter|part)\s+(?:\d+\b.*|[IVXLCDM]+(?:[:.\-].*)?)|第\s*[0-9零一二三四五六七八九十百千]+\s*章.*)$";

/// Title given to text that appears before the first heading.
pub const PROLOGUE_TITLE: &str = "Prologue";

/// Horizontal spacing between drafted scene nodes on the editor canvas.
const SCENE_SPACING: f64 = 280.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NovelChapter {
    pub title: String,
    pub body: String,
}

impl NovelChapter {
    /// Non-blank paragraphs, separated in the source by blank lines.
    pub fn paragraphs(&self) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        for line in self.body.lines() {
            let line = line.trim();
            if line.is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join("\n"));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join("\n"));
        }
        paragraphs
    }
}

/// Compile a chapter heading pattern, falling back to [`DEFAULT_CHAPTER_HEADING`].
///
/// # Errors
/// - if `pattern` is not a valid regex
pub fn heading_regex(pattern: Option<&str>) -> Result<Regex, regex::Error> {
    Regex::new(pattern.unwrap_or(DEFAULT_CHAPTER_HEADING))
}

/// Split novel text into chapters on lines matching `heading`.
///
/// Lines are trimmed before matching. Non-blank text before the first heading becomes a
/// [`PROLOGUE_TITLE`] chapter; text with no headings at all becomes one chapter titled `untitled`.
pub fn split_chapters(text: &str, heading: &Regex, untitled: &str) -> Vec<NovelChapter> {
    let mut chapters = Vec::new();
    let mut title: Option<String> = None;
    let mut body = String::new();

    for line in text.lines() {
        let trimmed = line.trim();
        if !trimmed.is_empty() && heading.is_match(trimmed) {
            flush_chapter(&mut chapters, title.take(), &mut body);
            debug!("chapter heading: {trimmed}");
            title = Some(trimmed.to_string());
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }

    if title.is_none() && chapters.is_empty() {
        // no headings anywhere
        if body.trim().is_empty() {
            return chapters;
        }
        title = Some(untitled.to_string());
    }
    flush_chapter(&mut chapters, title, &mut body);
    chapters
}

fn flush_chapter(chapters: &mut Vec<NovelChapter>, title: Option<String>, body: &mut String) {
    let text = std::mem::take(body);
    match title {
        Some(title) => chapters.push(NovelChapter { title, body: text }),
        None if !text.trim().is_empty() => chapters.push(NovelChapter {
            title: PROLOGUE_TITLE.to_string(),
            body: text,
        }),
        None => {},
    }
}

/// Draft a linear story from chapters.
///
/// Scenes are chained with `nextSceneId`. The first scene is the start and the last is an
/// ending; a single chapter yields a lone start scene.
pub fn draft_story_from_chapters(title: &str, chapters: &[NovelChapter]) -> StoryDef {
    let slug = sanitize_slug(title);
    let scene_id = |index: usize| uuid_from_token(&NAMESPACE_SCENE, &format!("{slug}/{index}")).to_string();
    let last = chapters.len().saturating_sub(1);

    let mut scenes = Vec::with_capacity(chapters.len());
    let mut chapter_defs = Vec::with_capacity(chapters.len());
    for (index, chapter) in chapters.iter().enumerate() {
        let id = scene_id(index);
        let elements = chapter
            .paragraphs()
            .into_iter()
            .enumerate()
            .map(|(order, text)| ElementDef {
                id: uuid_from_token(&NAMESPACE_ELEMENT, &format!("{slug}/{index}/{order}")).to_string(),
                order: i64::try_from(order).unwrap_or(i64::MAX),
                kind: ElementKind::Narration(LineDef { text }),
            })
            .collect();
        let scene_type = if index == 0 {
            SceneType::Start
        } else if index == last {
            SceneType::Ending
        } else {
            SceneType::Normal
        };
        #[allow(clippy::cast_precision_loss)]
        let x = index as f64 * SCENE_SPACING;
        scenes.push(SceneDef {
            id: id.clone(),
            title: chapter.title.clone(),
            scene_type,
            location_id: None,
            elements,
            next_scene_id: (index < last).then(|| scene_id(index + 1)),
            revival_point_id: None,
            position: Position { x, y: 0.0 },
            locked: false,
            unlock_price: None,
            unlock_conditions: Vec::new(),
        });
        chapter_defs.push(ChapterDef {
            id: uuid_from_token(&NAMESPACE_CHAPTER, &format!("{slug}/{index}")).to_string(),
            title: chapter.title.clone(),
            scene_ids: vec![id],
        });
    }

    info!("drafted story '{title}' with {} scenes", scenes.len());
    StoryDef {
        id: Some(new_story_id()),
        schema_version: CURRENT_SCHEMA_VERSION,
        title: title.to_string(),
        story_type: "novel".to_string(),
        scenes,
        chapters: chapter_defs,
        ..StoryDef::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOVEL: &str = "\
The city slept.

Chapter 1: Arrival
Mara stepped off the train.
Nobody waited.

The station clock had stopped.

CHAPTER 2
Morning came late.

第三章 雨
雨还在下。
";

    fn default_heading() -> Regex {
        heading_regex(None).unwrap()
    }

    #[test]
    fn headings_split_chapters_and_keep_a_prologue() {
        let chapters = split_chapters(NOVEL, &default_heading(), "Novel");
        let titles: Vec<_> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["Prologue", "Chapter 1: Arrival", "CHAPTER 2", "第三章 雨"]);
        assert_eq!(
            chapters[1].paragraphs(),
            ["Mara stepped off the train.\nNobody waited.", "The station clock had stopped."]
        );
    }

    #[test]
    fn blank_prologue_is_dropped() {
        let chapters = split_chapters("\n\n  \nPart 1\nHello.\n", &default_heading(), "Novel");
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "Part 1");
    }

    #[test]
    fn headingless_text_is_one_chapter() {
        let chapters = split_chapters("Just one long story.\n\nThe end.", &default_heading(), "Short Story");
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title, "Short Story");
        assert_eq!(chapters[0].paragraphs().len(), 2);
        assert!(split_chapters("  \n", &default_heading(), "Empty").is_empty());
    }

    #[test]
    fn prose_mentioning_chapters_is_not_a_heading() {
        let heading = default_heading();
        assert!(!heading.is_match("She closed the chapter on her past."));
        assert!(heading.is_match("Chapter IV"));
        assert!(heading.is_match("CHAPTER XII: The Storm"));
        assert!(heading.is_match("part 3"));
        assert!(!heading.is_match("Chapters 1 and 2 were dull."));
        assert!(!heading.is_match("Chapter did not end well."));
        assert!(!heading.is_match("Part civil servant, part thief"));
        assert!(!heading.is_match("Chapter I went home."));
    }

    #[test]
    fn draft_links_scenes_in_order() {
        let chapters = split_chapters(NOVEL, &default_heading(), "Novel");
        let story = draft_story_from_chapters("Night Train", &chapters);

        assert_eq!(story.scenes.len(), 4);
        assert_eq!(story.scenes[0].scene_type, SceneType::Start);
        assert_eq!(story.scenes[1].scene_type, SceneType::Normal);
        assert_eq!(story.scenes[3].scene_type, SceneType::Ending);
        for pair in story.scenes.windows(2) {
            assert_eq!(pair[0].next_scene(), Some(pair[1].id.as_str()));
        }
        assert_eq!(story.scenes[3].next_scene(), None);
        assert_eq!(story.scenes[1].elements.len(), 2);
        assert_eq!(story.chapters[2].scene_ids, [story.scenes[2].id.clone()]);
        assert!(plotline_data::validate_story(&story).is_empty());
    }

    #[test]
    fn drafted_ids_are_stable() {
        let chapters = split_chapters(NOVEL, &default_heading(), "Novel");
        let a = draft_story_from_chapters("Night Train", &chapters);
        let b = draft_story_from_chapters("Night Train", &chapters);
        assert_ne!(a.id, b.id);
        assert_eq!(a.scenes[2].id, b.scenes[2].id);
    }
}
