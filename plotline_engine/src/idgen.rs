//! ** idgen module **
//! Story ids are random (v4). Ids for drafted scenes, elements and chapters are v5 UUIDs
//! derived from the story title and their position, so re-running a conversion on the same
//! text gives the same ids.
use uuid::Uuid;

pub const NAMESPACE_SCENE: Uuid = uuid::uuid!("6a3f1c2e-8d47-4b9a-a1f0-3c5e7d9b2a64");

pub const NAMESPACE_ELEMENT: Uuid = uuid::uuid!("b81d4e07-29c6-4f53-9e8a-71d0c4f5a3b2");

pub const NAMESPACE_CHAPTER: Uuid = uuid::uuid!("e4c29a51-6f08-4d3b-8b72-a0d95e1c7f36");

/// Fresh random id for a story that arrived without one.
pub fn new_story_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a v5 UUID for a token within one of the namespaces above.
pub fn uuid_from_token(namespace: &Uuid, token: &str) -> Uuid {
    Uuid::new_v5(namespace, token.as_bytes())
}
