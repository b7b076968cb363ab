use uuid::Uuid;

/// Read-only prompt template consumed by the UI; never mutated by the
/// upload pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub id: PromptId,
    pub title: String,
    pub template: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PromptId(Uuid);

impl PromptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PromptId {
    fn default() -> Self {
        Self::new()
    }
}
