use serde::Serialize;
use studio_core::{Intent, Mode, Passage};

/// The record threaded through every stage of one run.
///
/// Owned by a single run; never shared. Fields a mode does not use stay at
/// their zero value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestState {
    pub question: String,
    pub user_id: String,
    pub mode: Mode,
    pub intent: Option<Intent>,
    pub retrieved_passages: Vec<Passage>,
    /// Append-only scratch buffer of pre-analysis blocks.
    pub tool_context: String,
    pub intermediate_answer: String,
    pub answer: String,
    pub memory_snippet_loaded: Option<String>,
    pub memory_snippet_to_save: Option<String>,
    pub video_url: String,
    pub video_chapters: Vec<String>,
    pub research_plan: String,
}

impl RequestState {
    pub fn new(
        question: impl Into<String>,
        user_id: impl Into<String>,
        mode: Mode,
        video_url: impl Into<String>,
    ) -> Self {
        Self {
            question: question.into(),
            user_id: user_id.into(),
            mode,
            video_url: video_url.into(),
            ..Default::default()
        }
    }
}

/// A partial update returned by a stage.
///
/// Only the fields a stage sets are merged into the state; everything else
/// is left untouched. Request inputs (`question`, `user_id`, `mode`,
/// `video_url`) cannot be changed by a stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    intent: Option<Option<Intent>>,
    retrieved_passages: Option<Vec<Passage>>,
    tool_context: Option<String>,
    intermediate_answer: Option<String>,
    answer: Option<String>,
    memory_snippet_loaded: Option<Option<String>>,
    memory_snippet_to_save: Option<Option<String>>,
    video_chapters: Option<Vec<String>>,
    research_plan: Option<String>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intent(mut self, intent: Option<Intent>) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn retrieved_passages(mut self, passages: Vec<Passage>) -> Self {
        self.retrieved_passages = Some(passages);
        self
    }

    /// Append a block to `tool_context`. Repeated calls accumulate.
    pub fn append_tool_context(mut self, block: impl Into<String>) -> Self {
        let block = block.into();
        self.tool_context = Some(match self.tool_context.take() {
            Some(prev) => join_block(&prev, &block),
            None => block,
        });
        self
    }

    pub fn intermediate_answer(mut self, answer: impl Into<String>) -> Self {
        self.intermediate_answer = Some(answer.into());
        self
    }

    pub fn answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    pub fn memory_snippet_loaded(mut self, snippet: Option<String>) -> Self {
        self.memory_snippet_loaded = Some(snippet);
        self
    }

    pub fn memory_snippet_to_save(mut self, snippet: Option<String>) -> Self {
        self.memory_snippet_to_save = Some(snippet);
        self
    }

    pub fn video_chapters(mut self, chapters: Vec<String>) -> Self {
        self.video_chapters = Some(chapters);
        self
    }

    pub fn research_plan(mut self, plan: impl Into<String>) -> Self {
        self.research_plan = Some(plan.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields().is_empty()
    }

    /// Names of the fields this update sets.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.intent.is_some() {
            fields.push("intent");
        }
        if self.retrieved_passages.is_some() {
            fields.push("retrieved_passages");
        }
        if self.tool_context.is_some() {
            fields.push("tool_context");
        }
        if self.intermediate_answer.is_some() {
            fields.push("intermediate_answer");
        }
        if self.answer.is_some() {
            fields.push("answer");
        }
        if self.memory_snippet_loaded.is_some() {
            fields.push("memory_snippet_loaded");
        }
        if self.memory_snippet_to_save.is_some() {
            fields.push("memory_snippet_to_save");
        }
        if self.video_chapters.is_some() {
            fields.push("video_chapters");
        }
        if self.research_plan.is_some() {
            fields.push("research_plan");
        }
        fields
    }

    /// Merge into `state`, field by field.
    pub fn apply(self, state: &mut RequestState) {
        if let Some(v) = self.intent {
            state.intent = v;
        }
        if let Some(v) = self.retrieved_passages {
            state.retrieved_passages = v;
        }
        if let Some(block) = self.tool_context {
            state.tool_context = join_block(&state.tool_context, &block);
        }
        if let Some(v) = self.intermediate_answer {
            state.intermediate_answer = v;
        }
        if let Some(v) = self.answer {
            state.answer = v;
        }
        if let Some(v) = self.memory_snippet_loaded {
            state.memory_snippet_loaded = v;
        }
        if let Some(v) = self.memory_snippet_to_save {
            state.memory_snippet_to_save = v;
        }
        if let Some(v) = self.video_chapters {
            state.video_chapters = v;
        }
        if let Some(v) = self.research_plan {
            state.research_plan = v;
        }
    }
}

fn join_block(existing: &str, block: &str) -> String {
    format!("{existing}\n{block}").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> RequestState {
        RequestState::new("What is X?", "u1", Mode::Docs, "")
    }

    #[test]
    fn test_initial_state_is_zeroed() {
        let s = state();
        assert_eq!(s.intent, None);
        assert!(s.retrieved_passages.is_empty());
        assert!(s.tool_context.is_empty());
        assert!(s.memory_snippet_loaded.is_none());
        assert!(s.memory_snippet_to_save.is_none());
        assert!(s.video_chapters.is_empty());
    }

    #[test]
    fn test_unmentioned_fields_untouched() {
        let mut s = state();
        s.answer = "kept".into();
        s.memory_snippet_loaded = Some("likes rust".into());

        StateUpdate::new().intermediate_answer("draft").apply(&mut s);

        assert_eq!(s.answer, "kept");
        assert_eq!(s.intermediate_answer, "draft");
        assert_eq!(s.memory_snippet_loaded.as_deref(), Some("likes rust"));
    }

    #[test]
    fn test_explicit_none_clears_optional_field() {
        let mut s = state();
        s.memory_snippet_loaded = Some("stale".into());
        StateUpdate::new().memory_snippet_loaded(None).apply(&mut s);
        assert!(s.memory_snippet_loaded.is_none());
    }

    #[test]
    fn test_tool_context_appends() {
        let mut s = state();
        StateUpdate::new().append_tool_context("[A]\none").apply(&mut s);
        StateUpdate::new()
            .append_tool_context("[B]\ntwo")
            .append_tool_context("[C]\nthree")
            .apply(&mut s);
        assert_eq!(s.tool_context, "[A]\none\n[B]\ntwo\n[C]\nthree");
    }

    #[test]
    fn test_fields_lists_what_is_set() {
        let update = StateUpdate::new().answer("a").memory_snippet_to_save(None);
        assert_eq!(update.fields(), vec!["answer", "memory_snippet_to_save"]);
        assert!(StateUpdate::new().is_empty());
    }
}
