use std::fmt;

use crate::router::Branch;

/// Every stage the engine knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageId {
    MemoryRead,
    Retrieve,
    VideoPrecontext,
    VideoChapters,
    PreToolContext,
    AnswerGeneration,
    ProductBuilder,
    ResearchPrecontext,
    ResearchAgent,
    Write,
    MemoryWrite,
}

impl StageId {
    pub fn name(&self) -> &'static str {
        match self {
            StageId::MemoryRead => "memory-read",
            StageId::Retrieve => "retrieve",
            StageId::VideoPrecontext => "video-precontext",
            StageId::VideoChapters => "video-chapters",
            StageId::PreToolContext => "pre-tool-context",
            StageId::AnswerGeneration => "answer-generation",
            StageId::ProductBuilder => "product-builder",
            StageId::ResearchPrecontext => "research-precontext",
            StageId::ResearchAgent => "research-agent",
            StageId::Write => "write",
            StageId::MemoryWrite => "memory-write",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const DOCS: &[StageId] = &[
    StageId::MemoryRead,
    StageId::Retrieve,
    StageId::PreToolContext,
    StageId::AnswerGeneration,
    StageId::Write,
    StageId::MemoryWrite,
];

const VIDEO: &[StageId] = &[
    StageId::MemoryRead,
    StageId::Retrieve,
    StageId::VideoPrecontext,
    StageId::VideoChapters,
    StageId::PreToolContext,
    StageId::AnswerGeneration,
    StageId::Write,
    StageId::MemoryWrite,
];

const PRODUCT: &[StageId] = &[StageId::ProductBuilder, StageId::Write, StageId::MemoryWrite];

const RESEARCH: &[StageId] = &[
    StageId::ResearchPrecontext,
    StageId::ResearchAgent,
    StageId::Write,
    StageId::MemoryWrite,
];

/// The dispatch table: the fixed stage sequence for each branch.
pub fn branch_stages(branch: Branch) -> &'static [StageId] {
    match branch {
        Branch::Docs => DOCS,
        Branch::Video => VIDEO,
        Branch::Product => PRODUCT,
        Branch::Research => RESEARCH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_branch_ends_with_memory_write() {
        for branch in Branch::ALL {
            assert_eq!(branch_stages(branch).last(), Some(&StageId::MemoryWrite), "{branch}");
        }
    }

    #[test]
    fn test_product_and_research_skip_retrieval() {
        assert!(!branch_stages(Branch::Product).contains(&StageId::Retrieve));
        assert!(!branch_stages(Branch::Research).contains(&StageId::Retrieve));
        assert!(!branch_stages(Branch::Research).contains(&StageId::MemoryRead));
    }

    #[test]
    fn test_video_stages_only_on_video_branch() {
        assert!(!branch_stages(Branch::Docs).contains(&StageId::VideoChapters));
        assert!(branch_stages(Branch::Video).contains(&StageId::VideoPrecontext));
    }
}
