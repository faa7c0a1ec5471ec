use std::fmt;
use studio_core::Mode;

use crate::state::RequestState;

/// One of the four fixed stage sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Docs,
    Video,
    Product,
    Research,
}

impl Branch {
    pub const ALL: [Branch; 4] = [Branch::Docs, Branch::Video, Branch::Product, Branch::Research];

    pub fn name(&self) -> &'static str {
        match self {
            Branch::Docs => "docs",
            Branch::Video => "video",
            Branch::Product => "product",
            Branch::Research => "research",
        }
    }

    /// The mode a run on this branch carries.
    pub fn mode(&self) -> Mode {
        match self {
            Branch::Docs => Mode::Docs,
            Branch::Video => Mode::Video,
            Branch::Product => Mode::Product,
            Branch::Research => Mode::Research,
        }
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the branch for a request. Pure; unrecognized modes take docs.
pub fn route(state: &RequestState) -> Branch {
    branch_for(&state.mode)
}

pub(crate) fn branch_for(mode: &Mode) -> Branch {
    match mode {
        Mode::Video => Branch::Video,
        Mode::Product => Branch::Product,
        Mode::Research => Branch::Research,
        Mode::Docs | Mode::Unrecognized(_) => Branch::Docs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(mode: &str) -> RequestState {
        RequestState::new("q", "u", Mode::from(mode), "")
    }

    #[test]
    fn test_known_modes_route_to_their_branch() {
        assert_eq!(route(&state("docs")), Branch::Docs);
        assert_eq!(route(&state("video")), Branch::Video);
        assert_eq!(route(&state("product")), Branch::Product);
        assert_eq!(route(&state("research")), Branch::Research);
    }

    #[test]
    fn test_unknown_mode_routes_to_docs() {
        assert_eq!(route(&state("banana")), Branch::Docs);
        assert_eq!(route(&state("")), Branch::Docs);
    }

    #[test]
    fn test_route_is_pure() {
        let s = state("video");
        let before = s.clone();
        let _ = route(&s);
        assert_eq!(s, before);
    }
}
