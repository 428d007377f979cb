//! Static catalog of release definitions
//!
//! Maintained by hand as releases enter and leave the tracking window. Only
//! definitions with `track` set are processed by the release pipeline;
//! untracked entries are kept for history and skipped entirely.

/// One release definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseInput {
    pub version: &'static str,
    pub state: &'static str,
    pub branch: &'static str,
    pub track: bool,
}

impl ReleaseInput {
    pub const fn new(version: &'static str, state: &'static str, branch: &'static str, track: bool) -> Self {
        Self {
            version,
            state,
            branch,
            track,
        }
    }

    /// Release definitions marked for metrics collection
    pub fn tracked() -> impl Iterator<Item = &'static ReleaseInput> {
        Self::all().iter().filter(|input| input.track)
    }

    /// All known release definitions, tracked or not
    pub fn all() -> &'static [ReleaseInput] {
        const ALL: [ReleaseInput; 5] = [
            ReleaseInput::new("2.16.0", "closed", "2.16", false),
            ReleaseInput::new("2.17.0", "closed", "2.17", false),
            ReleaseInput::new("2.18.0", "closed", "2.18", true),
            ReleaseInput::new("2.19.0", "open", "2.19", true),
            ReleaseInput::new("3.0.0", "open", "3.0", true),
        ];
        &ALL
    }
}
