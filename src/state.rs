use crate::line::LineKind;
use std::fmt::{self, Display, Formatter};

/// The states of an upload session.
///
/// `Terminated` is the only success state and `Failed` the only error state;
/// neither has an outgoing edge other than into `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    AwaitingBoundary,
    AfterBoundary,
    AwaitingHeaderEnd,
    AfterHeaderEnd,
    InBody,
    Terminated,
    Failed,
}

impl State {
    #[cfg(test)]
    pub(crate) const ALL: [State; 7] = [
        State::AwaitingBoundary,
        State::AfterBoundary,
        State::AwaitingHeaderEnd,
        State::AfterHeaderEnd,
        State::InBody,
        State::Terminated,
        State::Failed,
    ];

    /// The transition table. Any pair not listed leads to `Failed`.
    pub fn next(self, line: LineKind) -> State {
        match (self, line) {
            (State::AwaitingBoundary, LineKind::Boundary) => State::AfterBoundary,

            (State::AfterBoundary, LineKind::ContentDisposition) => State::AwaitingHeaderEnd,

            (State::AwaitingHeaderEnd, LineKind::NewLine) => State::AfterHeaderEnd,

            (State::AfterHeaderEnd, LineKind::Boundary) => State::AfterBoundary,
            (State::AfterHeaderEnd, LineKind::BoundaryEnd) => State::Terminated,
            (State::AfterHeaderEnd, LineKind::Data) => State::InBody,

            (State::InBody, LineKind::Boundary) => State::AfterBoundary,
            (State::InBody, LineKind::BoundaryEnd) => State::Terminated,
            (State::InBody, LineKind::ContentDisposition)
            | (State::InBody, LineKind::NewLine)
            | (State::InBody, LineKind::Data) => State::InBody,

            _ => State::Failed,
        }
    }

    /// Whether the state is `Terminated` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Terminated | State::Failed)
    }

    /// Whether a part is open, i.e. its header block has ended and its
    /// delimiter hasn't been reached yet.
    pub(crate) fn is_part_open(self) -> bool {
        matches!(self, State::AfterHeaderEnd | State::InBody)
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(
            match self {
                State::AwaitingBoundary => "AwaitingBoundary",
                State::AfterBoundary => "AfterBoundary",
                State::AwaitingHeaderEnd => "AwaitingHeaderEnd",
                State::AfterHeaderEnd => "AfterHeaderEnd",
                State::InBody => "InBody",
                State::Terminated => "Terminated",
                State::Failed => "Failed",
            },
            f,
        )
    }
}
