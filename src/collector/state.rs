//! Run state machine.
//!
//! `Init -> Searching -> (Paging | Done | Shortfall)`, with `Searching`
//! re-entered after every page until a terminal state.

use crate::candidate::RawPayload;
use crate::collector::context::RunContext;
use crate::options::HardStops;
use crate::result::{HardStop, TerminationReason};

#[derive(Debug)]
pub enum RunState {
    /// Request not yet validated.
    Init,
    /// About to request the next page.
    Searching,
    /// A page was fetched; its candidates are evaluated in order until the
    /// requested count is reached.
    Paging { page: u32, payloads: Vec<RawPayload> },
    Done,
    Shortfall(HardStop),
}

impl RunState {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Shortfall(_))
    }

    /// Termination reason of a terminal state.
    #[must_use]
    pub const fn termination(&self) -> Option<TerminationReason> {
        match self {
            RunState::Done => Some(TerminationReason::Done),
            RunState::Shortfall(hard_stop) => Some(TerminationReason::Shortfall { hard_stop: *hard_stop }),
            _ => None,
        }
    }

    /// State to enter once a page has been processed.
    #[must_use]
    pub const fn after_page(collected: usize, requested: usize) -> Self {
        if collected >= requested {
            RunState::Done
        } else {
            RunState::Searching
        }
    }
}

/// Ceiling that forbids another page request, if any.
#[must_use]
pub const fn hard_stop_reached(ctx: &RunContext, stops: HardStops) -> Option<HardStop> {
    if ctx.pages() >= stops.max_pages {
        Some(HardStop::MaxPages)
    } else if ctx.attempts() >= stops.max_attempts {
        Some(HardStop::MaxAttempts)
    } else {
        None
    }
}
