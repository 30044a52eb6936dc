//! Sensitive action held behind a verified code

/// Result of starting a gated action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision<T> {
    /// No code needed; the action ran
    Completed(T),
    /// The action is held until a successful verification
    CodeRequired,
    /// The action already ran or is already waiting
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GateState {
    Ready,
    Pending,
    Done,
}

/// Runs an action at most once, after verification when 2FA is enabled
pub struct GatedAction<F> {
    requires_code: bool,
    action: Option<F>,
    state: GateState,
}

impl<F, T> GatedAction<F>
where
    F: FnOnce() -> T,
{
    /// `requires_code` reflects the user's 2FA preference
    pub fn new(requires_code: bool, action: F) -> Self {
        Self {
            requires_code,
            action: Some(action),
            state: GateState::Ready,
        }
    }

    /// Starts the action, or parks it until [`Self::on_verified`]
    pub fn begin(&mut self) -> GateDecision<T> {
        if self.state != GateState::Ready {
            return GateDecision::Idle;
        }
        if self.requires_code {
            self.state = GateState::Pending;
            return GateDecision::CodeRequired;
        }
        match self.run() {
            Some(output) => GateDecision::Completed(output),
            None => GateDecision::Idle,
        }
    }

    /// Reports a successful verification; runs the parked action once
    ///
    /// Later reports, or reports for an action that was never parked, are no-ops.
    pub fn on_verified(&mut self) -> Option<T> {
        if self.state != GateState::Pending {
            return None;
        }
        self.run()
    }

    /// Drops a parked action without running it
    pub fn cancel(&mut self) {
        self.action = None;
        self.state = GateState::Done;
    }

    pub fn is_pending(&self) -> bool {
        self.state == GateState::Pending
    }

    pub fn is_done(&self) -> bool {
        self.state == GateState::Done
    }

    fn run(&mut self) -> Option<T> {
        self.state = GateState::Done;
        self.action.take().map(|action| action())
    }
}
