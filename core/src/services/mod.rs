//! Business services containing domain logic and use cases.

pub mod clock;
pub mod gate;
pub mod verification;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use gate::{GateDecision, GatedAction, ResendCooldown};
pub use verification::{
    bounded_seconds, render_code_email, CodeStore, EmailMessage, EmailSender, IssueRequest, IssuedCode,
    RateLimiter, SweepReport, Sweeper, SweeperHandle, VerificationService,
    VerificationServiceConfig, VerifiedCode,
};
