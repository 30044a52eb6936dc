//! Domain entities representing core business objects.

pub mod rate_limit_window;
pub mod verification_record;

pub use rate_limit_window::{retry_after_minutes, Admission, RateLimitWindow};
pub use verification_record::{
    VerificationRecord, CODE_LENGTH, CODE_MAX, CODE_MIN, DEFAULT_EXPIRATION_MINUTES,
    DEFAULT_GRACE_SECONDS,
};
