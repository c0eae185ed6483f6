//! Opportunity pipeline
//!
//! Detects markets where YES + NO trades below one, keeps at most one active
//! opportunity per market, and revalidates/scores opportunities before
//! execution.

mod detector;
mod types;
mod validator;

pub use detector::{EdgeStats, OpportunityDetector};
pub use types::{ArbProfit, Opportunity, OpportunityEvent};
pub use validator::{
    OpportunityValidator, RejectReason, ScoreWeights, ScoredOpportunity, ValidationResult,
};
