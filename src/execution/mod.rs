//! Execution module
//!
//! Builds, signs and submits the paired YES/NO orders for an opportunity

mod builder;
mod coordinator;
mod signer;
mod submitter;
mod types;

pub use builder::{OrderBuilder, OPEN_TAKER};
pub use coordinator::ExecutionCoordinator;
pub use signer::{DryRunSigner, OrderSigner, RemoteSigner, DRY_RUN_ADDRESS, DRY_RUN_SIGNATURE};
pub use submitter::{ClobSubmitter, OrderSubmitter, PaperSubmitter};
pub use types::{
    ExecutionError, ExecutionRecord, ExecutionResult, ExecutionStage, ExecutionStats, LegFill,
    Order, OrderAck, OrderSide, Signature, SignedOrder,
};
