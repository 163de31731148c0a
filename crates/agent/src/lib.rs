//! Turn orchestration - classification, routing, and response assembly.
//!
//! This crate is the conversational brain on top of `consulty-core`:
//! - **Classification** (`llm`, `classifier`) - the oracle-backed classifier
//!   with its silent fallback to the deterministic rule engine
//! - **Session context** (`context`) - the injected per-session store that
//!   accumulates categories, entities, and intent history
//! - **Routing** (`runtime`) - dispatch by intent to provider search, the
//!   booking dialog, the problem-solving advisor, or simple responders
//! - **Regression harness** (`validation`) - the fixed labeled suite that
//!   grades the whole pipeline end-to-end
//!
//! # Contract
//!
//! `AgentRuntime::handle_turn` always returns a well-formed response. Oracle
//! outages, catalog failures, and malformed prior-turn metadata all degrade
//! to apologetic-but-useful replies; none of them surface as errors.

pub mod classifier;
pub mod context;
pub mod llm;
pub mod runtime;
pub mod validation;

pub use classifier::ClassifierStack;
pub use context::{InMemorySessionStore, SessionStore};
pub use llm::{HttpOracleClient, OracleClassifier, OracleClient, OracleError};
pub use runtime::AgentRuntime;
pub use validation::{AccuracyValidator, CaseResult, ValidationCase, ValidationReport};
