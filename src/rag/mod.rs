//! Self-Reflective Retrieval-Augmented Pipeline
//!
//! The reflective answer flow: a user question is decomposed into
//! sub-queries; each sub-query is answered from the document store or by
//! direct generation, critiqued along five quality dimensions, escalated to
//! live web search when the weighted score falls below the threshold, and
//! finally consolidated into one answer.
//!
//! ## Components
//!
//! - [`planner::QueryPlanner`]: question decomposition
//! - [`decider::RetrievalDecider`]: retrieval-necessity decision
//! - [`judge::Judge`]: rubric scoring and weighted critique
//! - [`consolidate::Consolidator`]: fragment merging
//! - [`pipeline::QueryPipeline`]: the controller driving it all

pub mod consolidate;
pub mod decider;
pub mod judge;
pub mod pipeline;
pub mod planner;
pub mod prompts;
pub mod subquery;

pub use consolidate::Consolidator;
pub use decider::{RetrievalDecider, decode_affirmative};
pub use judge::{Critique, Judge, weighted_average};
pub use pipeline::QueryPipeline;
pub use planner::QueryPlanner;
pub use subquery::SubQuery;
