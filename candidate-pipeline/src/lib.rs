//! A generic, stage-based framework for assembling candidate-ranking
//! pipelines: query hydration, multi-source retrieval, hydration, filtering,
//! scoring, selection, and detached side effects, each stage pluggable and
//! independently fault-isolated.

pub mod pipeline;
pub mod stages;
pub mod types;

pub use pipeline::CandidatePipeline;
pub use stages::{Filter, Hydrator, QueryHydrator, Scorer, Selector, SideEffect, Source, Stage};
pub use types::{
    BloomFilterEntry, Candidate, FilterResult, PhoenixScores, PipelineResult, Query, ServedType,
    UserAction, UserActionSequence, UserActionSequenceMeta, UserFeatures,
};
