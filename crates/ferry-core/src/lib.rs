//! Core types and orchestration for ferry.
//!
//! This crate defines the configuration record ([`EngineConfig`]), trigger
//! metadata ([`PipelineTrigger`]), the environment decision function
//! ([`select_environment`]), and the pipeline state machine ([`Pipeline`])
//! that sequences one run from `Pending` to a terminal state. It performs no
//! process execution itself; the registry and cloud collaborators are reached
//! through the traits in [`pipeline`].

pub mod broker;
pub mod config;
pub mod error;
pub mod image;
pub mod pipeline;
pub mod target;
pub mod trigger;

pub use broker::{CredentialSet, Provider, Session};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use image::ImageReference;
pub use pipeline::{
    CloudPlatform, ContainerRegistry, Pipeline, PipelineReport, PipelineRun, PipelineState, Stage,
    TestRunner,
};
pub use target::{Environment, EnvironmentTarget, select_environment};
pub use trigger::{PipelineTrigger, ReleaseAction, TriggerKind};
