#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::return_self_not_must_use
)]

pub mod config;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod plan;
pub mod planner;
pub mod service;
pub mod synthesizer;
pub mod tools;

pub use config::Config;
pub use error::{FaultKind, PlanError, StepFault};
pub use executor::{ExecutionResult, Executor, StepResult, StepStatus};
pub use plan::{OutputRef, OutputStyle, Plan, Step, ToolKind};
pub use service::{AgentService, QueryRequest, QueryResponse};
pub use tools::{Tool, ToolRegistry};
