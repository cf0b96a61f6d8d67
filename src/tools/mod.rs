pub mod cache;
pub mod calculator;
pub mod factory;
mod http;
pub mod registry;
pub mod summarize;
pub mod time;
pub mod traits;
pub mod weather;
pub mod wiki;

pub use calculator::CalculatorTool;
pub use factory::{default_registry, default_tools};
pub use registry::{Invocation, InvocationFailure, ToolRegistry};
pub use summarize::SummarizeTool;
pub use time::WorldTimeTool;
pub use traits::{
    CachePolicy, FailureClass, RetryPolicy, Tool, ToolFailure, ToolFuture, ToolPolicy,
};
pub use weather::WeatherTool;
pub use wiki::WikipediaSummaryTool;
