pub mod completion;
pub mod deployment;
pub mod engines;
pub mod metrics;

pub use completion::CompletionInvoker;
pub use deployment::DeploymentController;
