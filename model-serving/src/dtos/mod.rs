pub mod completion;
pub mod model;

pub use completion::{CompletionRequest, CompletionResponse, Message, Reply};
pub use model::{DeployRequest, DeployResponse, ModelResponse, StatusResponse};
