//! OpenAI 兼容 Chat Completions 端点的类型化客户端

pub mod client;
pub mod error;
pub mod http;
pub mod schema;

pub use client::LLMClient;
pub use error::{ClientError, Violation};
pub use schema::{ChatCompletionRequest, ChatCompletionResponse, Message, ResponseChoice};
