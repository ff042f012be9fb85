use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::error::ClientError;
use crate::http::{DynHttpTransport, HttpResponse, post_json_with_headers};
use crate::schema::{ChatCompletionRequest, ChatCompletionResponse, Message};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(200);

/// Chat Completions 调用入口 持有连接配置
///
/// 配置在构造后不可变 多个任务可安全共享同一实例并发调用
pub struct LLMClient {
    transport: DynHttpTransport,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl LLMClient {
    /// 创建带默认 base_url 与超时的客户端
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// 自定义 base_url
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 自定义单次调用超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Requests a completion for the given model and conversation.
    ///
    /// One outbound POST per invocation; the call is stateless with respect to
    /// prior calls, performs no retries, and propagates both error kinds to
    /// the caller unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] when the call cannot complete, the
    /// status is outside 2xx, or the body is not decodable JSON; returns
    /// [`ClientError::Validation`] when the decoded body does not conform to
    /// the response schema.
    pub async fn get_completion(
        &self,
        model: impl Into<String>,
        messages: Vec<Message>,
    ) -> Result<ChatCompletionResponse, ClientError> {
        let request = ChatCompletionRequest::new(model, messages);
        self.execute(&request).await
    }

    /// Requests a completion from an untyped JSON body of the shape
    /// `{"model", "messages"}`.
    ///
    /// Runs request-side structural validation before any network I/O; a body
    /// that fails validation never leaves the process.
    ///
    /// # Errors
    ///
    /// Same as [`LLMClient::get_completion`], plus [`ClientError::Validation`]
    /// listing every nonconforming request field.
    pub async fn get_completion_value(
        &self,
        body: &Value,
    ) -> Result<ChatCompletionResponse, ClientError> {
        let request = ChatCompletionRequest::from_value(body)?;
        self.execute(&request).await
    }

    async fn execute(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ClientError> {
        let response = self.send_request(request).await?;
        let text = self.ensure_success(response)?;
        let decoded: Value = serde_json::from_str(&text).map_err(|err| {
            ClientError::transport(format!("malformed response body: {err}"))
        })?;
        ChatCompletionResponse::from_value(&decoded)
    }

    async fn send_request(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<HttpResponse, ClientError> {
        post_json_with_headers(
            self.transport.as_ref(),
            self.endpoint(),
            self.build_headers(),
            Some(self.timeout),
            request,
        )
        .await
    }

    /// 非 2xx 时不解析 body 原文放入错误信息
    fn ensure_success(&self, response: HttpResponse) -> Result<String, ClientError> {
        let status = response.status;
        let text = response.into_string()?;
        if (200..300).contains(&status) {
            Ok(text)
        } else {
            Err(ClientError::status(status, text))
        }
    }

    pub(crate) fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/v1") {
            format!("{base}/chat/completions")
        } else {
            format!("{base}/v1/chat/completions")
        }
    }

    fn build_headers(&self) -> HashMap<String, String> {
        HashMap::from([
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.api_key),
            ),
            ("Content-Type".to_string(), "application/json".to_string()),
        ])
    }
}
