//! Authenticated request gateway.
//!
//! Every call to the store goes through `Gateway::call`, which attaches the
//! credential. A 401 comes back as `CallOutcome::AuthRequired`, a one-shot
//! continuation the caller resumes with a fresh credential (or abandons).
//! There is no other retry policy.

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use synm_common::{mask_key, SynmError, AUTH_HEADER};
use tracing::{debug, info, warn};

use crate::prompt::{CredentialPrompt, PromptReason};
use crate::session::SessionContext;

/// Prefix of the bootstrap endpoints, which never carry the credential
pub const BOOTSTRAP_PREFIX: &str = "/api/auth/";

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Form(Vec<(String, String)>),
    Json(Value),
}

/// One outbound call, replayable as-is
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::GET,
            path: path.to_string(),
            body: RequestBody::Empty,
        }
    }

    pub fn post_form(path: &str, fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::POST,
            path: path.to_string(),
            body: RequestBody::Form(fields),
        }
    }

    pub fn post_json(path: &str, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.to_string(),
            body: RequestBody::Json(body),
        }
    }

    fn is_bootstrap(&self) -> bool {
        self.path.starts_with(BOOTSTRAP_PREFIX)
    }
}

/// Status plus raw body; decoding is up to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Decode the body regardless of status
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SynmError> {
        serde_json::from_str(&self.body).map_err(|e| SynmError::Decode(e.to_string()))
    }

    /// Decode a 2xx body, mapping any other status into the error taxonomy
    pub fn into_json<T: DeserializeOwned>(self, what: &str) -> Result<T, SynmError> {
        if !self.is_success() {
            return Err(SynmError::from_status(self.status, what));
        }
        self.json()
    }
}

/// A call the store rejected with 401, waiting for a fresh credential.
/// Consumed by `Gateway::resume`, so it can be retried at most once.
#[derive(Debug)]
pub struct RetryRequest {
    request: ApiRequest,
    response: ApiResponse,
}

impl RetryRequest {
    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    /// The original 401 response
    pub fn response(&self) -> &ApiResponse {
        &self.response
    }

    pub fn into_response(self) -> ApiResponse {
        self.response
    }
}

#[derive(Debug)]
pub enum CallOutcome {
    Complete(ApiResponse),
    AuthRequired(RetryRequest),
}

impl CallOutcome {
    /// The response as it stands, giving up on re-authentication
    pub fn into_response(self) -> ApiResponse {
        match self {
            CallOutcome::Complete(response) => response,
            CallOutcome::AuthRequired(retry) => retry.into_response(),
        }
    }
}

/// HTTP client bound to one session
pub struct Gateway {
    ctx: SessionContext,
    client: reqwest::Client,
}

impl Gateway {
    pub fn new(ctx: SessionContext) -> Result<Self, SynmError> {
        let client = reqwest::Client::builder()
            .timeout(ctx.timeout)
            .build()
            .map_err(|e| SynmError::Transport(e.to_string()))?;
        Ok(Self { ctx, client })
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Send once with the current credential
    pub async fn call(&self, request: ApiRequest) -> Result<CallOutcome, SynmError> {
        let credential = self.ctx.credential();
        let response = self.send(&request, credential.as_deref()).await?;

        if response.is_unauthorized() && !self.ctx.demo && !request.is_bootstrap() {
            info!("{} {} rejected, credential required", request.method, request.path);
            return Ok(CallOutcome::AuthRequired(RetryRequest { request, response }));
        }
        Ok(CallOutcome::Complete(response))
    }

    /// Finish a rejected call. A non-empty `fresh` credential is stored and
    /// the request replayed exactly once; otherwise the original 401 stands.
    pub async fn resume(
        &self,
        retry: RetryRequest,
        fresh: Option<String>,
    ) -> Result<ApiResponse, SynmError> {
        let Some(fresh) = fresh.map(|f| f.trim().to_string()).filter(|f| !f.is_empty()) else {
            debug!("No fresh credential for {}, keeping 401", retry.request.path);
            return Ok(retry.response);
        };

        if let Err(e) = self.ctx.credentials.write_local(&fresh) {
            warn!("Failed to store credential {}: {}", mask_key(&fresh), e);
        }
        info!("Retrying {} {} with new credential", retry.request.method, retry.request.path);
        self.send(&retry.request, Some(&fresh)).await
    }

    /// One call, and on 401 at most one prompt and one retry
    pub async fn call_with_prompt(
        &self,
        request: ApiRequest,
        prompt: &dyn CredentialPrompt,
    ) -> Result<ApiResponse, SynmError> {
        match self.call(request).await? {
            CallOutcome::Complete(response) => Ok(response),
            CallOutcome::AuthRequired(retry) => {
                let fresh = prompt.request_credential(PromptReason::Rejected);
                self.resume(retry, fresh).await
            }
        }
    }

    /// `call_with_prompt` plus status check and JSON decode
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        prompt: &dyn CredentialPrompt,
        what: &str,
    ) -> Result<T, SynmError> {
        self.call_with_prompt(request, prompt).await?.into_json(what)
    }

    async fn send(
        &self,
        request: &ApiRequest,
        credential: Option<&str>,
    ) -> Result<ApiResponse, SynmError> {
        let url = self.ctx.url(&request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        if let Some(key) = credential.filter(|_| !request.is_bootstrap()) {
            builder = builder.header(AUTH_HEADER, key);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => builder.form(fields),
            RequestBody::Json(value) => builder.json(value),
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| SynmError::Transport(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| SynmError::Transport(e.to_string()))?;

        debug!("{} {} -> {}", request.method, request.path, status);
        Ok(ApiResponse { status, body })
    }
}
