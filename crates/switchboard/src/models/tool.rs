use serde::{Deserialize, Serialize};
use url::Url;

/// Credentials presented to a tool service. Only bearer tokens are
/// supported; the gateway forwards them verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "scheme")]
pub enum ToolAuth {
    Bearer { token: String },
}

/// A named tool service the gateway may call during generation.
///
/// Endpoints are immutable after startup: the set is built once from
/// configuration and shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolEndpoint {
    pub name: String,
    pub url: Url,
    pub auth: Option<ToolAuth>,
}

impl ToolEndpoint {
    pub fn new<S: Into<String>>(name: S, url: Url) -> Self {
        Self {
            name: name.into(),
            url,
            auth: None,
        }
    }

    pub fn with_bearer<S: Into<String>>(mut self, token: S) -> Self {
        self.auth = Some(ToolAuth::Bearer {
            token: token.into(),
        });
        self
    }
}
