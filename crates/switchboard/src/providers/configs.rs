/// Connection settings for an OpenAI-compatible gateway.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
}

impl UpstreamConfig {
    pub fn new<H: Into<String>, K: Into<String>, M: Into<String>>(
        host: H,
        api_key: K,
        model: M,
    ) -> Self {
        Self {
            host: host.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}
