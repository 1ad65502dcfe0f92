//! Access-token seam for the Directory client.
//!
//! Token minting (service-account key exchange, delegation) is an operator
//! concern; the client only needs something that yields a bearer token.

use async_trait::async_trait;

use crate::error::GoogleResult;

/// Yields a bearer token for Directory API requests.
///
/// Implementations may cache or refresh internally; the client asks before
/// every request.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn access_token(&self) -> GoogleResult<String>;
}

/// A fixed, pre-acquired token.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> GoogleResult<String> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_returns_its_token() {
        let provider = StaticTokenProvider::new("token-123");
        assert_eq!(provider.access_token().await.unwrap(), "token-123");
    }
}
