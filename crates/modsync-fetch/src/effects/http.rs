use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Asynchronous HTTP client abstraction.
///
/// This is the only network seam of the pipeline. Implementations handle their
/// own redirects, proxying and status mapping; a non-success status must be
/// reported as an error, never as a body.
///
/// Cancellation is done by dropping the returned future or stream.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - `testing::MockHttpClient` behind the `test-utils` feature
pub trait HttpClient: Send + Sync {
    /// Error type for HTTP operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open a streaming GET request and return the response body.
    fn stream(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use super::*;
    use crate::FetchError;

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: reqwest::Client,
    }

    impl ReqwestClient {
        /// Create a client with default configuration and no proxy.
        pub fn new() -> crate::Result<Self> { Self::with_proxy(None) }

        /// Create a client that routes every request through `proxy_host`,
        /// keeping the scheme of the requested URL: a request for
        /// `https://cdn/x` goes through `https://<proxy_host>`.
        pub fn with_proxy(proxy_host: Option<&str>) -> crate::Result<Self> {
            let mut builder = reqwest::Client::builder();

            if let Some(host) = proxy_host {
                let host = host.trim().trim_end_matches('/').to_string();
                reqwest::Url::parse(&format!("http://{host}")).map_err(|e| FetchError::Proxy {
                    host:    host.clone(),
                    message: e.to_string(),
                })?;

                builder = builder.proxy(reqwest::Proxy::custom(move |url| {
                    Some(format!("{}://{}", url.scheme(), host))
                }));
            }

            let client = builder
                .build()
                .map_err(|e| FetchError::Client(e.to_string()))?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn stream(
            &self,
            url: &str,
        ) -> Result<BoxStream<'static, Result<Bytes, Self::Error>>, Self::Error> {
            let response = self.client.get(url).send().await?.error_for_status()?;
            Ok(Box::pin(response.bytes_stream()))
        }
    }

}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
