//! CoinGecko quote source
//!
//! Batched lookups against the public `simple/price` endpoint:
//! `GET {base_url}?ids=bitcoin,ethereum&vs_currencies=usd` returns
//! `{"bitcoin":{"usd":118000.0},"ethereum":{"usd":4650.2}}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::adapters::errors::{QuoteError, QuoteResult};
use crate::adapters::traits::QuoteSource;
use crate::adapters::types::ObservationBatch;
use crate::config::QuoteApiConfig;

/// Raw response: coin id -> currency -> price
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

#[derive(Clone, Debug)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
    vs_currency: String,
}

impl CoinGeckoClient {
    pub fn new(config: &QuoteApiConfig, timeout: Duration) -> QuoteResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            vs_currency: config.vs_currency.to_lowercase(),
        })
    }

    fn extract(&self, ids: &[String], body: SimplePriceResponse) -> QuoteResult<ObservationBatch> {
        let mut prices = HashMap::with_capacity(ids.len());
        let mut missing = Vec::new();

        for id in ids {
            match body.get(id).and_then(|quotes| quotes.get(&self.vs_currency)) {
                Some(price) if price.is_finite() => {
                    prices.insert(id.clone(), *price);
                }
                Some(price) => {
                    return Err(QuoteError::InvalidPrice {
                        id: id.clone(),
                        price: *price,
                    });
                }
                None => missing.push(id.clone()),
            }
        }

        if !missing.is_empty() {
            return Err(QuoteError::MissingQuotes(missing));
        }

        Ok(ObservationBatch::new(prices))
    }
}

#[async_trait]
impl QuoteSource for CoinGeckoClient {
    #[instrument(skip(self), fields(count = ids.len()), level = "debug")]
    async fn fetch(&self, ids: &[String]) -> QuoteResult<ObservationBatch> {
        let joined = ids.join(",");
        let response = self
            .http
            .get(&self.base_url)
            .query(&[("ids", joined.as_str()), ("vs_currencies", self.vs_currency.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(QuoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let body: SimplePriceResponse = serde_json::from_str(&text)
            .map_err(|e| QuoteError::InvalidResponse(format!("{} - body: {}", e, text)))?;

        let batch = self.extract(ids, body)?;
        debug!(quotes = batch.len(), "CoinGecko prices fetched");
        Ok(batch)
    }

    fn source_name(&self) -> &'static str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(url: &str) -> CoinGeckoClient {
        let config = QuoteApiConfig {
            base_url: format!("{}/simple/price", url),
            vs_currency: "usd".to_string(),
        };
        CoinGeckoClient::new(&config, Duration::from_secs(2)).unwrap()
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fetch_batches_all_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/simple/price")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ids".into(), "bitcoin,ethereum".into()),
                Matcher::UrlEncoded("vs_currencies".into(), "usd".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"bitcoin":{"usd":118000.5},"ethereum":{"usd":4700}}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let batch = client.fetch(&ids(&["bitcoin", "ethereum"])).await.unwrap();

        assert_eq!(batch.price("bitcoin"), Some(118000.5));
        assert_eq!(batch.price("ethereum"), Some(4700.0));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_partial_response_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"bitcoin":{"usd":118000.5}}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let result = client.fetch(&ids(&["bitcoin", "solana"])).await;

        match result {
            Err(QuoteError::MissingQuotes(missing)) => assert_eq!(missing, vec!["solana".to_string()]),
            other => panic!("Expected MissingQuotes, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_currency_is_missing() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"bitcoin":{"eur":100000.0}}"#)
            .create_async()
            .await;

        let client = client_for(&server.url());
        let result = client.fetch(&ids(&["bitcoin"])).await;
        assert!(matches!(result, Err(QuoteError::MissingQuotes(_))));
    }

    #[tokio::test]
    async fn test_rate_limited_is_status_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("Too Many Requests")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let result = client.fetch(&ids(&["bitcoin"])).await;

        match result {
            Err(QuoteError::Status { status, body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("Too Many Requests"));
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/simple/price")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let result = client.fetch(&ids(&["bitcoin"])).await;
        assert!(matches!(result, Err(QuoteError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_connection_refused_is_http_error() {
        // Nothing listens on port 9 locally
        let client = client_for("http://127.0.0.1:9");
        let result = client.fetch(&ids(&["bitcoin"])).await;
        assert!(matches!(result, Err(QuoteError::Http(_))));
    }
}
