use axum::{body::Body, extract::ConnectInfo};
use governor::{clock::QuantaInstant, middleware::NoOpMiddleware};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder, key_extractor::KeyExtractor};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SmartIpKeyExtractor;

impl KeyExtractor for SmartIpKeyExtractor {
    type Key = IpAddr;

    fn extract<B>(
        &self,
        req: &axum::http::Request<B>,
    ) -> Result<Self::Key, tower_governor::errors::GovernorError> {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .or_else(|| {
                // Fall back to loopback when connection info is missing
                // (e.g. under test harnesses).
                Some(IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)))
            })
            .ok_or(tower_governor::errors::GovernorError::UnableToExtractKey)
    }
}

/// Per-IP rate limiting for the auth endpoints.
pub fn rate_limit_layer(
    requests_per_minute: u64,
) -> anyhow::Result<GovernorLayer<SmartIpKeyExtractor, NoOpMiddleware<QuantaInstant>, Body>> {
    let quota_duration_ms = 60_000 / requests_per_minute.max(1);

    let config = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(quota_duration_ms)
            .burst_size(requests_per_minute as u32)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Failed to finish governor config"))?,
    );

    Ok(GovernorLayer::new(config))
}
