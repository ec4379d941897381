use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Asset metadata returned by the catalog: decimal precision for an asset
/// code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetInfo {
    pub precision: u32,
}

/// The asset catalog, treated as an opaque oracle. Injected explicitly
/// rather than accessed as process-wide ambient state.
#[async_trait]
pub trait AssetService: Send + Sync {
    async fn precision(&self, asset: &str) -> Option<u32>;
}

/// Read-only, process-wide-cacheable reference implementation seeded from
/// configuration.
pub struct InMemoryAssetService {
    assets: RwLock<HashMap<String, AssetInfo>>,
}

impl InMemoryAssetService {
    pub fn new(assets: HashMap<String, u32>) -> Self {
        let assets = assets
            .into_iter()
            .map(|(code, precision)| (code, AssetInfo { precision }))
            .collect();
        Self {
            assets: RwLock::new(assets),
        }
    }

    /// Refreshes the catalog in place, for periodic reload from upstream.
    pub fn refresh(&self, assets: HashMap<String, u32>) {
        let assets = assets
            .into_iter()
            .map(|(code, precision)| (code, AssetInfo { precision }))
            .collect();
        *self.assets.write().unwrap() = assets;
    }
}

#[async_trait]
impl AssetService for InMemoryAssetService {
    async fn precision(&self, asset: &str) -> Option<u32> {
        self.assets.read().unwrap().get(asset).map(|a| a.precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_known_asset() {
        let mut seed = HashMap::new();
        seed.insert("iso4217:USD".to_string(), 2);
        let svc = InMemoryAssetService::new(seed);
        assert_eq!(svc.precision("iso4217:USD").await, Some(2));
        assert_eq!(svc.precision("iso4217:EUR").await, None);
    }

    #[tokio::test]
    async fn refresh_replaces_catalog() {
        let svc = InMemoryAssetService::new(HashMap::new());
        assert_eq!(svc.precision("iso4217:USD").await, None);
        let mut seed = HashMap::new();
        seed.insert("iso4217:USD".to_string(), 2);
        svc.refresh(seed);
        assert_eq!(svc.precision("iso4217:USD").await, Some(2));
    }
}
