// ==========================================
// Marmita Express - 地址查询 Trait
// ==========================================

use crate::domain::contact::PostalAddress;
use crate::lookup::error::LookupResult;
use crate::lookup::geocoding::{GeoAddress, IpLocation};
use async_trait::async_trait;

/// 邮编查询
#[async_trait]
pub trait PostalCodeLookup: Send + Sync {
    /// 按 8 位邮编查询；不存在时返回 None
    async fn lookup(&self, postal_code: &str) -> LookupResult<Option<PostalAddress>>;
}

/// 反向地理编码
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, latitude: f64, longitude: f64) -> LookupResult<Option<GeoAddress>>;
}

/// IP 定位（反向地理编码失败时兜底）
#[async_trait]
pub trait IpLocator: Send + Sync {
    async fn locate(&self) -> LookupResult<IpLocation>;
}
