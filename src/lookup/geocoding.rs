// ==========================================
// Marmita Express - 反向地理编码 / IP 定位
// ==========================================
// 职责: 坐标 → 州代码 + 城市名，供自动选择州/城市
// 州解析顺序: state_code → ISO3166-2 后缀 → 州名精确 → 州名包含
// 城市字段顺序: city, town, village, municipality, county,
//               hamlet, locality, suburb, city_district
// ==========================================

use crate::domain::region::{LocationHint, RegionCatalog};
use crate::engine::lookup::LookupOutcome;
use crate::lookup::error::{LookupError, LookupResult};
use crate::lookup::traits::{IpLocator, ReverseGeocoder};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

const LOCALITY_FIELDS: [&str; 9] = [
    "city",
    "town",
    "village",
    "municipality",
    "county",
    "hamlet",
    "locality",
    "suburb",
    "city_district",
];

/// Nominatim 反向地理编码结果（只保留用到的字段）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoAddress {
    #[serde(default)]
    pub address: HashMap<String, String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// ipapi 定位结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpLocation {
    #[serde(default)]
    pub region_code: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

// ==========================================
// 解析
// ==========================================

/// 从地址对象解析州代码（必须存在于目录中）
pub fn resolve_region_code(regions: &RegionCatalog, address: &HashMap<String, String>) -> Option<String> {
    let known = |code: &str| -> Option<String> {
        let code = code.trim().to_uppercase();
        regions.region(&code).map(|_| code)
    };

    if let Some(code) = address.get("state_code").filter(|c| c.trim().len() == 2) {
        return known(code);
    }

    // Nominatim 实际返回 ISO3166-2-lvl4
    let iso = address
        .get("ISO3166-2-lvl4")
        .or_else(|| address.get("ISO3166-2"));
    if let Some(iso) = iso {
        let parts: Vec<&str> = iso.split('-').collect();
        if parts.len() == 2 {
            return known(parts[1]);
        }
    }

    let state_name = address
        .get("state")
        .or_else(|| address.get("region"))
        .map(|s| s.as_str())
        .unwrap_or("");
    regions
        .match_region_by_name(state_name)
        .map(|r| r.code.clone())
}

/// 从地址对象取城市名（未与目录匹配）
pub fn extract_locality(geo: &GeoAddress) -> Option<String> {
    LOCALITY_FIELDS
        .iter()
        .filter_map(|field| geo.address.get(*field))
        .find(|v| !v.trim().is_empty())
        .cloned()
        .or_else(|| {
            geo.display_name
                .as_deref()
                .and_then(|name| name.split(',').next())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// 反向地理编码结果 → 定位提示
pub fn resolve_location(regions: &RegionCatalog, geo: &GeoAddress) -> LocationHint {
    LocationHint {
        region_code: resolve_region_code(regions, &geo.address),
        locality: extract_locality(geo),
    }
}

/// IP 定位结果 → 定位提示（城市缺失时用州名兜底）
pub fn resolve_ip_location(regions: &RegionCatalog, ip: &IpLocation) -> LocationHint {
    let region_code = ip
        .region_code
        .as_deref()
        .map(|c| c.trim().to_uppercase())
        .filter(|c| regions.region(c).is_some());
    LocationHint {
        region_code,
        locality: ip.city.clone().or_else(|| ip.region.clone()),
    }
}

// ==========================================
// 客户端
// ==========================================

/// Nominatim 客户端
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: format!("marmita-express/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    #[instrument(skip(self))]
    async fn reverse(&self, latitude: f64, longitude: f64) -> LookupResult<Option<GeoAddress>> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(LookupError::InvalidInput(format!("{},{}", latitude, longitude)));
        }

        let response = self
            .http
            .get(format!("{}/reverse", self.base_url))
            .header("User-Agent", &self.user_agent)
            .query(&[
                ("format", "json".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("addressdetails", "1".to_string()),
                ("accept-language", "pt-BR".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let geo: GeoAddress = response.json().await?;
        if geo.address.is_empty() {
            return Ok(None);
        }
        Ok(Some(geo))
    }
}

/// ipapi 客户端
pub struct IpApiClient {
    http: reqwest::Client,
    url: String,
}

impl IpApiClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl IpLocator for IpApiClient {
    #[instrument(skip(self))]
    async fn locate(&self) -> LookupResult<IpLocation> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }
}

// ==========================================
// LocationService - 定位服务
// ==========================================

/// 反向地理编码 + IP 兜底
#[derive(Clone)]
pub struct LocationService {
    geocoder: Arc<dyn ReverseGeocoder>,
    ip_locator: Option<Arc<dyn IpLocator>>,
}

impl LocationService {
    pub fn new(geocoder: Arc<dyn ReverseGeocoder>, ip_locator: Option<Arc<dyn IpLocator>>) -> Self {
        Self {
            geocoder,
            ip_locator,
        }
    }

    /// 定位；失败只记录日志，由调用方降级为手工选择
    #[instrument(skip(self, regions))]
    pub async fn locate(
        &self,
        regions: &RegionCatalog,
        latitude: f64,
        longitude: f64,
    ) -> LookupOutcome<LocationHint> {
        match self.geocoder.reverse(latitude, longitude).await {
            Ok(Some(geo)) => return LookupOutcome::Found(resolve_location(regions, &geo)),
            Ok(None) => return LookupOutcome::NotFound,
            Err(e) => tracing::warn!("反向地理编码失败，尝试 IP 定位: {}", e),
        }

        let Some(ip_locator) = &self.ip_locator else {
            return LookupOutcome::Failed("reverse geocoding failed".to_string());
        };
        match ip_locator.locate().await {
            Ok(ip) => LookupOutcome::Found(resolve_ip_location(regions, &ip)),
            Err(e) => {
                tracing::warn!("IP 定位也失败: {}", e);
                LookupOutcome::Failed(e.to_string())
            }
        }
    }
}
