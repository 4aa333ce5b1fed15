// ==========================================
// Marmita Express - 地址查询层
// ==========================================
// 职责: 邮编查询、反向地理编码、IP 定位的外部 HTTP 客户端
// 说明: 查询失败只记录日志，不阻塞手工输入
// ==========================================

pub mod error;
pub mod geocoding;
pub mod postal_code;
pub mod traits;

pub use error::{LookupError, LookupResult};
pub use geocoding::{
    extract_locality, resolve_ip_location, resolve_location, resolve_region_code, GeoAddress,
    IpApiClient, IpLocation, LocationService, NominatimClient,
};
pub use postal_code::ViaCepClient;
pub use traits::{IpLocator, PostalCodeLookup, ReverseGeocoder};
