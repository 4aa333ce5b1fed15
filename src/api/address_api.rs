// ==========================================
// Marmita Express - 地址查询 API
// ==========================================
// 职责: 邮编查询 / 定位 → 回填草稿
// 流程: 领取票据 → 异步查询 → 交回票据回填（过期结果丢弃）
// 红线: 查询失败只降级为手工输入，不返回错误
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::contact::PostalAddress;
use crate::domain::region::{LocationHint, RegionCatalog};
use crate::engine::configurator::{LookupApplied, OrderConfigurator};
use crate::engine::lookup::LookupOutcome;
use crate::lookup::geocoding::LocationService;
use crate::lookup::traits::PostalCodeLookup;
use std::sync::Arc;
use tracing::instrument;

/// 地址查询 API
#[derive(Clone)]
pub struct AddressApi {
    postal: Arc<dyn PostalCodeLookup>,
    location: LocationService,
    regions: Arc<RegionCatalog>,
}

impl AddressApi {
    pub fn new(
        postal: Arc<dyn PostalCodeLookup>,
        location: LocationService,
        regions: Arc<RegionCatalog>,
    ) -> Self {
        Self {
            postal,
            location,
            regions,
        }
    }

    /// 查询邮编（不涉及草稿）
    #[instrument(skip(self))]
    pub async fn lookup_postal_code(&self, postal_code: &str) -> LookupOutcome<PostalAddress> {
        match self.postal.lookup(postal_code).await {
            Ok(Some(address)) => LookupOutcome::Found(address),
            Ok(None) => LookupOutcome::NotFound,
            Err(e) => {
                tracing::warn!("邮编查询失败: {}", e);
                LookupOutcome::Failed(e.to_string())
            }
        }
    }

    /// 坐标定位（不涉及草稿）
    pub async fn locate(&self, latitude: f64, longitude: f64) -> LookupOutcome<LocationHint> {
        self.location.locate(&self.regions, latitude, longitude).await
    }

    /// 邮编失焦: 格式校验 + 查询 + 回填
    ///
    /// 邮编为空或格式错误时不发起查询，只返回校验后的状态
    pub async fn refresh_postal_code(
        &self,
        configurator: &mut OrderConfigurator,
    ) -> ApiResult<LookupApplied> {
        let Some(ticket) = configurator.begin_postal_lookup()? else {
            return Ok(LookupApplied::Applied(configurator.snapshot()));
        };
        let outcome = self.lookup_postal_code(&ticket.input).await;
        Ok(configurator.apply_postal_lookup(&ticket, outcome)?)
    }

    /// 定位并自动选择州/城市
    pub async fn autofill_location(
        &self,
        configurator: &mut OrderConfigurator,
        latitude: f64,
        longitude: f64,
    ) -> ApiResult<LookupApplied> {
        let ticket = configurator.begin_location_lookup(format!("{},{}", latitude, longitude));
        let outcome = self.locate(latitude, longitude).await;
        Ok(configurator.apply_location_hint(&ticket, outcome)?)
    }
}
