use crate::domain::money::Money;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 套餐定价参数（可持久化对象）
///
/// 存储位置：配置文件键 `pricing_profile`（JSON），缺省时使用内置促销价
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingProfile {
    /// 单份套餐价格（线性计价基准）
    pub unit_price: Money,

    /// 份数断点 → 一口价（覆盖 unit_price × 份数）
    #[serde(default)]
    pub tiers: BTreeMap<u32, Money>,

    /// 甜品加购价（整单一次）
    #[serde(default = "default_dessert_price")]
    pub dessert_price: Money,
}

fn default_dessert_price() -> Money {
    Money::from_minor(290)
}

impl Default for PricingProfile {
    fn default() -> Self {
        let mut tiers = BTreeMap::new();
        tiers.insert(3, Money::from_minor(6490));
        tiers.insert(4, Money::from_minor(8490));

        Self {
            unit_price: Money::from_minor(2490),
            tiers,
            dessert_price: default_dessert_price(),
        }
    }
}

impl PricingProfile {
    /// 给定份数的下一个更大断点（用于交叉促销横幅）
    pub fn next_tier_above(&self, quantity: u32) -> Option<(u32, Money)> {
        self.tiers
            .range(quantity + 1..)
            .next()
            .map(|(q, price)| (*q, *price))
    }

    /// 给定份数是否命中断点
    pub fn tier_for(&self, quantity: u32) -> Option<Money> {
        self.tiers.get(&quantity).copied()
    }
}
