// ==========================================
// Marmita Express - 静态菜单目录
// ==========================================
// 职责: 餐品 / 加料 / 饮料 目录与套餐定价参数
// 说明: 运行期不可变，OrderDraft 只保存 id
// ==========================================

use crate::config::PricingProfile;
use crate::domain::money::Money;
use serde::{Deserialize, Serialize};

/// "不要饮料" 选项 id，与付费饮料在数量上互斥
pub const NO_BEVERAGE_ID: &str = "none";

/// 每份套餐固定包含的餐品数量
pub const ITEMS_PER_COMBO: usize = 2;

/// 餐品
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_ref: String,
}

/// 加料（可挂在单个餐品上，也可作为整单通用加料）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: String,
    pub name: String,
    pub price: Money,
}

/// 饮料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beverage {
    pub id: String,
    pub name: String,
    pub price: Money,
}

impl Beverage {
    pub fn is_none_option(&self) -> bool {
        self.id == NO_BEVERAGE_ID
    }
}

// ==========================================
// Catalog - 菜单目录
// ==========================================

/// 菜单目录 + 定价参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<MenuItem>,
    pub add_ons: Vec<AddOn>,
    pub beverages: Vec<Beverage>,
    pub pricing: PricingProfile,
}

impl Catalog {
    /// 使用指定定价参数构造默认菜单
    pub fn with_pricing(pricing: PricingProfile) -> Self {
        Self {
            items: vec![
                menu_item(
                    "m1",
                    "Feijoada - M",
                    "Feijoada completa com carnes selecionadas, acompanhada de arroz, farofa e couve.",
                    "imagens/feijoada.webp",
                ),
                menu_item(
                    "m2",
                    "Bisteca - M",
                    "Bisteca suína grelhada, servida com arroz, feijão, abóbora e fritas deliciosas.",
                    "imagens/bisteca.webp",
                ),
                menu_item(
                    "m3",
                    "Filé de Frango - M",
                    "Filé de frango grelhado, acompanhado de arroz, feijão, batata frita e chuchu.",
                    "imagens/filedefrango.webp",
                ),
                menu_item(
                    "m4",
                    "Alcatra - M",
                    "Alcatra bovina assada, servida com arroz, feijão, chuchu e fritas.",
                    "imagens/alcatra.webp",
                ),
            ],
            add_ons: vec![
                add_on("e1", "Arroz", 250),
                add_on("e2", "Farofa", 150),
                add_on("e3", "Ovo frito", 300),
            ],
            beverages: vec![
                beverage(NO_BEVERAGE_ID, "Sem bebida", 0),
                beverage("b1", "Coca Cola 2l", 1090),
                beverage("b2", "Suco natural 500ml", 600),
            ],
            pricing,
        }
    }

    pub fn item(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|m| m.id == id)
    }

    pub fn add_on(&self, id: &str) -> Option<&AddOn> {
        self.add_ons.iter().find(|a| a.id == id)
    }

    pub fn beverage(&self, id: &str) -> Option<&Beverage> {
        self.beverages.iter().find(|b| b.id == id)
    }

    /// 付费饮料（排除 "none"）
    pub fn priced_beverages(&self) -> impl Iterator<Item = &Beverage> {
        self.beverages.iter().filter(|b| !b.is_none_option())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::with_pricing(PricingProfile::default())
    }
}

fn menu_item(id: &str, name: &str, description: &str, image_ref: &str) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        image_ref: image_ref.to_string(),
    }
}

fn add_on(id: &str, name: &str, price_minor: i64) -> AddOn {
    AddOn {
        id: id.to_string(),
        name: name.to_string(),
        price: Money::from_minor(price_minor),
    }
}

fn beverage(id: &str, name: &str, price_minor: i64) -> Beverage {
    Beverage {
        id: id.to_string(),
        name: name.to_string(),
        price: Money::from_minor(price_minor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_lookup() {
        let catalog = Catalog::default();
        assert_eq!(catalog.items.len(), 4);
        assert_eq!(catalog.add_on("e3").map(|a| a.price), Some(Money::from_minor(300)));
        assert!(catalog.beverage(NO_BEVERAGE_ID).unwrap().is_none_option());
        assert_eq!(catalog.priced_beverages().count(), 2);
        assert!(catalog.item("m9").is_none());
    }
}
