// ==========================================
// Marmita Express - 领域层
// ==========================================
// 职责: 菜单目录、订单草稿、金额、地址等实体与值对象
// 红线: 领域层不做 IO
// ==========================================

pub mod catalog;
pub mod contact;
pub mod draft;
pub mod money;
pub mod region;
pub mod types;

pub use catalog::{AddOn, Beverage, Catalog, MenuItem, ITEMS_PER_COMBO, NO_BEVERAGE_ID};
pub use contact::{digits_only, mask_phone, mask_postal_code, ContactInfo, DeliveryAddress, PostalAddress};
pub use draft::OrderDraft;
pub use money::{CurrencyFormat, Money};
pub use region::{normalize_place_name, LocationHint, Region, RegionCatalog};
pub use types::{LookupKind, PaymentProviderKind, PostalCodeIssue, ProviderEnvironment, Stage};
