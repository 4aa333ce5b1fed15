// ==========================================
// Marmita Express - 联系人与配送地址
// ==========================================
// 职责: 下单人信息、配送地址、输入掩码
// ==========================================

use crate::domain::types::PostalCodeIssue;
use serde::{Deserialize, Serialize};

/// 下单人信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    /// 电话（保存用户输入，校验时只取数字）
    pub phone: String,
    /// 是否在票据上填写 CPF
    pub tax_id_requested: bool,
    pub tax_id: String,
}

/// 配送地址
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    /// 州代码（UF 两位字母）
    pub region: String,
    /// 城市
    pub locality: String,
    pub postal_code: String,
    pub street: String,
    pub number: String,
    pub neighborhood: String,
    /// 邮编校验/查询产生的问题标记
    pub postal_code_issue: Option<PostalCodeIssue>,
}

/// 邮编查询返回的地址（用于自动回填）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub street: String,
    pub neighborhood: String,
    pub locality: String,
    /// 州代码
    pub region: String,
}

/// 仅保留数字
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 电话掩码：(11) 91234-5678 / (11) 1234-5678
///
/// 最多保留 11 位数字，位数不足时尽量格式化
pub fn mask_phone(raw: &str) -> String {
    let digits: String = digits_only(raw).chars().take(11).collect();
    if digits.len() <= 2 {
        return digits;
    }
    let (ddd, rest) = digits.split_at(2);
    let split = if digits.len() <= 10 { 4 } else { 5 };
    if rest.len() <= split {
        format!("({}) {}", ddd, rest)
    } else {
        let (head, tail) = rest.split_at(split);
        format!("({}) {}-{}", ddd, head, tail)
    }
}

/// 邮编掩码：14000-000
pub fn mask_postal_code(raw: &str) -> String {
    let digits: String = digits_only(raw).chars().take(8).collect();
    if digits.len() > 5 {
        let (head, tail) = digits.split_at(5);
        format!("{}-{}", head, tail)
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("11912345678"), "(11) 91234-5678");
        assert_eq!(mask_phone("1132345678"), "(11) 3234-5678");
        assert_eq!(mask_phone("11 9"), "(11) 9");
        assert_eq!(mask_phone("1"), "1");
        assert_eq!(mask_phone("(11) 91234-56789999"), "(11) 91234-5678");
    }

    #[test]
    fn test_mask_postal_code() {
        assert_eq!(mask_postal_code("14000000"), "14000-000");
        assert_eq!(mask_postal_code("1400"), "1400");
        assert_eq!(mask_postal_code("14000-0001"), "14000-000");
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("123.456.789-09"), "12345678909");
    }
}
