// ==========================================
// Marmita Express - 结账校验器
// ==========================================
// 职责: 结账前校验联系人与配送地址
// 规则: 收集全部违规字段后一次性返回，不在第一个错误处停止
// ==========================================

use crate::api::error::{ApiError, ApiResult, CheckoutField, ValidationViolation};
use crate::domain::contact::digits_only;
use crate::domain::draft::OrderDraft;
use crate::i18n::t_for;

/// 巴西有效区号（DDD）
const VALID_AREA_CODES: [&str; 67] = [
    "11", "12", "13", "14", "15", "16", "17", "18", "19", "21", "22", "24", "27", "28", "31",
    "32", "33", "34", "35", "37", "38", "41", "42", "43", "44", "45", "46", "47", "48", "49",
    "51", "53", "54", "55", "61", "62", "63", "64", "65", "66", "67", "68", "69", "71", "73",
    "74", "75", "77", "79", "81", "82", "83", "84", "85", "86", "87", "88", "89", "91", "92",
    "93", "94", "95", "96", "97", "98", "99",
];

/// 巴西电话号码校验（只接受纯数字）
///
/// - 10~11 位
/// - 前两位为有效 DDD
/// - 11 位号码第三位必须是 9（手机）
pub fn is_valid_brazilian_phone(phone: &str) -> bool {
    if !(10..=11).contains(&phone.len()) || !phone.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let area_code = &phone[..2];
    if !VALID_AREA_CODES.iter().any(|code| *code == area_code) {
        return false;
    }
    !(phone.len() == 11 && phone.as_bytes()[2] != b'9')
}

/// CPF 校验（两位 mod-11 校验码）
///
/// 输入可带掩码；全部同一数字的号码视为无效
pub fn is_valid_cpf(raw: &str) -> bool {
    let digits: Vec<u32> = digits_only(raw)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();
    if digits.len() != 11 || digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    let check_digit = |len: usize| -> u32 {
        let sum: u32 = digits[..len]
            .iter()
            .enumerate()
            .map(|(i, d)| d * (len as u32 + 1 - i as u32))
            .sum();
        let rest = (sum * 10) % 11;
        if rest == 10 {
            0
        } else {
            rest
        }
    };

    check_digit(9) == digits[9] && check_digit(10) == digits[10]
}

// ==========================================
// CheckoutValidator
// ==========================================

/// 结账校验器
pub struct CheckoutValidator {
    locale: String,
}

impl CheckoutValidator {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
        }
    }

    /// 校验草稿，违规时返回 CheckoutValidationError（包含全部违规）
    pub fn validate(&self, draft: &OrderDraft) -> ApiResult<()> {
        let violations = self.collect_violations(draft);
        if violations.is_empty() {
            return Ok(());
        }

        tracing::info!("结账校验失败: {}个字段", violations.len());
        Err(ApiError::CheckoutValidationError {
            reason: t_for(&self.locale, "validation.summary"),
            violations,
        })
    }

    /// 收集全部违规字段
    pub fn collect_violations(&self, draft: &OrderDraft) -> Vec<ValidationViolation> {
        let mut violations = Vec::new();
        let mut flag = |field: CheckoutField, key: &str| {
            violations.push(ValidationViolation {
                field,
                reason: t_for(&self.locale, key),
            });
        };

        if !draft.is_combo_complete() {
            flag(CheckoutField::Items, "validation.combo_incomplete");
        }

        if draft.contact.name.trim().is_empty() {
            flag(CheckoutField::Name, "validation.name_required");
        }

        // 邮编: 为空、或失焦/查询留下了问题标记
        let address = &draft.address;
        if address.postal_code.trim().is_empty() {
            flag(CheckoutField::PostalCode, "validation.postal_code_required");
        } else if let Some(issue) = address.postal_code_issue {
            flag(CheckoutField::PostalCode, issue.message_key());
        } else if digits_only(&address.postal_code).len() != 8 {
            flag(CheckoutField::PostalCode, "validation.postal_code_invalid");
        }

        if address.street.trim().is_empty() {
            flag(CheckoutField::Street, "validation.street_required");
        }
        if address.number.trim().is_empty() {
            flag(CheckoutField::Number, "validation.number_required");
        }

        let phone = digits_only(&draft.contact.phone);
        if phone.is_empty() {
            flag(CheckoutField::Phone, "validation.phone_required");
        } else if !is_valid_brazilian_phone(&phone) {
            flag(CheckoutField::Phone, "validation.phone_invalid");
        }

        if draft.contact.tax_id_requested && !is_valid_cpf(&draft.contact.tax_id) {
            flag(CheckoutField::TaxId, "validation.tax_id_invalid");
        }

        violations
    }
}
