// ==========================================
// Marmita Express - 金额类型
// ==========================================
// 金额以最小货币单位（分）存储，避免浮点累计误差
// 展示格式（千分位/小数点/符号）由 locales 提供
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// 金额（最小货币单位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// 由最小单位（分）构造
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// 由主单位（元/雷亚尔）构造，四舍五入到分
    pub fn from_major(major: f64) -> Self {
        Money((major * 100.0).round() as i64)
    }

    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// 主单位数值（仅用于对外 JSON 载荷）
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// 按区域格式输出（如 pt-BR: "R$ 1.234,56"）
    pub fn format(&self, format: &CurrencyFormat) -> String {
        let abs = self.0.unsigned_abs();
        let integer = (abs / 100).to_string();
        let cents = abs % 100;

        // 千分位分组
        let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
        for (i, ch) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                grouped.push_str(&format.thousands_separator);
            }
            grouped.push(ch);
        }

        let amount = format!("{}{}{:02}", grouped, format.decimal_separator, cents);
        let rendered = format.pattern.replace("%{amount}", &amount);
        if self.0 < 0 {
            format!("-{}", rendered)
        } else {
            rendered
        }
    }

    /// 按指定 locale 输出
    pub fn format_for_locale(&self, locale: &str) -> String {
        self.format(&CurrencyFormat::for_locale(locale))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Mul<u32> for Money {
    type Output = Money;

    fn mul(self, rhs: u32) -> Money {
        Money(self.0 * i64::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

// ==========================================
// CurrencyFormat - 货币展示格式
// ==========================================

/// 货币展示格式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyFormat {
    /// 含 %{amount} 占位符的模板，如 "R$ %{amount}"
    pub pattern: String,
    pub decimal_separator: String,
    pub thousands_separator: String,
}

impl CurrencyFormat {
    /// 从 locales 读取指定语言的货币格式
    pub fn for_locale(locale: &str) -> Self {
        Self {
            pattern: rust_i18n::t!("currency.pattern", locale = locale).to_string(),
            decimal_separator: rust_i18n::t!("currency.decimal_separator", locale = locale)
                .to_string(),
            thousands_separator: rust_i18n::t!("currency.thousands_separator", locale = locale)
                .to_string(),
        }
    }

    /// 当前全局 locale 的货币格式
    pub fn current() -> Self {
        Self::for_locale(&rust_i18n::locale().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn br() -> CurrencyFormat {
        CurrencyFormat {
            pattern: "R$ %{amount}".to_string(),
            decimal_separator: ",".to_string(),
            thousands_separator: ".".to_string(),
        }
    }

    #[test]
    fn test_from_major_rounds_to_cents() {
        assert_eq!(Money::from_major(24.90).minor_units(), 2490);
        assert_eq!(Money::from_major(64.9).minor_units(), 6490);
        assert_eq!(Money::from_major(0.1 + 0.2).minor_units(), 30);
    }

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(Money::from_minor(2490).format(&br()), "R$ 24,90");
        assert_eq!(Money::from_minor(123456).format(&br()), "R$ 1.234,56");
        assert_eq!(Money::from_minor(100000000).format(&br()), "R$ 1.000.000,00");
        assert_eq!(Money::from_minor(5).format(&br()), "R$ 0,05");
        assert_eq!(Money::from_minor(-290).format(&br()), "-R$ 2,90");
    }

    #[test]
    fn test_format_for_locale() {
        assert_eq!(Money::from_minor(123456).format_for_locale("pt-BR"), "R$ 1.234,56");
        assert_eq!(Money::from_minor(123456).format_for_locale("en"), "R$1,234.56");
    }

    #[test]
    fn test_arithmetic() {
        let total: Money = vec![Money::from_minor(250), Money::from_minor(150)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::from_minor(400));
        assert_eq!(Money::from_minor(2490) * 3, Money::from_minor(7470));
        assert_eq!(Money::from_minor(1090).to_string(), "10.90");
    }
}
