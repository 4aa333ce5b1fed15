// ==========================================
// Marmita Express - 州/城市目录
// ==========================================
// 职责: 解析静态目录 JSON，提供 州 → 城市 的联动选项
// 匹配: 地名去重音、小写后先精确匹配，再按子串包含兜底
// ==========================================

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 州
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// 州代码（UF，如 "SP"）
    #[serde(rename = "sigla")]
    pub code: String,
    /// 州名
    #[serde(rename = "nome")]
    pub name: String,
    /// 城市列表
    #[serde(rename = "cidades", default)]
    pub localities: Vec<String>,
}

/// 州/城市目录（静态数据源）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCatalog {
    #[serde(rename = "estados", default)]
    pub regions: Vec<Region>,
}

impl RegionCatalog {
    /// 从目录 JSON 解析
    ///
    /// # 格式
    /// {"estados": [{"sigla": "SP", "nome": "São Paulo", "cidades": ["Campinas", ...]}]}
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn region(&self, code: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.code == code)
    }

    /// 指定州的城市选项；未选州或州不存在时为空
    pub fn localities_for(&self, code: &str) -> &[String] {
        self.region(code).map(|r| r.localities.as_slice()).unwrap_or(&[])
    }

    pub fn contains_locality(&self, code: &str, locality: &str) -> bool {
        self.localities_for(code).iter().any(|c| c == locality)
    }

    /// 按州名（或州代码）匹配州
    ///
    /// 先精确匹配（名称或代码），再按名称子串包含兜底
    pub fn match_region_by_name(&self, name: &str) -> Option<&Region> {
        let needle = normalize_place_name(name);
        if needle.is_empty() {
            return None;
        }

        self.regions
            .iter()
            .find(|r| normalize_place_name(&r.name) == needle || normalize_place_name(&r.code) == needle)
            .or_else(|| {
                self.regions
                    .iter()
                    .find(|r| overlaps(&normalize_place_name(&r.name), &needle))
            })
    }

    /// 在指定州内匹配城市，返回目录中的原始城市名
    pub fn match_locality(&self, code: &str, name: &str) -> Option<&str> {
        let needle = normalize_place_name(name);
        if needle.is_empty() {
            return None;
        }
        let localities = self.localities_for(code);

        localities
            .iter()
            .find(|c| normalize_place_name(c) == needle)
            .or_else(|| {
                localities
                    .iter()
                    .find(|c| overlaps(&normalize_place_name(c), &needle))
            })
            .map(|c| c.as_str())
    }
}

/// 定位提示（反向地理编码或 IP 定位的结果）
///
/// 两个字段均为原始文本，应用到草稿前再与目录匹配
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationHint {
    /// 已解析的州代码
    pub region_code: Option<String>,
    /// 城市名（未匹配）
    pub locality: Option<String>,
}

/// 地名归一化：去重音、小写、去首尾空白
pub fn normalize_place_name(value: &str) -> String {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// 双向子串包含（空串不参与）
fn overlaps(candidate: &str, needle: &str) -> bool {
    !candidate.is_empty() && (candidate.contains(needle) || needle.contains(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RegionCatalog {
        RegionCatalog::from_json(
            r#"{"estados": [
                {"sigla": "SP", "nome": "São Paulo", "cidades": ["São Paulo", "Ribeirão Preto", "Campinas"]},
                {"sigla": "MG", "nome": "Minas Gerais", "cidades": ["Belo Horizonte", "Uberlândia"]}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_place_name() {
        assert_eq!(normalize_place_name("  Ribeirão Preto "), "ribeirao preto");
        assert_eq!(normalize_place_name("UBERLÂNDIA"), "uberlandia");
    }

    #[test]
    fn test_localities_for_filters_by_region() {
        let catalog = sample();
        assert_eq!(catalog.localities_for("MG").len(), 2);
        assert!(catalog.localities_for("RJ").is_empty());
        assert!(catalog.contains_locality("SP", "Campinas"));
        assert!(!catalog.contains_locality("MG", "Campinas"));
    }

    #[test]
    fn test_match_region_exact_then_partial() {
        let catalog = sample();
        assert_eq!(catalog.match_region_by_name("sao paulo").unwrap().code, "SP");
        assert_eq!(catalog.match_region_by_name("mg").unwrap().code, "MG");
        assert_eq!(catalog.match_region_by_name("Estado de Minas Gerais").unwrap().code, "MG");
        assert!(catalog.match_region_by_name("").is_none());
        assert!(catalog.match_region_by_name("Bahia").is_none());
    }

    #[test]
    fn test_match_locality_prefers_exact() {
        let catalog = sample();
        // "São Paulo" 精确命中，不会被子串规则误选其他城市
        assert_eq!(catalog.match_locality("SP", "SAO PAULO"), Some("São Paulo"));
        assert_eq!(catalog.match_locality("SP", "Ribeirao"), Some("Ribeirão Preto"));
        assert_eq!(catalog.match_locality("MG", "Campinas"), None);
    }
}
