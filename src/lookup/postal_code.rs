// ==========================================
// Marmita Express - ViaCEP 邮编查询
// ==========================================
// 接口: GET {base}/{cep}/json/
// 不存在: 200 + {"erro": true}
// ==========================================

use crate::domain::contact::{digits_only, PostalAddress};
use crate::lookup::error::{LookupError, LookupResult};
use crate::lookup::traits::PostalCodeLookup;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    erro: Option<serde_json::Value>,
    #[serde(default)]
    logradouro: String,
    #[serde(default)]
    bairro: String,
    #[serde(default)]
    localidade: String,
    #[serde(default)]
    uf: String,
}

impl ViaCepResponse {
    /// "erro" 可能是 true 或 "true"
    fn is_not_found(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(s)) => s.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }
}

pub struct ViaCepClient {
    http: reqwest::Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn lookup_url(&self, postal_code: &str) -> String {
        format!("{}/{}/json/", self.base_url, postal_code)
    }
}

#[async_trait]
impl PostalCodeLookup for ViaCepClient {
    #[instrument(skip(self))]
    async fn lookup(&self, postal_code: &str) -> LookupResult<Option<PostalAddress>> {
        let digits = digits_only(postal_code);
        if digits.len() != 8 {
            return Err(LookupError::InvalidInput(postal_code.to_string()));
        }

        let response = self.http.get(self.lookup_url(&digits)).send().await?;
        let status = response.status();
        // ViaCEP 对格式错误的邮编返回 400
        if status.as_u16() == 400 {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: ViaCepResponse = response.json().await?;
        if body.is_not_found() {
            tracing::debug!("CEP não encontrado: {}", digits);
            return Ok(None);
        }

        Ok(Some(PostalAddress {
            street: body.logradouro,
            neighborhood: body.bairro,
            locality: body.localidade,
            region: body.uf,
        }))
    }
}
