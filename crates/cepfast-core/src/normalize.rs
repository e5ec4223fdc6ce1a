//! Source payload schemas and their mapping into [`Address`].
//!
//! | Address field | BrasilAPI | ViaCEP |
//! |---------------|-----------|--------|
//! | `postal_code` | `cep` | `cep` |
//! | `street` | `street` | `logradouro` |
//! | `district` | `neighborhood` | `bairro` |
//! | `city` | `city` | `localidade` |
//! | `state` | `state` | `uf` |
//!
//! Mapping is renaming only. Unknown fields are ignored and missing fields
//! decode as empty strings.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::{Address, SourceId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("failed to decode {source_id} payload: {message}")]
    Decode { source_id: SourceId, message: String },

    #[error("unknown source '{name}'")]
    UnknownSource { name: String },
}

/// Decode one source's raw body into the shared address shape.
pub fn normalize(source: SourceId, body: &str) -> Result<Address, NormalizeError> {
    match source {
        SourceId::BrasilApi => decode::<BrasilApiResponse>(source, body).map(Address::from),
        SourceId::ViaCep => decode::<ViaCepResponse>(source, body).map(Address::from),
    }
}

/// Same as [`normalize`] for callers that only hold a source name.
pub fn normalize_named(name: &str, body: &str) -> Result<Address, NormalizeError> {
    let source = name
        .parse::<SourceId>()
        .map_err(|_| NormalizeError::UnknownSource {
            name: name.to_owned(),
        })?;
    normalize(source, body)
}

fn decode<T: DeserializeOwned>(source: SourceId, body: &str) -> Result<T, NormalizeError> {
    serde_json::from_str(body).map_err(|error| NormalizeError::Decode {
        source_id: source,
        message: error.to_string(),
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct BrasilApiResponse {
    cep: String,
    state: String,
    city: String,
    neighborhood: String,
    street: String,
}

impl From<BrasilApiResponse> for Address {
    fn from(payload: BrasilApiResponse) -> Self {
        Self {
            postal_code: payload.cep,
            street: payload.street,
            district: payload.neighborhood,
            city: payload.city,
            state: payload.state,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ViaCepResponse {
    cep: String,
    logradouro: String,
    bairro: String,
    localidade: String,
    uf: String,
}

impl From<ViaCepResponse> for Address {
    fn from(payload: ViaCepResponse) -> Self {
        Self {
            postal_code: payload.cep,
            street: payload.logradouro,
            district: payload.bairro,
            city: payload.localidade,
            state: payload.uf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRASIL_API_BODY: &str = r#"{
        "cep": "01153000",
        "state": "SP",
        "city": "São Paulo",
        "neighborhood": "Barra Funda",
        "street": "Rua Vitorino Carmilo",
        "service": "open-cep"
    }"#;

    const VIACEP_BODY: &str = r#"{
        "cep": "01153-000",
        "logradouro": "Rua Vitorino Carmilo",
        "complemento": "",
        "bairro": "Barra Funda",
        "localidade": "São Paulo",
        "uf": "SP",
        "ibge": "3550308",
        "ddd": "11"
    }"#;

    #[test]
    fn brasil_api_neighborhood_maps_to_district() {
        let address = normalize(SourceId::BrasilApi, BRASIL_API_BODY).expect("valid payload");

        assert_eq!(address.postal_code, "01153000");
        assert_eq!(address.street, "Rua Vitorino Carmilo");
        assert_eq!(address.district, "Barra Funda");
        assert_eq!(address.city, "São Paulo");
        assert_eq!(address.state, "SP");
    }

    #[test]
    fn viacep_portuguese_fields_map_to_common_shape() {
        let address = normalize(SourceId::ViaCep, VIACEP_BODY).expect("valid payload");

        assert_eq!(address.postal_code, "01153-000");
        assert_eq!(address.street, "Rua Vitorino Carmilo");
        assert_eq!(address.district, "Barra Funda");
        assert_eq!(address.city, "São Paulo");
        assert_eq!(address.state, "SP");
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let address =
            normalize(SourceId::ViaCep, r#"{"bairro": "Lapa", "uf": "SP"}"#).expect("valid payload");

        assert_eq!(address.district, "Lapa");
        assert_eq!(address.state, "SP");
        assert!(address.street.is_empty());
        assert!(address.city.is_empty());
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = normalize(SourceId::BrasilApi, "{\"cep\": ").expect_err("must fail");
        assert!(matches!(
            err,
            NormalizeError::Decode {
                source_id: SourceId::BrasilApi,
                ..
            }
        ));
    }

    #[test]
    fn wrongly_typed_field_is_a_decode_error() {
        let err = normalize(SourceId::ViaCep, r#"{"cep": 1153000}"#).expect_err("must fail");
        assert!(matches!(err, NormalizeError::Decode { .. }));
    }

    #[test]
    fn non_object_body_is_a_decode_error() {
        let err = normalize(SourceId::ViaCep, "\"01153000\"").expect_err("must fail");
        assert!(matches!(err, NormalizeError::Decode { .. }));
    }

    #[test]
    fn named_lookup_rejects_unknown_source() {
        let err = normalize_named("Correios", "{}").expect_err("must fail");
        assert_eq!(
            err,
            NormalizeError::UnknownSource {
                name: String::from("Correios")
            }
        );
    }

    #[test]
    fn named_lookup_dispatches_by_name() {
        let address = normalize_named("BrasilAPI", BRASIL_API_BODY).expect("valid payload");
        assert_eq!(address.district, "Barra Funda");
    }
}
