//! PokeAPI client

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::state::{Ability, Detail, SpriteUrls, Stat, Summary};

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

#[derive(thiserror::Error, Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum CatalogError {
    #[error("request failed with status {status}")]
    RequestFailed { status: u16 },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("response parse error: {0}")]
    Parse(String),
}

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct ListResponse {
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    id: u32,
    name: String,
    height: u32,
    weight: u32,
    base_experience: Option<u32>,
    sprites: serde_json::Value,
    types: Vec<PokemonTypeSlot>,
    stats: Vec<PokemonStatSlot>,
    abilities: Vec<PokemonAbilitySlot>,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonTypeSlot {
    #[serde(rename = "type")]
    type_info: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
    stat: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonAbilitySlot {
    ability: NamedResource,
    #[serde(default)]
    is_hidden: bool,
}

/// Read-only client for the collection and single-resource routes.
///
/// No retries and no caching: every call is one round trip.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for CatalogClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a page of up to `limit` summaries starting at `offset`.
    pub async fn list_summaries(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Summary>, CatalogError> {
        let url = format!("{}/pokemon?limit={limit}&offset={offset}", self.base_url);
        let response: ListResponse = self.fetch_json(&url).await?;
        Ok(response
            .results
            .into_iter()
            .map(|entry| Summary {
                name: entry.name,
                url: entry.url,
            })
            .collect())
    }

    /// Fetch one full record by numeric id or exact name.
    pub async fn get_detail(&self, id_or_name: &str) -> Result<Detail, CatalogError> {
        let url = format!("{}/pokemon/{id_or_name}", self.base_url);
        let response: PokemonResponse = self.fetch_json(&url).await?;
        Ok(detail_from_response(response))
    }

    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await.map_err(|err| {
            warn!(%url, error = %err, "request did not complete");
            CatalogError::Transport(err.to_string())
        })?;
        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "request failed");
            return Err(CatalogError::RequestFailed {
                status: status.as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|err| CatalogError::Transport(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, CatalogError> {
        let bytes = self.fetch_bytes(url).await?;
        serde_json::from_slice(&bytes).map_err(|err| {
            warn!(%url, error = %err, "malformed response body");
            CatalogError::Parse(err.to_string())
        })
    }
}

fn detail_from_response(response: PokemonResponse) -> Detail {
    let sprites = SpriteUrls {
        front_default: pointer_string(&response.sprites, "/front_default"),
        front_shiny: pointer_string(&response.sprites, "/front_shiny"),
        artwork: pointer_string(&response.sprites, "/other/official-artwork/front_default"),
    };
    Detail {
        id: response.id,
        name: response.name,
        height: response.height,
        weight: response.weight,
        base_experience: response.base_experience,
        sprites,
        types: response
            .types
            .into_iter()
            .map(|slot| slot.type_info.name)
            .collect(),
        stats: response
            .stats
            .into_iter()
            .map(|slot| Stat {
                name: slot.stat.name,
                base_stat: slot.base_stat,
            })
            .collect(),
        abilities: response
            .abilities
            .into_iter()
            .map(|slot| Ability {
                name: slot.ability.name,
                is_hidden: slot.is_hidden,
            })
            .collect(),
    }
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}
