use std::sync::OnceLock;

use serde::Deserialize;

use crate::state::{EntryRecord, EntryRef, TypeRef};

const API_BASE: &str = "https://pokeapi.co/api/v2";

// The type catalog is only ever requested with this fixed window;
// anything past it is never offered.
const TYPE_LIST_QUERY: &str = "offset=0&limit=21";

#[derive(Clone, Debug, Deserialize)]
struct NamedResource {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct TypeListResponse {
    results: Vec<NamedResource>,
}

#[derive(Clone, Debug, Deserialize)]
struct TypeDetailResponse {
    pokemon: Vec<TypeMemberSlot>,
}

#[derive(Clone, Debug, Deserialize)]
struct TypeMemberSlot {
    pokemon: NamedResource,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonResponse {
    name: String,
    height: u16,
    weight: u16,
    stats: Vec<PokemonStatSlot>,
    sprites: serde_json::Value,
}

#[derive(Clone, Debug, Deserialize)]
struct PokemonStatSlot {
    base_stat: u16,
}

pub async fn fetch_type_list() -> Result<Vec<TypeRef>, String> {
    let url = format!("{API_BASE}/type?{TYPE_LIST_QUERY}");
    let response: TypeListResponse = fetch_json(&url).await?;
    Ok(response
        .results
        .into_iter()
        .map(|entry| TypeRef {
            name: entry.name,
            url: entry.url,
        })
        .collect())
}

/// Member entries of a type, in API response order. Pagination depends on
/// that order staying put.
pub async fn fetch_type_members(url: &str) -> Result<Vec<EntryRef>, String> {
    let response: TypeDetailResponse = fetch_json(url).await?;
    Ok(response
        .pokemon
        .into_iter()
        .map(|slot| EntryRef {
            name: slot.pokemon.name,
            url: slot.pokemon.url,
        })
        .collect())
}

pub async fn fetch_entry_record(url: &str) -> Result<EntryRecord, String> {
    let response: PokemonResponse = fetch_json(url).await?;
    let sprite_front = pointer_string(&response.sprites, "/front_default");
    let sprite_alt = pointer_string(&response.sprites, "/other/dream_world/front_default");
    Ok(EntryRecord {
        name: response.name,
        sprite_front,
        sprite_alt,
        stats: response
            .stats
            .into_iter()
            .map(|slot| slot.base_stat)
            .collect(),
        height: response.height,
        weight: response.weight,
    })
}

pub async fn fetch_bytes(url: &str) -> Result<Vec<u8>, String> {
    let client = http_client();
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| err.to_string())?;
    let response = response.error_for_status().map_err(|err| err.to_string())?;
    Ok(response
        .bytes()
        .await
        .map_err(|err| err.to_string())?
        .to_vec())
}

async fn fetch_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, String> {
    let bytes = fetch_bytes(url).await?;
    serde_json::from_slice(&bytes).map_err(|err| err.to_string())
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}
