use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use aramdb_core::{ChampionRecord, ExtendedAttributes, FetchResult, GameMode, Origin, StatModifiers};

use crate::middleware::RequestId;

use super::{map_acquisition_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct ChampionItem {
    id: u32,
    name: String,
    display_name: String,
    modes: BTreeMap<GameMode, StatModifiers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extended: Option<ExtendedAttributes>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChampionList {
    origin: Origin,
    fetched_at: DateTime<Utc>,
    source_version: Option<String>,
    champions_count: usize,
    champions: Vec<ChampionItem>,
}

#[derive(Debug, Serialize)]
pub(super) struct ChampionDetail {
    origin: Origin,
    fetched_at: DateTime<Utc>,
    source_version: Option<String>,
    champion: ChampionItem,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ChampionQuery {
    /// Restrict `modes` to one game mode; champions without an entry for it
    /// report the baseline.
    pub mode: Option<String>,
    /// Drop champions whose selected modes are all baseline.
    #[serde(default)]
    pub modified_only: bool,
}

pub(super) async fn list_champions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ChampionQuery>,
) -> Result<Json<ApiResponse<ChampionList>>, ApiError> {
    let mode = parse_mode(&req_id, query.mode.as_deref())?;
    let result = state
        .service
        .read()
        .await
        .map_err(|e| map_acquisition_error(req_id.0.clone(), &e))?;

    let FetchResult {
        records,
        fetched_at,
        source_version,
        origin,
    } = result;

    let champions: Vec<ChampionItem> = records
        .into_values()
        .map(|record| to_item(record, mode))
        .filter(|item| !query.modified_only || item.modes.values().any(|m| !m.is_baseline()))
        .collect();

    Ok(Json(ApiResponse {
        data: ChampionList {
            origin,
            fetched_at,
            source_version,
            champions_count: champions.len(),
            champions,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Looks a champion up by record key, API name or display name,
/// case-insensitively.
pub(super) async fn get_champion(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(name): Path<String>,
    Query(query): Query<ChampionQuery>,
) -> Result<Json<ApiResponse<ChampionDetail>>, ApiError> {
    let mode = parse_mode(&req_id, query.mode.as_deref())?;
    let result = state
        .service
        .read()
        .await
        .map_err(|e| map_acquisition_error(req_id.0.clone(), &e))?;

    let FetchResult {
        records,
        fetched_at,
        source_version,
        origin,
    } = result;

    let Some(record) = records.into_iter().find_map(|(key, record)| {
        let matches = key.eq_ignore_ascii_case(&name)
            || record.name.eq_ignore_ascii_case(&name)
            || record.display_name().eq_ignore_ascii_case(&name);
        matches.then_some(record)
    }) else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("champion {name:?} not found"),
        ));
    };

    Ok(Json(ApiResponse {
        data: ChampionDetail {
            origin,
            fetched_at,
            source_version,
            champion: to_item(record, mode),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn parse_mode(req_id: &RequestId, raw: Option<&str>) -> Result<Option<GameMode>, ApiError> {
    raw.map(|raw| {
        raw.parse::<GameMode>()
            .map_err(|message| ApiError::new(req_id.0.clone(), "bad_request", message))
    })
    .transpose()
}

fn to_item(record: ChampionRecord, mode: Option<GameMode>) -> ChampionItem {
    let modes = match mode {
        Some(mode) => BTreeMap::from([(mode, record.mode(mode))]),
        None => record.modes.clone(),
    };
    ChampionItem {
        id: record.id,
        display_name: record.display_name().to_owned(),
        name: record.name,
        modes,
        extended: record.extended,
    }
}
