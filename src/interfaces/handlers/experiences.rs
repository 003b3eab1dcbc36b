use actix_web::{web, HttpRequest};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::{
        envelope::Envelope,
        experience::{DeleteExperiencesRequest, ExperienceInput, ExperienceView, Selection},
        listing::{ListingRequest, Page},
    },
    errors::AppError,
    utils::valid_uuid::valid_uuid,
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct FieldsQuery {
    pub fields: Option<String>,
}

#[instrument(skip(state))]
pub async fn get_all_experiences(
    state: web::Data<AppState>,
    query: web::Query<FieldsQuery>,
) -> Result<Envelope<Vec<ExperienceView>>, AppError> {
    let selection = Selection::from_fields(query.fields.as_deref())?;

    Ok(state.experience_handler.get_all_fields(selection).await)
}

/// Query strings from table front-ends repeat `columns[]`, so the raw pairs
/// are decoded here instead of through `web::Query`.
#[instrument(skip(state, req), fields(query = %req.query_string()))]
pub async fn paginate_experiences(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<Envelope<Page<ExperienceView>>, AppError> {
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(req.query_string().as_bytes())
        .into_owned()
        .collect();

    let fields = pairs
        .iter()
        .rev()
        .find(|(key, _)| key == "fields")
        .map(|(_, value)| value.as_str());
    let selection = Selection::from_fields(fields)?;
    let request = ListingRequest::from_pairs(&pairs);

    Ok(state
        .experience_handler
        .get_all_fields_with_paginate(&request, selection)
        .await)
}

#[instrument(skip(state))]
pub async fn get_experience(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<FieldsQuery>,
) -> Result<Envelope<ExperienceView>, AppError> {
    let id = valid_uuid(&path.into_inner())?;
    let selection = Selection::from_fields(query.fields.as_deref())?;

    Ok(state.experience_handler.get_by_id(&id, selection).await)
}

#[instrument(skip(state, payload))]
pub async fn store_experience(
    state: web::Data<AppState>,
    payload: web::Json<ExperienceInput>,
) -> Envelope<ExperienceView> {
    state.experience_handler.store(payload.into_inner()).await
}

#[instrument(skip(state, payload), fields(count = payload.ids.len()))]
pub async fn delete_experiences(
    state: web::Data<AppState>,
    payload: web::Json<DeleteExperiencesRequest>,
) -> Envelope<u64> {
    state.experience_handler.delete_by_ids(&payload.ids).await
}
