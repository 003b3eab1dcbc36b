use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::{
        MSG_DELETED, MSG_FAULT_HIDDEN, MSG_FETCHED, MSG_NOTHING_TO_DELETE, MSG_NO_RESULT_BY_ID,
        MSG_SAVED, MSG_SOMETHING_WENT_WRONG, MSG_UPDATED,
    },
    entities::{
        envelope::Envelope,
        experience::{ExperienceColumn, ExperienceInput, ExperienceView, Selection},
        listing::{ListingQuery, ListingRequest, Page},
    },
    errors::{field_errors, AppError},
    repositories::experience::ExperienceRepository,
};

/// Experience records behind the `{ message, payload, status }` contract.
///
/// No method returns an error: store faults are logged and folded into an
/// error envelope, validation failures into a bad-request envelope.
pub struct ExperienceHandler<R>
where
    R: ExperienceRepository,
{
    pub experience_repo: R,
    expose_fault_details: bool,
}

impl<R> ExperienceHandler<R>
where
    R: ExperienceRepository,
{
    pub fn new(experience_repo: R) -> Self {
        ExperienceHandler {
            experience_repo,
            expose_fault_details: true,
        }
    }

    /// Controls whether fault envelopes carry the underlying error text or a
    /// generic message.
    pub fn with_fault_details(mut self, expose: bool) -> Self {
        self.expose_fault_details = expose;
        self
    }

    /// Fetches every record, projecting `selection`
    pub async fn get_all_fields(&self, selection: Selection) -> Envelope<Vec<ExperienceView>> {
        match self.experience_repo.get_all_experiences(selection).await {
            Ok(records) => Envelope::success(
                MSG_FETCHED,
                records
                    .into_iter()
                    .map(|record| ExperienceView::new(record, selection))
                    .collect(),
            ),
            Err(e) => self.fault(e),
        }
    }

    /// Fetches a single record by id
    pub async fn get_by_id(&self, id: &Uuid, selection: Selection) -> Envelope<ExperienceView> {
        match self.experience_repo.get_experience_by_id(id, selection).await {
            Ok(Some(record)) => Envelope::success(MSG_FETCHED, ExperienceView::new(record, selection)),
            Ok(None) => Envelope::not_found(MSG_NO_RESULT_BY_ID),
            Err(e) => self.fault(e),
        }
    }

    /// Creates a record, or replaces the editable fields of the record named
    /// by `input.id`
    pub async fn store(&self, input: ExperienceInput) -> Envelope<ExperienceView> {
        if let Err(errors) = input.validate() {
            return Envelope::bad_request(field_errors(&errors));
        }

        let experience = input.prepare_for_insert();

        let stored = match input.id {
            Some(id) => {
                let existing = self
                    .get_by_id(&id, Selection::only(&[ExperienceColumn::Id]))
                    .await;
                if !existing.is_success() {
                    return existing;
                }

                self.experience_repo.update_experience(&id, &experience).await
            }
            None => self
                .experience_repo
                .create_experience(&experience)
                .await
                .map(Some),
        };

        match stored {
            Ok(Some(record)) => {
                let message = if input.id.is_some() { MSG_UPDATED } else { MSG_SAVED };
                tracing::debug!(id = %record.id, "{}", message);
                Envelope::success(message, ExperienceView::full(record))
            }
            Ok(None) => Envelope::failed(MSG_SOMETHING_WENT_WRONG),
            Err(e) => self.fault(e),
        }
    }

    /// One page of records, searched and sorted as the listing request asks
    pub async fn get_all_fields_with_paginate(
        &self,
        request: &ListingRequest,
        selection: Selection,
    ) -> Envelope<Page<ExperienceView>> {
        let query = match ListingQuery::try_from(request) {
            Ok(query) => query,
            Err(errors) => return Envelope::bad_request(errors),
        };

        match self.experience_repo.paginate_experiences(&query, selection).await {
            Ok(page) => Envelope::success(
                MSG_FETCHED,
                page.map(|record| ExperienceView::new(record, selection)),
            ),
            Err(e) => self.fault(e),
        }
    }

    /// Deletes every record whose id is listed
    pub async fn delete_by_ids(&self, ids: &[Uuid]) -> Envelope<u64> {
        match self.experience_repo.delete_experiences(ids).await {
            Ok(0) => Envelope::failed(MSG_NOTHING_TO_DELETE),
            Ok(deleted) => {
                tracing::debug!(deleted, "Deleted experiences");
                Envelope::success(MSG_DELETED, deleted)
            }
            Err(e) => self.fault(e),
        }
    }

    fn fault<T>(&self, err: AppError) -> Envelope<T> {
        tracing::error!("{}", err);

        if self.expose_fault_details {
            Envelope::fault(err.to_string())
        } else {
            Envelope::fault(MSG_FAULT_HIDDEN)
        }
    }
}
