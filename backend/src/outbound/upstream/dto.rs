//! Wire payloads for the upstream records API.
//!
//! Reads decode straight into domain types; only the request mutation body
//! needs a dedicated shape, because edits and transitions share one `PUT`
//! endpoint upstream and unset fields must be omitted entirely.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{AccountId, RequestPatch, RequestStatus};

/// Body for `PUT /requests/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RequestPatchDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    applicant_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    national_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tax_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    common_enterprise_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subject: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sector: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<RequestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    processed_at: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contact: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rejection_reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_id: Option<AccountId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    creator_id: Option<AccountId>,
}

impl<'a> From<&'a RequestPatch> for RequestPatchDto<'a> {
    fn from(patch: &'a RequestPatch) -> Self {
        let form = patch.form.as_ref();
        Self {
            applicant_name: form.map(|f| f.applicant_name.as_str()),
            national_id: form.and_then(|f| f.national_id.as_deref()),
            tax_id: form.and_then(|f| f.tax_id.as_deref()),
            common_enterprise_id: form.and_then(|f| f.common_enterprise_id.as_deref()),
            subject: form.map(|f| f.subject.as_str()),
            // Transitions may also carry a sector correction.
            sector: form
                .and_then(|f| f.sector.as_deref())
                .or(patch.sector.as_deref()),
            email: form.and_then(|f| f.email.as_deref()),
            phone: form.and_then(|f| f.phone.as_deref()),
            status: patch.status,
            processed_at: patch.processed_on,
            contact: patch.contact.as_deref(),
            rejection_reason: patch.rejection_reason.as_deref(),
            agent_id: patch.agent_id,
            creator_id: patch.creator_id,
        }
    }
}
