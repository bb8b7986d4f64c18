//! Staff directory service, including the reassign-then-delete compound
//! operation.
//!
//! Requests reference accounts weakly (creator and acting agent), so an
//! account can only leave the directory once nothing points at it. The
//! caller either resolves the dependents first or names a replacement
//! account and lets the service rewrite the references before deleting.

use std::sync::Arc;

use mockable::Clock;
use thiserror::Error as ThisError;

use super::access::{Target, decide};
use super::account::{AccountId, AccountUpdate, NewAccount, UserAccount};
use super::error::Error;
use super::ports::{DirectoryGateway, RequestPatch, RequestsGateway, UpstreamError};
use super::request::RequestRecord;
use super::request_service::require_token;
use super::role::{Action, Resource};
use super::session::{AccessToken, decode_optional};

/// Failures specific to the compound delete. The phase matters to the
/// caller: a partial reassignment leaves upstream state changed.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum DeleteUserError {
    /// Refused before anything changed upstream.
    #[error(transparent)]
    Denied(Error),
    /// Reassignment stopped partway; some requests now reference the
    /// replacement account while the rest still reference the original.
    #[error("reassignment stopped after {reassigned} of {total} requests: {source}")]
    ReassignIncomplete {
        reassigned: usize,
        total: usize,
        source: UpstreamError,
    },
    /// Every dependent was reassigned but the delete itself failed; the
    /// account survives with no remaining references.
    #[error("requests were reassigned but the account delete failed: {source}")]
    DeleteFailed {
        reassigned: usize,
        source: UpstreamError,
    },
}

impl From<Error> for DeleteUserError {
    fn from(value: Error) -> Self {
        Self::Denied(value)
    }
}

impl From<DeleteUserError> for Error {
    fn from(value: DeleteUserError) -> Self {
        match value {
            DeleteUserError::Denied(error) => error,
            DeleteUserError::ReassignIncomplete {
                reassigned,
                total,
                source,
            } => Error::from(source).with_details(serde_json::json!({
                "phase": "reassign",
                "reassigned": reassigned,
                "total": total,
            })),
            DeleteUserError::DeleteFailed { reassigned, source } => Error::from(source)
                .with_details(serde_json::json!({
                    "phase": "delete",
                    "reassigned": reassigned,
                })),
        }
    }
}

/// Outcome of a successful compound delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReport {
    /// Requests rewritten to the replacement account before the delete.
    pub reassigned: usize,
}

/// Driving service for the `/users` resource.
pub struct DirectoryWorkflow<D: ?Sized, R: ?Sized> {
    directory: Arc<D>,
    requests: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<D: ?Sized, R: ?Sized> Clone for DirectoryWorkflow<D, R> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
            requests: Arc::clone(&self.requests),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<D: ?Sized, R: ?Sized> DirectoryWorkflow<D, R> {
    /// Create a new workflow over the directory and request gateways.
    pub fn new(directory: Arc<D>, requests: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            directory,
            requests,
            clock,
        }
    }
}

impl<D: DirectoryGateway + ?Sized, R: RequestsGateway + ?Sized> DirectoryWorkflow<D, R> {
    /// List all staff accounts.
    pub async fn list(&self, token: Option<&AccessToken>) -> Result<Vec<UserAccount>, Error> {
        self.authorise(token, Action::ViewList, Target::None)?;
        let token = require_token(token)?;

        Ok(self.directory.list(token).await?)
    }

    /// Provision a new staff account.
    pub async fn create(
        &self,
        token: Option<&AccessToken>,
        account: NewAccount,
    ) -> Result<UserAccount, Error> {
        self.authorise(token, Action::Create, Target::None)?;
        account
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let token = require_token(token)?;

        Ok(self.directory.create(token, &account).await?)
    }

    /// Update an existing staff account.
    pub async fn update(
        &self,
        token: Option<&AccessToken>,
        id: AccountId,
        update: AccountUpdate,
    ) -> Result<UserAccount, Error> {
        self.authorise(token, Action::Edit, Target::None)?;
        update
            .validate()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let token = require_token(token)?;

        Ok(self.directory.update(token, id, &update).await?)
    }

    /// Delete a staff account, optionally reassigning its requests first.
    ///
    /// Without a replacement, a referenced account is refused with a
    /// has-dependents conflict before anything changes upstream. With one,
    /// each dependent request is rewritten to the replacement and the
    /// account is deleted only once every rewrite succeeded.
    pub async fn delete(
        &self,
        token: Option<&AccessToken>,
        id: AccountId,
        reassign_to: Option<AccountId>,
    ) -> Result<DeleteReport, DeleteUserError> {
        // Role gate first; a forbidden caller never reaches the upstream.
        self.authorise(token, Action::Delete, Target::None)?;
        let token_ref = require_token(token)?;
        let dependents = self.dependents_of(token_ref, id).await.map_err(Error::from)?;

        // A named replacement resolves the dependency, so the engine sees
        // an unreferenced account.
        let remaining = if reassign_to.is_some() {
            0
        } else {
            dependents.len() as u64
        };
        self.authorise(
            token,
            Action::Delete,
            Target::UserAccount {
                dependent_requests: remaining,
            },
        )?;

        let mut reassigned = 0;
        if let Some(replacement) = reassign_to {
            if replacement == id {
                return Err(DeleteUserError::Denied(Error::invalid_request(
                    "requests cannot be reassigned to the account being deleted",
                )));
            }
            let total = dependents.len();
            for record in &dependents {
                let patch = reassignment_patch(record, id, replacement);
                if let Err(source) = self.requests.update(token_ref, record.id, &patch).await {
                    return Err(DeleteUserError::ReassignIncomplete {
                        reassigned,
                        total,
                        source,
                    });
                }
                reassigned += 1;
            }
        }

        match self.directory.delete(token_ref, id).await {
            Ok(()) => Ok(DeleteReport { reassigned }),
            // The upstream re-checks references and may race a concurrent
            // filing even after a clean reassignment.
            Err(source) if reassigned > 0 => {
                Err(DeleteUserError::DeleteFailed { reassigned, source })
            }
            Err(source) => Err(DeleteUserError::Denied(source.into())),
        }
    }

    async fn dependents_of(
        &self,
        token: &AccessToken,
        id: AccountId,
    ) -> Result<Vec<RequestRecord>, UpstreamError> {
        let records = self.requests.track(token).await?;
        Ok(records
            .into_iter()
            .filter(|record| record.creator_id == id || record.agent_id == Some(id))
            .collect())
    }

    fn authorise(
        &self,
        token: Option<&AccessToken>,
        action: Action,
        target: Target<'_>,
    ) -> Result<(), Error> {
        let now = self.clock.utc();
        let session = decode_optional(token, now);
        decide(&session, Resource::User, action, target, now).into_result()
    }
}

fn reassignment_patch(
    record: &RequestRecord,
    from: AccountId,
    to: AccountId,
) -> RequestPatch {
    RequestPatch {
        creator_id: (record.creator_id == from).then_some(to),
        agent_id: (record.agent_id == Some(from)).then_some(to),
        ..RequestPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::domain::ports::{MockDirectoryGateway, MockRequestsGateway};
    use crate::domain::request::RequestStatus;
    use crate::domain::role::Role;
    use crate::domain::test_support::{frozen_clock, request_record, token_for};
    use chrono::Duration;
    use rstest::rstest;

    fn workflow(
        directory: MockDirectoryGateway,
        requests: MockRequestsGateway,
    ) -> DirectoryWorkflow<MockDirectoryGateway, MockRequestsGateway> {
        DirectoryWorkflow::new(Arc::new(directory), Arc::new(requests), frozen_clock())
    }

    fn dependents(creator: i64, count: i64) -> Vec<RequestRecord> {
        (0..count)
            .map(|n| {
                request_record(
                    100 + n,
                    AccountId(creator),
                    Duration::days(2),
                    RequestStatus::New,
                )
            })
            .collect()
    }

    #[rstest]
    #[case(Role::Manager)]
    #[case(Role::Frontdesk)]
    #[case(Role::Processing)]
    #[tokio::test]
    async fn only_admins_manage_the_directory(#[case] role: Role) {
        let mut directory = MockDirectoryGateway::new();
        directory.expect_list().times(0);

        let token = token_for(role, 9);
        let error = workflow(directory, MockRequestsGateway::new())
            .list(Some(&token))
            .await
            .expect_err("directory is admin-only");
        assert_eq!(error.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case(Role::Manager)]
    #[case(Role::Frontdesk)]
    #[case(Role::Processing)]
    #[tokio::test]
    async fn forbidden_roles_are_refused_before_any_upstream_call(#[case] role: Role) {
        let mut requests = MockRequestsGateway::new();
        requests.expect_track().times(0);
        let mut directory = MockDirectoryGateway::new();
        directory.expect_delete().times(0);

        let token = token_for(role, 9);
        let error = workflow(directory, requests)
            .delete(Some(&token), AccountId(5), None)
            .await
            .expect_err("only admins delete accounts");
        match error {
            DeleteUserError::Denied(inner) => assert_eq!(inner.code(), ErrorCode::Forbidden),
            other => panic!("expected a pre-change denial, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deleting_a_referenced_account_without_replacement_is_refused() {
        let mut requests = MockRequestsGateway::new();
        requests
            .expect_track()
            .times(1)
            .return_once(|_| Ok(dependents(5, 3)));
        let mut directory = MockDirectoryGateway::new();
        directory.expect_delete().times(0);

        let token = token_for(Role::Admin, 1);
        let error = workflow(directory, requests)
            .delete(Some(&token), AccountId(5), None)
            .await
            .expect_err("dependents block the delete");
        match error {
            DeleteUserError::Denied(inner) => {
                assert_eq!(inner.code(), ErrorCode::Conflict);
                let details = inner.details().expect("denial details");
                assert_eq!(details["denial"], "has-dependents");
            }
            other => panic!("expected a pre-change denial, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn reassignment_rewrites_every_dependent_then_deletes() {
        let mut requests = MockRequestsGateway::new();
        requests
            .expect_track()
            .times(1)
            .return_once(|_| Ok(dependents(5, 2)));
        requests
            .expect_update()
            .withf(|_, _, patch| {
                patch.creator_id == Some(AccountId(8)) && patch.form.is_none()
            })
            .times(2)
            .returning(|_, id, _| {
                Ok(request_record(
                    id.0,
                    AccountId(8),
                    Duration::days(2),
                    RequestStatus::New,
                ))
            });
        let mut directory = MockDirectoryGateway::new();
        directory
            .expect_delete()
            .times(1)
            .return_once(|_, _| Ok(()));

        let token = token_for(Role::Admin, 1);
        let report = workflow(directory, requests)
            .delete(Some(&token), AccountId(5), Some(AccountId(8)))
            .await
            .expect("reassign then delete succeeds");
        assert_eq!(report.reassigned, 2);
    }

    #[tokio::test]
    async fn partial_reassignment_reports_progress_and_skips_the_delete() {
        let mut requests = MockRequestsGateway::new();
        requests
            .expect_track()
            .times(1)
            .return_once(|_| Ok(dependents(5, 3)));
        let mut calls = 0;
        requests.expect_update().times(2).returning(move |_, id, _| {
            calls += 1;
            if calls == 2 {
                Err(UpstreamError::transport("connection reset"))
            } else {
                Ok(request_record(
                    id.0,
                    AccountId(8),
                    Duration::days(2),
                    RequestStatus::New,
                ))
            }
        });
        let mut directory = MockDirectoryGateway::new();
        directory.expect_delete().times(0);

        let token = token_for(Role::Admin, 1);
        let error = workflow(directory, requests)
            .delete(Some(&token), AccountId(5), Some(AccountId(8)))
            .await
            .expect_err("second rewrite fails");
        match error {
            DeleteUserError::ReassignIncomplete {
                reassigned, total, ..
            } => {
                assert_eq!(reassigned, 1);
                assert_eq!(total, 3);
            }
            other => panic!("expected a partial reassignment, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_failure_after_reassignment_is_its_own_phase() {
        let mut requests = MockRequestsGateway::new();
        requests
            .expect_track()
            .times(1)
            .return_once(|_| Ok(dependents(5, 1)));
        requests.expect_update().times(1).returning(|_, id, _| {
            Ok(request_record(
                id.0,
                AccountId(8),
                Duration::days(2),
                RequestStatus::New,
            ))
        });
        let mut directory = MockDirectoryGateway::new();
        directory
            .expect_delete()
            .times(1)
            .return_once(|_, _| Err(UpstreamError::status(500, "boom")));

        let token = token_for(Role::Admin, 1);
        let error = workflow(directory, requests)
            .delete(Some(&token), AccountId(5), Some(AccountId(8)))
            .await
            .expect_err("delete fails after reassignment");
        let folded = Error::from(error);
        let details = folded.details().expect("phase details");
        assert_eq!(details["phase"], "delete");
        assert_eq!(details["reassigned"], 1);
    }

    #[tokio::test]
    async fn reassigning_to_the_deleted_account_is_invalid() {
        let mut requests = MockRequestsGateway::new();
        requests
            .expect_track()
            .times(1)
            .return_once(|_| Ok(dependents(5, 1)));
        requests.expect_update().times(0);
        let mut directory = MockDirectoryGateway::new();
        directory.expect_delete().times(0);

        let token = token_for(Role::Admin, 1);
        let error = workflow(directory, requests)
            .delete(Some(&token), AccountId(5), Some(AccountId(5)))
            .await
            .expect_err("self-reassignment rejected");
        assert_eq!(
            Error::from(error).code(),
            ErrorCode::InvalidRequest,
        );
    }

    #[tokio::test]
    async fn new_account_payloads_validate_before_the_network() {
        let mut directory = MockDirectoryGateway::new();
        directory.expect_create().times(0);

        let token = token_for(Role::Admin, 1);
        let error = workflow(directory, MockRequestsGateway::new())
            .create(
                Some(&token),
                NewAccount {
                    username: "ab".to_owned(),
                    email: "a@b.test".to_owned(),
                    password: "pw".to_owned(),
                    role: Role::Frontdesk,
                },
            )
            .await
            .expect_err("short username rejected locally");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
    }
}
