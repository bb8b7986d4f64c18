//! Shared fixtures for domain service tests.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

use super::account::AccountId;
use super::attestation::{Attestation, AttestationId, AttestationStatus};
use super::request::{RequestId, RequestRecord, RequestStatus};
use super::role::Role;
use super::session::AccessToken;

/// Fixed evaluation instant shared by the fixtures.
pub(crate) fn instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// A clock frozen at [`instant`].
pub(crate) fn frozen_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock { utc_now: instant() })
}

/// A bearer token whose payload claims the given role and account id.
pub(crate) fn token_for(role: Role, account: i64) -> AccessToken {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        serde_json::json!({
            "id": account,
            "username": format!("user-{account}"),
            "role": role.as_wire(),
            "exp": instant().timestamp() + 3_600,
        })
        .to_string(),
    );
    AccessToken::new(format!("{header}.{payload}.sig")).expect("non-empty token")
}

/// A request created `age` before [`instant`].
pub(crate) fn request_record(
    id: i64,
    creator: AccountId,
    age: Duration,
    status: RequestStatus,
) -> RequestRecord {
    RequestRecord {
        id: RequestId(id),
        applicant_name: "ACME SARL".to_owned(),
        national_id: None,
        tax_id: Some("1048576".to_owned()),
        common_enterprise_id: None,
        subject: "tax clearance".to_owned(),
        sector: None,
        email: None,
        phone: None,
        status,
        created_at: instant() - age,
        creator_id: creator,
        agent_id: None,
        processed_at: None,
        rejection_reason: None,
    }
}

/// An attestation created a day before [`instant`].
pub(crate) fn attestation_record(id: i64, status: AttestationStatus) -> Attestation {
    Attestation {
        id: AttestationId(id),
        type_code: "revenu_global".to_owned(),
        status,
        creator_id: AccountId(2),
        created_at: instant() - Duration::days(1),
        updated_at: instant() - Duration::hours(1),
    }
}
