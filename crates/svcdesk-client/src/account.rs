//! # Account panel: profile, contract, deletion, logout
//!
//! Profile and contract live at deployment-specific paths, so both are
//! fetched through the [`EndpointResolver`] over the candidate lists in
//! [`crate::candidates`]. Display values are read through alias lists
//! because the record shapes are not fixed either.
//!
//! ## Failure policy
//!
//! - Profile resolution failure propagates (`ResolutionExhausted`); callers
//!   show a retry affordance.
//! - Contract resolution failure inside [`AccountClient::overview`] does not:
//!   the profile's embedded `client` object is used instead, if any.
//! - Status dictionary loading never fails.
//! - Account deletion stops at the first successful candidate.

use serde::Serialize;
use serde_json::Value;

use crate::candidates;
use crate::config::BearerToken;
use crate::error::ServiceDeskError;
use crate::fields::{Envelope, Field, Step};
use crate::resolver::EndpointResolver;
use crate::status::{record_label, ResourceType, StatusDictionary, StatusMap};

mod profile_fields {
    use super::*;

    pub const ID: Field = Field::defined(&[
        &[Step::Key("id")],
        &[Step::Key("user_id")],
        &[Step::Key("client_id")],
    ]);
    pub const NAME: Field = Field::truthy(&[&[Step::Key("name")], &[Step::Key("full_name")]]);
    pub const EMAIL: Field = Field::truthy(&[&[Step::Key("email")], &[Step::Key("mail")]]);
    pub const PHONE: Field = Field::truthy(&[&[Step::Key("phone")]]);
    pub const IDENTIFICATION_CODE: Field = Field::defined(&[
        &[Step::Key("identification_code")],
        &[Step::Key("identificationCode")],
        &[Step::Key("companyCode")],
        &[Step::Key("company_code")],
        &[Step::Key("tax_number")],
        &[Step::Key("vat")],
        &[Step::Key("tin")],
        &[Step::Key("client"), Step::Key("identification_code")],
        &[Step::Key("client"), Step::Key("identificationCode")],
        &[Step::Key("client"), Step::Key("companyCode")],
        &[Step::Key("company"), Step::Key("identification_code")],
        &[Step::Key("company"), Step::Key("identificationCode")],
        &[Step::Key("company"), Step::Key("code")],
    ]);
    pub const CREATED: Field = Field::truthy(&[
        &[Step::Key("created_at")],
        &[Step::Key("registered_at")],
        &[Step::Key("createdAt")],
    ]);
}

mod contract_fields {
    use super::*;

    pub const CLIENT_NAME: Field = Field::truthy(&[
        &[Step::Key("client"), Step::Key("name")],
        &[Step::Key("client_name")],
        &[Step::Key("name")],
    ]);
    pub const IDENTIFICATION_CODE: Field = Field::defined(&[
        &[Step::Key("client"), Step::Key("identification_code")],
        &[Step::Key("identification_code")],
        &[Step::Key("tax_number")],
        &[Step::Key("vat")],
    ]);
    pub const CLIENT_CODE: Field = Field::defined(&[
        &[Step::Key("client"), Step::Key("code")],
        &[Step::Key("client_id")],
        &[Step::Key("id_code")],
        &[Step::Key("code")],
    ]);
    pub const JURIDICAL_STATUS: Field = Field::truthy(&[
        &[Step::Key("client"), Step::Key("juridical_status")],
        &[Step::Key("juridical_status")],
        &[Step::Key("legal_status")],
    ]);
    pub const SERVICE_NAME: Field = Field::truthy(&[
        &[Step::Key("service_name")],
        &[Step::Key("service_type")],
        &[Step::Key("service")],
        &[Step::Key("category")],
    ]);
    pub const SERVICE_TYPE: Field = Field::truthy(&[
        &[Step::Key("contract_service_type")],
        &[Step::Key("contract_type")],
        &[Step::Key("type")],
    ]);
    pub const CONTRACT_TYPE: Field =
        Field::truthy(&[&[Step::Key("contract_type")], &[Step::Key("type")]]);
    pub const NUMBER: Field =
        Field::defined(&[&[Step::Key("number")], &[Step::Key("contract_number")]]);
    pub const START: Field = Field::truthy(&[
        &[Step::Key("contract_start_date")],
        &[Step::Key("start_date")],
        &[Step::Key("date_from")],
        &[Step::Key("contract_start")],
    ]);
    pub const END: Field = Field::truthy(&[
        &[Step::Key("contract_end_date")],
        &[Step::Key("end_date")],
        &[Step::Key("date_to")],
        &[Step::Key("contract_end")],
    ]);
    pub const CONTACT_NAME: Field = Field::truthy(&[&[Step::Key("contact_name")]]);
    pub const CONTACT_NUMBER: Field = Field::truthy(&[&[Step::Key("contact_number")]]);
    pub const GUARANTEE_START: Field = Field::truthy(&[
        &[Step::Key("guarantee_start_date")],
        &[Step::Key("guarantee_from")],
    ]);
    pub const GUARANTEE_END: Field = Field::truthy(&[
        &[Step::Key("guarantee_end_date")],
        &[Step::Key("guarantee_to")],
    ]);
}

/// Display-ready profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub identification_code: Option<String>,
    pub created: String,
}

impl ProfileView {
    pub fn from_record(profile: &Value) -> Self {
        use profile_fields::*;
        Self {
            id: ID.display(profile),
            name: NAME.display(profile),
            email: EMAIL.display(profile),
            phone: PHONE.text(profile),
            identification_code: IDENTIFICATION_CODE.text(profile),
            created: CREATED.date(profile),
        }
    }
}

/// Display-ready contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractView {
    pub client_name: String,
    pub identification_code: String,
    pub client_code: String,
    pub juridical_status: String,
    pub service_name: String,
    pub service_type: String,
    pub contract_type: String,
    pub number: String,
    pub start: String,
    pub end: String,
    pub status: String,
    pub contact_name: String,
    pub contact_number: String,
    pub guarantee_start: String,
    pub guarantee_end: String,
}

impl ContractView {
    pub fn from_record(contract: &Value, statuses: &StatusMap) -> Self {
        use contract_fields::*;
        Self {
            client_name: CLIENT_NAME.display(contract),
            identification_code: IDENTIFICATION_CODE.display(contract),
            client_code: CLIENT_CODE.display(contract),
            juridical_status: JURIDICAL_STATUS.display(contract),
            service_name: SERVICE_NAME.display(contract),
            service_type: SERVICE_TYPE.display(contract),
            contract_type: CONTRACT_TYPE.display(contract),
            number: NUMBER.display(contract),
            start: START.date(contract),
            end: END.date(contract),
            status: record_label(statuses, contract),
            contact_name: CONTACT_NAME.display(contract),
            contact_number: CONTACT_NUMBER.display(contract),
            guarantee_start: GUARANTEE_START.date(contract),
            guarantee_end: GUARANTEE_END.date(contract),
        }
    }
}

/// Everything the account panel shows.
#[derive(Debug, Clone, Serialize)]
pub struct AccountOverview {
    pub profile: ProfileView,
    pub contract: Option<ContractView>,
}

/// Client for the signed-in user's account.
#[derive(Debug, Clone)]
pub struct AccountClient {
    resolver: EndpointResolver,
    statuses: StatusDictionary,
    base: String,
    token: Option<BearerToken>,
}

impl AccountClient {
    pub(crate) fn new(
        resolver: EndpointResolver,
        statuses: StatusDictionary,
        base: String,
        token: Option<BearerToken>,
    ) -> Self {
        Self {
            resolver,
            statuses,
            base,
            token,
        }
    }

    fn bearer(&self) -> Option<&str> {
        self.token.as_ref().map(BearerToken::as_str)
    }

    /// Fetch the raw profile record.
    pub async fn profile(&self) -> Result<Value, ServiceDeskError> {
        self.resolver
            .resolve(
                "profile",
                &candidates::profile(&self.base),
                self.bearer(),
                Envelope::PROFILE,
            )
            .await
    }

    /// Fetch the raw contract record.
    pub async fn contract(&self) -> Result<Value, ServiceDeskError> {
        self.resolver
            .resolve(
                "contract",
                &candidates::contract(&self.base),
                self.bearer(),
                Envelope::CONTRACT,
            )
            .await
    }

    /// Profile, contract and contract status label for the account panel.
    pub async fn overview(&self) -> Result<AccountOverview, ServiceDeskError> {
        let profile = self.profile().await?;

        let contract = match self.contract().await {
            Ok(contract) if !contract.is_null() => Some(contract),
            Ok(_) => profile.get("client").filter(|c| c.is_object()).cloned(),
            Err(e) => {
                tracing::warn!("contract unavailable, falling back to profile client: {e}");
                profile.get("client").filter(|c| c.is_object()).cloned()
            }
        };

        let statuses = self
            .statuses
            .load(&self.base, self.bearer(), Some(ResourceType::Services))
            .await;

        Ok(AccountOverview {
            profile: ProfileView::from_record(&profile),
            contract: contract.map(|c| ContractView::from_record(&c, &statuses)),
        })
    }

    /// Permanently delete the signed-in account.
    ///
    /// Candidates are tried one at a time; the first success ends the
    /// resolution so no second destructive request is ever sent.
    pub async fn delete_account(&self) -> Result<(), ServiceDeskError> {
        self.resolver
            .resolve(
                "account deletion",
                &candidates::delete_account(&self.base),
                self.bearer(),
                Envelope::RAW,
            )
            .await?;
        tracing::info!("account deleted");
        Ok(())
    }

    /// Best-effort server-side logout. Failures are logged, never returned.
    pub async fn logout(&self) {
        let request = candidates::logout(&self.base);
        let outcome = self.resolver.probe(&request, self.bearer()).await;
        tracing::debug!(?outcome, "logout");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn profile_view_reads_aliases() {
        let view = ProfileView::from_record(&json!({
            "user_id": 42,
            "full_name": "Giorgi Maisuradze",
            "mail": "g@example.ge",
            "company": {"code": "205001234"},
            "registered_at": "2023-11-02T08:00:00Z"
        }));
        assert_eq!(view.id, "42");
        assert_eq!(view.name, "Giorgi Maisuradze");
        assert_eq!(view.email, "g@example.ge");
        assert_eq!(view.phone, None);
        assert_eq!(view.identification_code.as_deref(), Some("205001234"));
        assert_eq!(view.created, "2023-11-02");
    }

    #[test]
    fn empty_profile_renders_placeholders() {
        let view = ProfileView::from_record(&json!({}));
        assert_eq!(view.id, "—");
        assert_eq!(view.name, "—");
        assert_eq!(view.created, "—");
        assert_eq!(view.identification_code, None);
    }

    #[test]
    fn contract_view_labels_status_through_dictionary() {
        let contract = json!({
            "client": {"name": "Acme", "identification_code": "123"},
            "contract_type": "annual",
            "contract_number": "C-77",
            "start_date": "2024-01-01",
            "status": 2
        });
        let view = ContractView::from_record(&contract, &StatusMap::defaults());
        assert_eq!(view.client_name, "Acme");
        assert_eq!(view.identification_code, "123");
        assert_eq!(view.service_type, "annual");
        assert_eq!(view.number, "C-77");
        assert_eq!(view.start, "2024-01-01");
        assert_eq!(view.end, "—");
        assert_eq!(view.status, "მიმდინარეობს შესრულება");
    }
}
