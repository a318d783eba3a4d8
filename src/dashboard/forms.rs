//! Form Handlers
//!
//! Typed records for every dashboard form. Each form validates its own
//! fields, renders itself back with the user's input, and turns a valid
//! submission into one or two Manila calls.

use crate::api::manila::ManilaClient;
use crate::api::params::{
    QuotaUpdate, SecurityServiceCreate, ShareCreate, ShareNetworkCreate, ShareUpdate,
    SnapshotCreate,
};
use crate::dashboard::extra_specs::{format_extra_specs, parse_str_meta, MAX_META_LENGTH};
use crate::dashboard::messages::Messages;
use crate::dashboard::pages::{FormField, FormView};
use crate::domain::models::{Limit, QuotaSet, SecurityServiceType, Share, VolumeType};
use crate::domain::ports::{NetworkDirectory, TenantDirectory};
use crate::error::{Error, ErrorKind};
use crate::metrics::{OUTCOME_ERROR, OUTCOME_INVALID, OUTCOME_SUCCESS};
use serde::Deserialize;
use tracing::{error, info, warn};

/// Longest DNS IP accepted by the security service form
pub const MAX_DNS_IP_LENGTH: usize = 15;

/// Share protocols offered by the create share form
pub const SHARE_PROTOCOLS: [&str; 2] = ["NFS", "CIFS"];

/// Select choices as `(value, label)` pairs
pub type Choices = Vec<(String, String)>;

// =============================================================================
// Outcomes
// =============================================================================

/// A validation failure, bound to a field or to the whole form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            field: field.map(str::to_string),
            message: message.into(),
        }
    }
}

impl From<Error> for FieldError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation { field, message } => Self { field, message },
            other => Self {
                field: None,
                message: other.to_string(),
            },
        }
    }
}

/// Result of handling one form submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Redirect with a success flash
    Success { message: String, redirect: String },
    /// Re-render the form with the input preserved
    Invalid { errors: Vec<FieldError> },
    /// Redirect with a generic error flash
    Failed { message: String, redirect: String },
}

impl FormOutcome {
    fn success(message: impl Into<String>, redirect: impl Into<String>) -> Self {
        FormOutcome::Success {
            message: message.into(),
            redirect: redirect.into(),
        }
    }

    /// Classify a handler error by kind
    ///
    /// Validation errors keep the dialog; everything else is logged and
    /// reported with the single `failure` message.
    fn from_error(err: Error, failure: impl Into<String>, redirect: impl Into<String>) -> Self {
        let failure = failure.into();
        match err.kind() {
            ErrorKind::Validation => FormOutcome::Invalid {
                errors: vec![err.into()],
            },
            ErrorKind::ServiceUnavailable => {
                warn!("{} {}", failure, err);
                FormOutcome::Failed {
                    message: failure,
                    redirect: redirect.into(),
                }
            }
            ErrorKind::Remote => {
                error!("{} {}", failure, err);
                FormOutcome::Failed {
                    message: failure,
                    redirect: redirect.into(),
                }
            }
        }
    }

    /// Outcome label for the form submission counter
    pub fn metric_outcome(&self) -> &'static str {
        match self {
            FormOutcome::Success { .. } => OUTCOME_SUCCESS,
            FormOutcome::Invalid { .. } => OUTCOME_INVALID,
            FormOutcome::Failed { .. } => OUTCOME_ERROR,
        }
    }

    /// Flash messages and target of a redirecting outcome, or the
    /// validation errors of an invalid one
    pub fn into_redirect(self) -> Result<(Messages, String), Vec<FieldError>> {
        let mut messages = Messages::new();
        match self {
            FormOutcome::Success { message, redirect } => {
                messages.success(message);
                Ok((messages, redirect))
            }
            FormOutcome::Failed { message, redirect } => {
                messages.error(message);
                Ok((messages, redirect))
            }
            FormOutcome::Invalid { errors } => Err(errors),
        }
    }
}

/// Attach validation errors to a rendered form
pub fn apply_errors(form: &mut FormView, errors: &[FieldError]) {
    for err in errors {
        form.set_error(err.field.as_deref(), &err.message);
    }
}

// =============================================================================
// Field Validation
// =============================================================================

#[derive(Default)]
struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    fn push(&mut self, field: Option<&str>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    fn has_error(&self, field: &str) -> bool {
        self.errors
            .iter()
            .any(|e| e.field.as_deref() == Some(field))
    }

    /// Trimmed text, checked for presence and length
    fn text(&mut self, field: &str, value: &str, max: usize, required: bool) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            if required {
                self.push(Some(field), "This field is required.");
            }
            return None;
        }
        let length = value.chars().count();
        if length > max {
            self.push(
                Some(field),
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max, length
                ),
            );
            return None;
        }
        Some(value.to_string())
    }

    /// Value that must be one of the offered choices
    fn choice(&mut self, field: &str, value: &str, choices: &[(String, String)]) -> Option<String> {
        let value = self.text(field, value, MAX_META_LENGTH, true)?;
        if choices.iter().any(|(v, _)| *v == value) {
            Some(value)
        } else {
            self.push(
                Some(field),
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    value
                ),
            );
            None
        }
    }

    /// Whole number no lower than `min`
    fn integer(&mut self, field: &str, value: &str, min: i64, required: bool) -> Option<i64> {
        let value = value.trim();
        if value.is_empty() {
            if required {
                self.push(Some(field), "This field is required.");
            }
            return None;
        }
        match value.parse::<i64>() {
            Ok(n) if n >= min => Some(n),
            Ok(_) => {
                self.push(
                    Some(field),
                    format!("Ensure this value is greater than or equal to {}.", min),
                );
                None
            }
            Err(_) => {
                self.push(Some(field), "Enter a whole number.");
                None
            }
        }
    }

    fn finish<T>(self, value: T) -> Result<T, Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}

fn checked(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("on" | "true" | "1"))
}

// =============================================================================
// Shares
// =============================================================================

/// Choices offered by the create share form
#[derive(Debug, Clone, Default)]
pub struct ShareFormChoices {
    pub share_networks: Choices,
    pub snapshots: Choices,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateShareForm {
    pub name: String,
    pub description: String,
    pub size: String,
    pub share_proto: String,
    pub snapshot_id: String,
    pub share_network_id: String,
    pub metadata: String,
}

impl CreateShareForm {
    pub const NAME: &'static str = "create_share";

    /// Initial input, optionally preselecting the source snapshot
    pub fn initial(snapshot_id: Option<&str>) -> Self {
        Self {
            size: "1".to_string(),
            share_proto: SHARE_PROTOCOLS[0].to_string(),
            snapshot_id: snapshot_id.unwrap_or_default().to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<ShareCreate, Vec<FieldError>> {
        let mut v = Validator::default();
        let protocols: Choices = SHARE_PROTOCOLS
            .iter()
            .map(|p| (p.to_string(), p.to_string()))
            .collect();

        let name = v.text("name", &self.name, MAX_META_LENGTH, false);
        let description = v.text("description", &self.description, MAX_META_LENGTH, false);
        let size = v.integer("size", &self.size, 1, true);
        let share_proto = v.choice("share_proto", &self.share_proto, &protocols);
        let snapshot_id = v.text("snapshot_id", &self.snapshot_id, MAX_META_LENGTH, false);
        let share_network_id =
            v.text("share_network_id", &self.share_network_id, MAX_META_LENGTH, false);

        let metadata = match parse_str_meta(&self.metadata) {
            Ok(update) if update.unset.is_empty() => update.set,
            Ok(_) => {
                v.push(Some("metadata"), "Expected only pairs of key=value.");
                Default::default()
            }
            Err(e) => {
                let mut err = FieldError::from(e);
                err.field = Some("metadata".to_string());
                v.errors.push(err);
                Default::default()
            }
        };

        let params = ShareCreate {
            share_proto: share_proto.unwrap_or_default(),
            size: size.unwrap_or(1) as u64,
            name,
            description,
            snapshot_id,
            share_network_id,
            metadata,
        };
        v.finish(params)
    }

    pub fn view(&self, choices: &ShareFormChoices) -> FormView {
        let protocols = SHARE_PROTOCOLS
            .iter()
            .map(|p| (p.to_string(), p.to_string()))
            .collect();

        FormView::new("/create/share", "Create Share", "/").with_fields(vec![
            FormField::text("name", "Share Name", &self.name).optional(),
            FormField::textarea("description", "Description", &self.description).optional(),
            FormField::select("share_proto", "Share Protocol", &self.share_proto, protocols),
            FormField::number("size", "Size (GiB)", &self.size),
            FormField::select(
                "share_network_id",
                "Share Network",
                &self.share_network_id,
                choices.share_networks.clone(),
            )
            .optional(),
            FormField::select(
                "snapshot_id",
                "Source Snapshot",
                &self.snapshot_id,
                choices.snapshots.clone(),
            )
            .optional(),
            FormField::textarea("metadata", "Metadata", &self.metadata).optional(),
        ])
    }

    pub async fn handle(&self, manila: &ManilaClient) -> FormOutcome {
        let params = match self.validate() {
            Ok(params) => params,
            Err(errors) => return FormOutcome::Invalid { errors },
        };

        match manila.share_create(&params).await {
            Ok(share) => {
                info!("Created share {}", share.id);
                FormOutcome::success(format!("Creating share \"{}\"", self.name.trim()), "/")
            }
            Err(e) => FormOutcome::from_error(e, "Unable to create share.", "/"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateShareForm {
    pub name: String,
    pub description: String,
}

impl UpdateShareForm {
    pub const NAME: &'static str = "update_share";

    pub fn from_share(share: &Share) -> Self {
        Self {
            name: share.name.clone().unwrap_or_default(),
            description: share.description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<ShareUpdate, Vec<FieldError>> {
        let mut v = Validator::default();
        let name = v.text("name", &self.name, MAX_META_LENGTH, false);
        let description = v.text("description", &self.description, MAX_META_LENGTH, false);
        v.finish(ShareUpdate {
            display_name: name.unwrap_or_default(),
            display_description: description.unwrap_or_default(),
        })
    }

    pub fn view(&self, share_id: &str) -> FormView {
        let action = format!("/shares/{}/update", urlencoding::encode(share_id));
        FormView::new(action, "Edit Share", "/").with_fields(vec![
            FormField::text("name", "Share Name", &self.name).optional(),
            FormField::textarea("description", "Description", &self.description).optional(),
        ])
    }

    pub async fn handle(&self, manila: &ManilaClient, share_id: &str) -> FormOutcome {
        let params = match self.validate() {
            Ok(params) => params,
            Err(errors) => return FormOutcome::Invalid { errors },
        };

        match manila.share_update(share_id, &params).await {
            Ok(_) => {
                let name = match params.display_name.as_str() {
                    "" => share_id,
                    name => name,
                };
                FormOutcome::success(format!("Updating share \"{}\"", name), "/")
            }
            Err(e) => FormOutcome::from_error(e, "Unable to update share.", "/"),
        }
    }
}

// =============================================================================
// Snapshots
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateSnapshotForm {
    pub share_id: String,
    pub name: String,
    pub description: String,
    pub force: Option<String>,
}

impl CreateSnapshotForm {
    pub const NAME: &'static str = "create_snapshot";
    const REDIRECT: &'static str = "/?tab=snapshots";

    pub fn initial(share_id: Option<&str>) -> Self {
        Self {
            share_id: share_id.unwrap_or_default().to_string(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<SnapshotCreate, Vec<FieldError>> {
        let mut v = Validator::default();
        let share_id = v.text("share_id", &self.share_id, MAX_META_LENGTH, true);
        let name = v.text("name", &self.name, MAX_META_LENGTH, false);
        let description = v.text("description", &self.description, MAX_META_LENGTH, false);
        v.finish(SnapshotCreate {
            share_id: share_id.unwrap_or_default(),
            force: checked(&self.force),
            name,
            description,
        })
    }

    pub fn view(&self, shares: &Choices) -> FormView {
        FormView::new("/create/snapshot", "Create Share Snapshot", Self::REDIRECT).with_fields(vec![
            FormField::select("share_id", "Share", &self.share_id, shares.clone()),
            FormField::text("name", "Snapshot Name", &self.name).optional(),
            FormField::textarea("description", "Description", &self.description).optional(),
            FormField::checkbox("force", "Force", checked(&self.force)),
        ])
    }

    pub async fn handle(&self, manila: &ManilaClient) -> FormOutcome {
        let params = match self.validate() {
            Ok(params) => params,
            Err(errors) => return FormOutcome::Invalid { errors },
        };

        match manila.share_snapshot_create(&params).await {
            Ok(_) => FormOutcome::success(
                format!("Creating snapshot \"{}\"", self.name.trim()),
                Self::REDIRECT,
            ),
            Err(e) => FormOutcome::from_error(e, "Unable to create snapshot.", Self::REDIRECT),
        }
    }
}

// =============================================================================
// Share Networks
// =============================================================================

/// Neutron and Keystone choices offered by the share network form
#[derive(Debug, Clone, Default)]
pub struct ShareNetworkChoices {
    pub networks: Choices,
    pub subnets: Choices,
    pub projects: Choices,
}

impl ShareNetworkChoices {
    /// Gather choices from the lookup services
    ///
    /// A failed lookup leaves its select empty and queues a warning.
    pub async fn load(
        networks: Option<&dyn NetworkDirectory>,
        tenants: Option<&dyn TenantDirectory>,
        messages: &mut Messages,
    ) -> Self {
        let mut choices = Self::default();

        if let Some(directory) = networks {
            match directory.network_list().await {
                Ok(list) => {
                    choices.networks = list
                        .iter()
                        .map(|n| (n.id.clone(), n.name_or_id().to_string()))
                        .collect()
                }
                Err(e) => {
                    warn!("Unable to retrieve networks: {}", e);
                    messages.warning("Unable to retrieve network list.");
                }
            }
            match directory.subnet_list().await {
                Ok(list) => {
                    choices.subnets = list
                        .iter()
                        .map(|s| (s.id.clone(), s.name_or_id().to_string()))
                        .collect()
                }
                Err(e) => {
                    warn!("Unable to retrieve subnets: {}", e);
                    messages.warning("Unable to retrieve subnet list.");
                }
            }
        }

        if let Some(directory) = tenants {
            match directory.tenant_list().await {
                Ok((list, _)) => {
                    choices.projects = list.into_iter().map(|t| (t.id, t.name)).collect()
                }
                Err(e) => {
                    warn!("Unable to retrieve projects: {}", e);
                    messages.warning("Unable to retrieve project list.");
                }
            }
        }

        choices
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateShareNetworkForm {
    pub name: String,
    pub neutron_net_id: String,
    pub neutron_subnet_id: String,
    pub project: String,
    pub description: String,
}

impl CreateShareNetworkForm {
    pub const NAME: &'static str = "create_share_network";
    const REDIRECT: &'static str = "/?tab=share_networks";

    /// Validate against the offered choices
    ///
    /// The project is only checked; the create call does not take it.
    pub fn validate(&self, choices: &ShareNetworkChoices) -> Result<ShareNetworkCreate, Vec<FieldError>> {
        let mut v = Validator::default();
        let name = v.text("name", &self.name, MAX_META_LENGTH, true);
        let neutron_net_id = v.choice("neutron_net_id", &self.neutron_net_id, &choices.networks);
        let neutron_subnet_id =
            v.choice("neutron_subnet_id", &self.neutron_subnet_id, &choices.subnets);
        v.choice("project", &self.project, &choices.projects);
        let description = v.text("description", &self.description, MAX_META_LENGTH, false);

        v.finish(ShareNetworkCreate {
            neutron_net_id,
            neutron_subnet_id,
            name,
            description,
        })
    }

    pub fn view(&self, choices: &ShareNetworkChoices) -> FormView {
        FormView::new("/create/share_network", "Create", Self::REDIRECT).with_fields(vec![
            FormField::text("name", "Name", &self.name),
            FormField::select(
                "neutron_net_id",
                "Neutron Net ID",
                &self.neutron_net_id,
                choices.networks.clone(),
            ),
            FormField::select(
                "neutron_subnet_id",
                "Neutron Subnet ID",
                &self.neutron_subnet_id,
                choices.subnets.clone(),
            ),
            FormField::select("project", "Project", &self.project, choices.projects.clone()),
            FormField::textarea("description", "Description", &self.description).optional(),
        ])
    }

    pub async fn handle(&self, manila: &ManilaClient, choices: &ShareNetworkChoices) -> FormOutcome {
        let params = match self.validate(choices) {
            Ok(params) => params,
            Err(errors) => return FormOutcome::Invalid { errors },
        };

        match manila.share_network_create(&params).await {
            Ok(_) => FormOutcome::success(
                format!("Successfully created share network: {}", self.name.trim()),
                Self::REDIRECT,
            ),
            Err(e) => FormOutcome::from_error(e, "Unable to create share network.", Self::REDIRECT),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AddSecurityServiceForm {
    pub security_service_id: String,
}

impl AddSecurityServiceForm {
    pub const NAME: &'static str = "add_security_service";

    pub fn view(&self, share_network_id: &str, security_services: &Choices) -> FormView {
        let action = format!(
            "/share_networks/{}/security_services",
            urlencoding::encode(share_network_id)
        );
        FormView::new(action, "Add Security Service", "").with_fields(vec![FormField::select(
            "security_service_id",
            "Security Service",
            &self.security_service_id,
            security_services.clone(),
        )])
    }

    pub async fn handle(
        &self,
        manila: &ManilaClient,
        share_network_id: &str,
        share_network_name: &str,
    ) -> FormOutcome {
        let redirect = format!("/share_networks/{}", urlencoding::encode(share_network_id));
        let mut v = Validator::default();
        let security_service_id =
            match v.text("security_service_id", &self.security_service_id, MAX_META_LENGTH, true) {
                Some(id) => id,
                None => return FormOutcome::Invalid { errors: v.errors },
            };

        match manila
            .share_network_security_service_add(share_network_id, &security_service_id)
            .await
        {
            Ok(_) => FormOutcome::success(
                format!(
                    "Added security service to share network \"{}\"",
                    share_network_name
                ),
                redirect,
            ),
            Err(e) => FormOutcome::from_error(
                e,
                "Unable to add security service to share network.",
                redirect,
            ),
        }
    }
}

// =============================================================================
// Security Services
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateSecurityServiceForm {
    pub name: String,
    pub dns_ip: String,
    pub server: String,
    pub domain: String,
    pub user: String,
    pub password: String,
    #[serde(rename = "type")]
    pub service_type: String,
    pub description: String,
}

impl CreateSecurityServiceForm {
    pub const NAME: &'static str = "create_security_service";
    const REDIRECT: &'static str = "/?tab=security_services";

    fn type_choices() -> Choices {
        SecurityServiceType::ALL
            .iter()
            .map(|t| (t.as_str().to_string(), t.label().to_string()))
            .collect()
    }

    pub fn validate(&self) -> Result<SecurityServiceCreate, Vec<FieldError>> {
        let mut v = Validator::default();
        let name = v.text("name", &self.name, MAX_META_LENGTH, true);
        let dns_ip = v.text("dns_ip", &self.dns_ip, MAX_DNS_IP_LENGTH, true);
        let server = v.text("server", &self.server, MAX_META_LENGTH, true);
        let domain = v.text("domain", &self.domain, MAX_META_LENGTH, true);
        let sid = v.text("user", &self.user, MAX_META_LENGTH, true);
        let password = v.text("password", &self.password, MAX_META_LENGTH, true);
        let service_type = v
            .choice("type", &self.service_type, &Self::type_choices())
            .and_then(|t| SecurityServiceType::parse(&t));
        let description = v.text("description", &self.description, MAX_META_LENGTH, false);

        if v.has_error("type") {
            return Err(v.errors);
        }
        let service_type = match service_type {
            Some(t) => t,
            None => {
                v.push(Some("type"), "This field is required.");
                return Err(v.errors);
            }
        };

        v.finish(SecurityServiceCreate {
            service_type,
            dns_ip,
            server,
            domain,
            sid,
            password,
            name,
            description,
        })
    }

    pub fn view(&self) -> FormView {
        FormView::new("/create/security_service", "Create", Self::REDIRECT).with_fields(vec![
            FormField::text("name", "Name", &self.name),
            FormField::text("dns_ip", "DNS IP", &self.dns_ip),
            FormField::text("server", "Server", &self.server),
            FormField::text("domain", "Domain", &self.domain),
            FormField::text("user", "User", &self.user),
            FormField::password("password", "Password"),
            FormField::select("type", "Type", &self.service_type, Self::type_choices()),
            FormField::textarea("description", "Description", &self.description).optional(),
        ])
    }

    pub async fn handle(&self, manila: &ManilaClient) -> FormOutcome {
        let params = match self.validate() {
            Ok(params) => params,
            Err(errors) => return FormOutcome::Invalid { errors },
        };

        match manila.security_service_create(&params).await {
            Ok(_) => FormOutcome::success(
                format!("Successfully created security service: {}", self.name.trim()),
                Self::REDIRECT,
            ),
            Err(e) => {
                FormOutcome::from_error(e, "Unable to create security service.", Self::REDIRECT)
            }
        }
    }
}

// =============================================================================
// Volume Types
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateVolumeTypeForm {
    pub name: String,
    pub extra_specs: String,
}

impl CreateVolumeTypeForm {
    pub const NAME: &'static str = "create_volume_type";
    const REDIRECT: &'static str = "/?tab=volume_types";

    pub fn view(&self) -> FormView {
        FormView::new("/create/volume_type", "Create Volume Type", Self::REDIRECT).with_fields(vec![
            FormField::text("name", "Name", &self.name),
            FormField::textarea("extra_specs", "Extra specs", &self.extra_specs).optional(),
        ])
    }

    /// Create the type, then set its extra specs
    ///
    /// Unset keys are rejected before any remote call. The two calls are
    /// independent: a failed second call leaves the type in place.
    pub async fn handle(&self, manila: &ManilaClient) -> FormOutcome {
        let mut v = Validator::default();
        let name = v.text("name", &self.name, MAX_META_LENGTH, true);
        if !v.errors.is_empty() {
            return FormOutcome::Invalid { errors: v.errors };
        }
        let name = name.unwrap_or_default();

        let result: Result<VolumeType, Error> = async {
            let update = parse_str_meta(&self.extra_specs)?;
            if !update.unset.is_empty() {
                return Err(Error::invalid("Expected only pairs of key=value."));
            }

            let volume_type = manila.volume_type_create(&name).await?;
            if !update.set.is_empty() {
                manila
                    .volume_type_set_extra_specs(&volume_type.id, &update.set)
                    .await?;
            }
            Ok(volume_type)
        }
        .await;

        match result {
            Ok(volume_type) => FormOutcome::success(
                format!("Successfully created volume type: {}", volume_type.name),
                Self::REDIRECT,
            ),
            Err(e) => FormOutcome::from_error(e, "Unable to create volume type.", Self::REDIRECT),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateVolumeTypeForm {
    pub extra_specs: String,
}

impl UpdateVolumeTypeForm {
    pub const NAME: &'static str = "update_volume_type";
    const REDIRECT: &'static str = "/?tab=volume_types";

    /// Current specs rendered one `key=value` per line
    pub fn from_volume_type(volume_type: &VolumeType) -> Self {
        Self {
            extra_specs: format_extra_specs(&volume_type.extra_specs),
        }
    }

    pub fn view(&self, volume_type_id: &str) -> FormView {
        let action = format!(
            "/volume_types/{}/extra_specs",
            urlencoding::encode(volume_type_id)
        );
        FormView::new(action, "Update", Self::REDIRECT).with_fields(vec![FormField::textarea(
            "extra_specs",
            "Extra specs",
            &self.extra_specs,
        )
        .optional()])
    }

    /// Set new pairs, then unset the bare keys that are currently present
    pub async fn handle(
        &self,
        manila: &ManilaClient,
        volume_type_id: &str,
        volume_type_name: &str,
    ) -> FormOutcome {
        let result: Result<(), Error> = async {
            let update = parse_str_meta(&self.extra_specs)?;
            if !update.set.is_empty() {
                manila
                    .volume_type_set_extra_specs(volume_type_id, &update.set)
                    .await?;
            }
            if !update.unset.is_empty() {
                let current = manila.volume_type_get_extra_specs(volume_type_id).await?;
                for key in update.unset.iter().filter(|k| current.contains_key(*k)) {
                    manila.volume_type_unset_extra_specs(volume_type_id, key).await?;
                }
            }
            Ok(())
        }
        .await;

        match result {
            Ok(()) => FormOutcome::success(
                format!(
                    "Successfully updated extra specs for volume type '{}'.",
                    volume_type_name
                ),
                Self::REDIRECT,
            ),
            Err(e) => FormOutcome::from_error(
                e,
                "Unable to update extra_specs for volume type.",
                Self::REDIRECT,
            ),
        }
    }
}

// =============================================================================
// Quotas
// =============================================================================

/// Which quota set a quota form updates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaScope {
    Tenant(String),
    /// Default quota class, viewed through a tenant
    Default(String),
}

impl QuotaScope {
    pub fn action(&self) -> String {
        match self {
            QuotaScope::Tenant(tenant_id) => format!("/quotas/{}", urlencoding::encode(tenant_id)),
            QuotaScope::Default(tenant_id) => {
                format!("/default_quotas?tenant_id={}", urlencoding::encode(tenant_id))
            }
        }
    }

    pub fn form_name(&self) -> &'static str {
        match self {
            QuotaScope::Tenant(_) => "update_quota",
            QuotaScope::Default(_) => "update_default_quota",
        }
    }
}

/// Resource names edited by the quota forms
pub const QUOTA_FIELDS: [(&str, &str); 5] = [
    ("shares", "Shares"),
    ("snapshots", "Snapshots"),
    ("gigabytes", "Gigabytes"),
    ("snapshot_gigabytes", "Snapshot Gigabytes"),
    ("share_networks", "Share Networks"),
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QuotaForm {
    pub shares: String,
    pub snapshots: String,
    pub gigabytes: String,
    pub snapshot_gigabytes: String,
    pub share_networks: String,
}

impl QuotaForm {
    pub fn from_quota_set(quotas: &QuotaSet) -> Self {
        let raw = |name: &str| {
            quotas
                .get(name)
                .map(|l| l.to_raw().to_string())
                .unwrap_or_default()
        };
        Self {
            shares: raw("shares"),
            snapshots: raw("snapshots"),
            gigabytes: raw("gigabytes"),
            snapshot_gigabytes: raw("snapshot_gigabytes"),
            share_networks: raw("share_networks"),
        }
    }

    fn value(&self, name: &str) -> &str {
        match name {
            "shares" => &self.shares,
            "snapshots" => &self.snapshots,
            "gigabytes" => &self.gigabytes,
            "snapshot_gigabytes" => &self.snapshot_gigabytes,
            "share_networks" => &self.share_networks,
            _ => "",
        }
    }

    /// Integers of at least `-1`; blank fields are left unchanged
    pub fn validate(&self) -> Result<QuotaUpdate, Vec<FieldError>> {
        let mut v = Validator::default();
        let mut limit = |name: &str| {
            v.integer(name, self.value(name), Limit::UNLIMITED_SENTINEL, false)
                .map(Limit::from_raw)
        };
        let update = QuotaUpdate {
            shares: limit("shares"),
            snapshots: limit("snapshots"),
            gigabytes: limit("gigabytes"),
            snapshot_gigabytes: limit("snapshot_gigabytes"),
            share_networks: limit("share_networks"),
        };
        v.finish(update)
    }

    pub fn view(&self, scope: &QuotaScope) -> FormView {
        let fields = QUOTA_FIELDS
            .iter()
            .map(|(name, label)| FormField::number(name, label, self.value(name)).optional())
            .collect();
        FormView::new(scope.action(), "Save", "/?tab=limits").with_fields(fields)
    }

    pub async fn handle(&self, manila: &ManilaClient, scope: &QuotaScope) -> FormOutcome {
        let params = match self.validate() {
            Ok(params) => params,
            Err(errors) => return FormOutcome::Invalid { errors },
        };

        let redirect = scope.action();
        let result = match scope {
            QuotaScope::Tenant(tenant_id) => manila
                .tenant_quota_update(tenant_id, &params)
                .await
                .map(|_| "Successfully updated quotas."),
            QuotaScope::Default(_) => manila
                .default_quota_update(&params)
                .await
                .map(|_| "Successfully updated default quotas."),
        };

        match result {
            Ok(message) => FormOutcome::success(message, redirect),
            Err(e) => FormOutcome::from_error(e, "Unable to update quotas.", redirect),
        }
    }
}

// =============================================================================
// Delete Actions
// =============================================================================

/// Resources that can be deleted from the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Share,
    Snapshot,
    ShareNetwork,
    SecurityService,
    VolumeType,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::Share => "share",
            ResourceKind::Snapshot => "snapshot",
            ResourceKind::ShareNetwork => "share network",
            ResourceKind::SecurityService => "security service",
            ResourceKind::VolumeType => "volume type",
        }
    }

    /// Index tab listing this kind
    pub fn tab(&self) -> &'static str {
        match self {
            ResourceKind::Share => "shares",
            ResourceKind::Snapshot => "snapshots",
            ResourceKind::ShareNetwork => "share_networks",
            ResourceKind::SecurityService => "security_services",
            ResourceKind::VolumeType => "volume_types",
        }
    }

    pub fn form_name(&self) -> &'static str {
        match self {
            ResourceKind::Share => "delete_share",
            ResourceKind::Snapshot => "delete_snapshot",
            ResourceKind::ShareNetwork => "delete_share_network",
            ResourceKind::SecurityService => "delete_security_service",
            ResourceKind::VolumeType => "delete_volume_type",
        }
    }
}

/// Display name passed along with a delete or remove action
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ActionQuery {
    pub name: Option<String>,
}

impl ActionQuery {
    pub fn name_or<'a>(&'a self, id: &'a str) -> &'a str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or(id)
    }
}

/// Delete one resource and report it by name
pub async fn delete_resource(
    manila: &ManilaClient,
    kind: ResourceKind,
    id: &str,
    name: &str,
) -> FormOutcome {
    let redirect = format!("/?tab={}", kind.tab());
    let result = match kind {
        ResourceKind::Share => manila.share_delete(id).await,
        ResourceKind::Snapshot => manila.share_snapshot_delete(id).await,
        ResourceKind::ShareNetwork => manila.share_network_delete(id).await,
        ResourceKind::SecurityService => manila.security_service_delete(id).await,
        ResourceKind::VolumeType => manila.volume_type_delete(id).await,
    };

    match result {
        Ok(()) => FormOutcome::success(
            format!("Scheduled deletion of {}: {}", kind.label(), name),
            redirect,
        ),
        Err(e) => FormOutcome::from_error(
            e,
            format!("Unable to delete {}: {}", kind.label(), name),
            redirect,
        ),
    }
}

pub const REMOVE_SECURITY_SERVICE: &str = "remove_security_service";

/// Detach a security service from a share network
pub async fn remove_security_service(
    manila: &ManilaClient,
    share_network_id: &str,
    security_service_id: &str,
    name: &str,
) -> FormOutcome {
    let redirect = format!("/share_networks/{}", urlencoding::encode(share_network_id));
    match manila
        .share_network_security_service_remove(share_network_id, security_service_id)
        .await
    {
        Ok(_) => FormOutcome::success(
            format!("Scheduled removal of security service: {}", name),
            redirect,
        ),
        Err(e) => FormOutcome::from_error(
            e,
            format!("Unable to remove security service: {}", name),
            redirect,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn fields(errors: &[FieldError]) -> Vec<Option<&str>> {
        errors.iter().map(|e| e.field.as_deref()).collect()
    }

    #[test]
    fn test_create_share_validation() {
        let form = CreateShareForm {
            name: "demo".into(),
            size: "0".into(),
            share_proto: "SMB".into(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(fields(&errors), vec![Some("size"), Some("share_proto")]);
        assert_eq!(
            errors[0].message,
            "Ensure this value is greater than or equal to 1."
        );
    }

    #[test]
    fn test_create_share_params() {
        let form = CreateShareForm {
            name: " demo ".into(),
            size: "10".into(),
            share_proto: "CIFS".into(),
            metadata: "tier=gold".into(),
            ..Default::default()
        };
        let params = form.validate().unwrap();
        assert_eq!(params.name.as_deref(), Some("demo"));
        assert_eq!(params.size, 10);
        assert_eq!(params.share_proto, "CIFS");
        assert_eq!(params.snapshot_id, None);
        assert_eq!(params.metadata.get("tier").map(String::as_str), Some("gold"));
    }

    #[test]
    fn test_create_share_rejects_unset_metadata() {
        let form = CreateShareForm {
            metadata: "tier".into(),
            ..CreateShareForm::initial(None)
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors[0].field.as_deref(), Some("metadata"));
        assert_eq!(errors[0].message, "Expected only pairs of key=value.");
    }

    #[test]
    fn test_security_service_dns_ip_length() {
        let form = CreateSecurityServiceForm {
            name: "ad".into(),
            dns_ip: "1234567890123456".into(),
            server: "srv".into(),
            domain: "example.org".into(),
            user: "admin".into(),
            password: "secret".into(),
            service_type: "active_directory".into(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(fields(&errors), vec![Some("dns_ip")]);
        assert_eq!(
            errors[0].message,
            "Ensure this value has at most 15 characters (it has 16)."
        );

        let form = CreateSecurityServiceForm {
            dns_ip: "10.0.0.1".into(),
            ..form
        };
        let params = form.validate().unwrap();
        assert_eq!(params.service_type, SecurityServiceType::ActiveDirectory);
        assert_eq!(params.sid.as_deref(), Some("admin"));
    }

    #[test]
    fn test_security_service_requires_type() {
        let form = CreateSecurityServiceForm {
            service_type: "nis".into(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.field.as_deref() == Some("type") && e.message.contains("nis")));
    }

    #[test]
    fn test_share_network_choices() {
        let choices = ShareNetworkChoices {
            networks: vec![("net-1".into(), "private".into())],
            subnets: vec![("sub-1".into(), "private-subnet".into())],
            projects: vec![("t1".into(), "demo".into())],
        };
        let form = CreateShareNetworkForm {
            name: "sn".into(),
            neutron_net_id: "net-1".into(),
            neutron_subnet_id: "sub-9".into(),
            project: "t1".into(),
            description: String::new(),
        };
        let errors = form.validate(&choices).unwrap_err();
        assert_eq!(fields(&errors), vec![Some("neutron_subnet_id")]);

        let form = CreateShareNetworkForm {
            neutron_subnet_id: "sub-1".into(),
            ..form
        };
        let params = form.validate(&choices).unwrap();
        assert_eq!(params.neutron_net_id.as_deref(), Some("net-1"));
        assert_eq!(params.description, None);
    }

    #[test]
    fn test_quota_form() {
        let form = QuotaForm {
            shares: "-1".into(),
            gigabytes: "1000".into(),
            snapshots: "-2".into(),
            share_networks: "x".into(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(fields(&errors), vec![Some("snapshots"), Some("share_networks")]);

        let form = QuotaForm {
            snapshots: String::new(),
            share_networks: String::new(),
            ..form
        };
        let update = form.validate().unwrap();
        assert_eq!(update.shares, Some(Limit::Unlimited));
        assert_eq!(update.gigabytes, Some(Limit::Bounded(1000)));
        assert_eq!(update.snapshots, None);
    }

    #[test]
    fn test_quota_form_round_trips_unlimited() {
        let quotas = QuotaSet::from_json(&serde_json::json!({"shares": -1, "gigabytes": 50}));
        let form = QuotaForm::from_quota_set(&quotas);
        assert_eq!(form.shares, "-1");
        assert_eq!(form.gigabytes, "50");
        assert_eq!(form.snapshots, "");
    }

    #[test]
    fn test_outcome_from_error() {
        let outcome = FormOutcome::from_error(Error::invalid("bad"), "Unable to create share.", "/");
        assert_matches!(outcome, FormOutcome::Invalid { ref errors } if errors[0].message == "bad");
        assert_eq!(outcome.metric_outcome(), OUTCOME_INVALID);

        let outcome = FormOutcome::from_error(
            Error::ServiceCatalog {
                service_type: "share".into(),
            },
            "Unable to create share.",
            "/",
        );
        assert_matches!(outcome, FormOutcome::Failed { ref message, .. } if message == "Unable to create share.");

        let (messages, redirect) = outcome.into_redirect().unwrap();
        assert_eq!(redirect, "/");
        assert_eq!(messages.to_query(), "error=Unable%20to%20create%20share.");
    }

    #[test]
    fn test_volume_type_initial_text() {
        let volume_type = VolumeType {
            id: "vt1".into(),
            name: "gold".into(),
            extra_specs: [("driver_handles_share_servers".to_string(), "True".to_string())]
                .into_iter()
                .collect(),
        };
        let form = UpdateVolumeTypeForm::from_volume_type(&volume_type);
        assert_eq!(form.extra_specs, "driver_handles_share_servers=True\r\n");
    }

    #[test]
    fn test_action_query_name() {
        let query = ActionQuery::default();
        assert_eq!(query.name_or("s1"), "s1");
        let query = ActionQuery {
            name: Some("demo".into()),
        };
        assert_eq!(query.name_or("s1"), "demo");
    }
}
