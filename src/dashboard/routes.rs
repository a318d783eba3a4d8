//! Dashboard Routes
//!
//! URL routes for the index tabs, detail pages, forms and delete
//! actions, plus health and metrics endpoints.

use crate::api::catalog::SHARE_SERVICE;
use crate::api::identity::KeystoneClient;
use crate::api::manila::{ManilaClient, SHARE_STATE_AVAILABLE};
use crate::api::session::RequestContext;
use crate::dashboard::context::{AppState, Credentials};
use crate::dashboard::forms::{
    apply_errors, delete_resource, remove_security_service, ActionQuery, AddSecurityServiceForm,
    Choices, CreateSecurityServiceForm, CreateShareForm, CreateShareNetworkForm,
    CreateSnapshotForm, CreateVolumeTypeForm, FieldError, FormOutcome, QuotaForm, QuotaScope,
    ResourceKind, ShareFormChoices, ShareNetworkChoices, UpdateShareForm, UpdateVolumeTypeForm,
    REMOVE_SECURITY_SERVICE,
};
use crate::dashboard::messages::{FlashQuery, Messages};
use crate::dashboard::pages::{DetailTemplate, FormTemplate, FormView, HtmlTemplate, IndexTemplate};
use crate::dashboard::views::{self, IndexTab};
use crate::domain::models::QuotaSet;
use crate::domain::ports::{NameOrId, NetworkDirectory, TenantDirectory};
use crate::error::Result;
use axum::{
    extract::{Form, Path, Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use tracing::{error, warn};

// =============================================================================
// Query Types
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct TabQuery {
    tab: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SnapshotQuery {
    snapshot_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ShareQuery {
    share_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TenantQuery {
    tenant_id: Option<String>,
}

// =============================================================================
// Dashboard Router
// =============================================================================

/// Dashboard router builder
pub struct DashboardRouter {
    state: AppState,
}

impl DashboardRouter {
    /// Create a new dashboard router
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Build the Axum router
    pub fn build(self) -> Router {
        Router::new()
            // Index with tabs
            .route("/", get(index))
            // Shares
            .route("/create/share", get(create_share_form).post(create_share))
            .route("/shares/:share_id", get(share_detail))
            .route(
                "/shares/:share_id/update",
                get(update_share_form).post(update_share),
            )
            .route("/shares/:share_id/delete", post(delete_share))
            // Snapshots
            .route(
                "/create/snapshot",
                get(create_snapshot_form).post(create_snapshot),
            )
            .route("/snapshots/:snapshot_id", get(snapshot_detail))
            .route("/snapshots/:snapshot_id/delete", post(delete_snapshot))
            // Share networks
            .route(
                "/create/share_network",
                get(create_share_network_form).post(create_share_network),
            )
            .route("/share_networks/:share_network_id", get(share_network_detail))
            .route(
                "/share_networks/:share_network_id/delete",
                post(delete_share_network),
            )
            .route(
                "/share_networks/:share_network_id/security_services",
                post(add_security_service),
            )
            .route(
                "/share_networks/:share_network_id/security_services/:sec_service_id/remove",
                post(remove_share_network_security_service),
            )
            // Security services
            .route(
                "/create/security_service",
                get(create_security_service_form).post(create_security_service),
            )
            .route(
                "/security_services/:sec_service_id",
                get(security_service_detail),
            )
            .route(
                "/security_services/:sec_service_id/delete",
                post(delete_security_service),
            )
            // Volume types
            .route(
                "/create/volume_type",
                get(create_volume_type_form).post(create_volume_type),
            )
            .route(
                "/volume_types/:volume_type_id/extra_specs",
                get(update_extra_specs_form).post(update_extra_specs),
            )
            .route("/volume_types/:volume_type_id/delete", post(delete_volume_type))
            // Quotas
            .route("/quotas/:tenant_id", get(tenant_quotas).post(update_tenant_quotas))
            .route(
                "/default_quotas",
                get(default_quotas).post(update_default_quotas),
            )
            // Service endpoints
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .route("/metrics", get(metrics))
            .with_state(self.state)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Manila client for the request, or a redirect explaining why not
fn connect(
    state: &AppState,
    ctx: &RequestContext,
    fallback: &str,
) -> std::result::Result<ManilaClient, Response> {
    state.manila(ctx).map_err(|e| {
        let mut messages = Messages::new();
        if e.is_service_unavailable() {
            messages.info(views::SERVICE_NOT_CONFIGURED);
        } else {
            error!("Unable to connect to the share service: {}", e);
            messages.error("Unable to connect to the share service.");
        }
        messages.redirect(fallback).into_response()
    })
}

fn tenant_directory(keystone: &Option<KeystoneClient>) -> Option<&dyn TenantDirectory> {
    keystone.as_ref().map(|k| k as &dyn TenantDirectory)
}

fn render_form(title: &str, messages: &Messages, mut view: FormView, errors: &[FieldError]) -> Response {
    apply_errors(&mut view, errors);
    HtmlTemplate(FormTemplate::new(title, messages, view)).into_response()
}

/// Record the submission and redirect, or re-render on invalid input
fn finish(
    state: &AppState,
    form: &str,
    outcome: FormOutcome,
    rerender: impl FnOnce(&[FieldError]) -> Response,
) -> Response {
    state.metrics.record_form(form, outcome.metric_outcome());
    match outcome.into_redirect() {
        Ok((messages, location)) => messages.redirect(&location).into_response(),
        Err(errors) => rerender(&errors),
    }
}

/// Render a detail page, or return to the index tab when it can't be fetched
fn detail_or_redirect(
    result: Result<DetailTemplate>,
    kind: &str,
    tab: IndexTab,
) -> Response {
    match result {
        Ok(page) => HtmlTemplate(page).into_response(),
        Err(e) => {
            error!("Unable to retrieve {} details: {}", kind, e);
            let mut messages = Messages::new();
            messages.error(format!("Unable to retrieve {} details.", kind));
            messages
                .redirect(&format!("/?tab={}", tab.slug()))
                .into_response()
        }
    }
}

async fn delete_and_redirect(
    state: &AppState,
    ctx: &RequestContext,
    kind: ResourceKind,
    id: &str,
    query: &ActionQuery,
) -> Response {
    let fallback = format!("/?tab={}", kind.tab());
    let manila = match connect(state, ctx, &fallback) {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let outcome = delete_resource(&manila, kind, id, query.name_or(id)).await;
    finish(state, kind.form_name(), outcome, |_| {
        StatusCode::BAD_REQUEST.into_response()
    })
}

// =============================================================================
// Index
// =============================================================================

async fn index(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Query(tab): Query<TabQuery>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let tab = IndexTab::parse(tab.tab.as_deref());
    let mut messages = Messages::from_query(&flash);

    let table = match state.manila(&ctx) {
        Ok(manila) => {
            let keystone = state.keystone(&ctx);
            views::tab_table(
                tab,
                &manila,
                tenant_directory(&keystone),
                &ctx.user.tenant_id,
                &mut messages,
            )
            .await
        }
        Err(e) => {
            if !e.is_service_unavailable() {
                error!("Unable to connect to the share service: {}", e);
            }
            views::unavailable_table(tab, &mut messages)
        }
    };

    HtmlTemplate(IndexTemplate {
        title: tab.label().to_string(),
        messages: messages.iter().cloned().collect(),
        tabs: tab.links(),
        table,
    })
    .into_response()
}

// =============================================================================
// Shares
// =============================================================================

async fn share_form_choices(manila: &ManilaClient) -> ShareFormChoices {
    let mut choices = ShareFormChoices::default();
    match manila.share_network_list(None).await {
        Ok(networks) => {
            choices.share_networks = networks
                .iter()
                .map(|n| (n.id.clone(), n.name_or_id().to_string()))
                .collect()
        }
        Err(e) => warn!("Unable to list share network choices: {}", e),
    }
    match manila.share_snapshot_list().await {
        Ok(snapshots) => {
            choices.snapshots = snapshots
                .iter()
                .filter(|s| s.status == SHARE_STATE_AVAILABLE)
                .map(|s| (s.id.clone(), s.name_or_id().to_string()))
                .collect()
        }
        Err(e) => warn!("Unable to list snapshot choices: {}", e),
    }
    choices
}

async fn create_share_form(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Query(query): Query<SnapshotQuery>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=shares") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let choices = share_form_choices(&manila).await;
    let form = CreateShareForm::initial(query.snapshot_id.as_deref());
    render_form("Create Share", &Messages::new(), form.view(&choices), &[])
}

async fn create_share(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Form(form): Form<CreateShareForm>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=shares") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let outcome = form.handle(&manila).await;
    let choices = match &outcome {
        FormOutcome::Invalid { .. } => share_form_choices(&manila).await,
        _ => ShareFormChoices::default(),
    };
    finish(&state, CreateShareForm::NAME, outcome, |errors| {
        render_form("Create Share", &Messages::new(), form.view(&choices), errors)
    })
}

async fn share_detail(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(share_id): Path<String>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let manila = match connect(&state, &ctx, "/") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let messages = Messages::from_query(&flash);
    let result = views::share_detail(&manila, &share_id, &messages).await;
    detail_or_redirect(result, "share", IndexTab::Shares)
}

async fn update_share_form(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(share_id): Path<String>,
) -> Response {
    let manila = match connect(&state, &ctx, "/") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    match manila.share_get(&share_id).await {
        Ok(share) => {
            let form = UpdateShareForm::from_share(&share);
            render_form("Edit Share", &Messages::new(), form.view(&share_id), &[])
        }
        Err(e) => detail_or_redirect(Err(e), "share", IndexTab::Shares),
    }
}

async fn update_share(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(share_id): Path<String>,
    Form(form): Form<UpdateShareForm>,
) -> Response {
    let manila = match connect(&state, &ctx, "/") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let outcome = form.handle(&manila, &share_id).await;
    finish(&state, UpdateShareForm::NAME, outcome, |errors| {
        render_form("Edit Share", &Messages::new(), form.view(&share_id), errors)
    })
}

async fn delete_share(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(share_id): Path<String>,
    Query(query): Query<ActionQuery>,
) -> Response {
    delete_and_redirect(&state, &ctx, ResourceKind::Share, &share_id, &query).await
}

// =============================================================================
// Snapshots
// =============================================================================

async fn share_choices(manila: &ManilaClient) -> Choices {
    match manila.share_list(None).await {
        Ok(shares) => shares
            .iter()
            .map(|s| (s.id.clone(), s.name_or_id().to_string()))
            .collect(),
        Err(e) => {
            warn!("Unable to list share choices: {}", e);
            Vec::new()
        }
    }
}

async fn create_snapshot_form(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Query(query): Query<ShareQuery>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=snapshots") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let shares = share_choices(&manila).await;
    let form = CreateSnapshotForm::initial(query.share_id.as_deref());
    render_form("Create Share Snapshot", &Messages::new(), form.view(&shares), &[])
}

async fn create_snapshot(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Form(form): Form<CreateSnapshotForm>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=snapshots") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let outcome = form.handle(&manila).await;
    let shares = match &outcome {
        FormOutcome::Invalid { .. } => share_choices(&manila).await,
        _ => Vec::new(),
    };
    finish(&state, CreateSnapshotForm::NAME, outcome, |errors| {
        render_form("Create Share Snapshot", &Messages::new(), form.view(&shares), errors)
    })
}

async fn snapshot_detail(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(snapshot_id): Path<String>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=snapshots") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let messages = Messages::from_query(&flash);
    let result = views::snapshot_detail(&manila, &snapshot_id, &messages).await;
    detail_or_redirect(result, "snapshot", IndexTab::Snapshots)
}

async fn delete_snapshot(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(snapshot_id): Path<String>,
    Query(query): Query<ActionQuery>,
) -> Response {
    delete_and_redirect(&state, &ctx, ResourceKind::Snapshot, &snapshot_id, &query).await
}

// =============================================================================
// Share Networks
// =============================================================================

async fn share_network_choices(state: &AppState, ctx: &RequestContext, messages: &mut Messages) -> ShareNetworkChoices {
    let neutron = state.neutron(ctx);
    let keystone = state.keystone(ctx);
    ShareNetworkChoices::load(
        neutron.as_ref().map(|n| n as &dyn NetworkDirectory),
        tenant_directory(&keystone),
        messages,
    )
    .await
}

async fn create_share_network_form(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
) -> Response {
    let mut messages = Messages::new();
    let choices = share_network_choices(&state, &ctx, &mut messages).await;
    let form = CreateShareNetworkForm::default();
    render_form("Create Share Network", &messages, form.view(&choices), &[])
}

async fn create_share_network(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Form(form): Form<CreateShareNetworkForm>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=share_networks") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let mut messages = Messages::new();
    let choices = share_network_choices(&state, &ctx, &mut messages).await;
    let outcome = form.handle(&manila, &choices).await;
    finish(&state, CreateShareNetworkForm::NAME, outcome, |errors| {
        render_form("Create Share Network", &messages, form.view(&choices), errors)
    })
}

async fn share_network_detail(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(share_network_id): Path<String>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=share_networks") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let messages = Messages::from_query(&flash);
    let result = views::share_network_detail(&manila, &share_network_id, &messages).await;
    detail_or_redirect(result, "share network", IndexTab::ShareNetworks)
}

async fn delete_share_network(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(share_network_id): Path<String>,
    Query(query): Query<ActionQuery>,
) -> Response {
    delete_and_redirect(&state, &ctx, ResourceKind::ShareNetwork, &share_network_id, &query).await
}

async fn add_security_service(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(share_network_id): Path<String>,
    Form(form): Form<AddSecurityServiceForm>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=share_networks") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let name = match manila.share_network_get(&share_network_id).await {
        Ok(network) => network.name_or_id().to_string(),
        Err(e) => {
            warn!("Unable to retrieve share network name: {}", e);
            share_network_id.clone()
        }
    };

    let outcome = form.handle(&manila, &share_network_id, &name).await;
    finish(&state, AddSecurityServiceForm::NAME, outcome, |errors| {
        // The form lives on the detail page; report there
        let mut messages = Messages::new();
        for err in errors {
            messages.error(err.message.clone());
        }
        messages
            .redirect(&format!(
                "/share_networks/{}",
                urlencoding::encode(&share_network_id)
            ))
            .into_response()
    })
}

async fn remove_share_network_security_service(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path((share_network_id, sec_service_id)): Path<(String, String)>,
    Query(query): Query<ActionQuery>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=share_networks") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let outcome = remove_security_service(
        &manila,
        &share_network_id,
        &sec_service_id,
        query.name_or(&sec_service_id),
    )
    .await;
    finish(&state, REMOVE_SECURITY_SERVICE, outcome, |_| {
        StatusCode::BAD_REQUEST.into_response()
    })
}

// =============================================================================
// Security Services
// =============================================================================

async fn create_security_service_form() -> Response {
    let form = CreateSecurityServiceForm::default();
    render_form("Create Security Service", &Messages::new(), form.view(), &[])
}

async fn create_security_service(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Form(form): Form<CreateSecurityServiceForm>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=security_services") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let outcome = form.handle(&manila).await;
    finish(&state, CreateSecurityServiceForm::NAME, outcome, |errors| {
        render_form("Create Security Service", &Messages::new(), form.view(), errors)
    })
}

async fn security_service_detail(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(sec_service_id): Path<String>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=security_services") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let messages = Messages::from_query(&flash);
    let result = views::security_service_detail(&manila, &sec_service_id, &messages).await;
    detail_or_redirect(result, "security service", IndexTab::SecurityServices)
}

async fn delete_security_service(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(sec_service_id): Path<String>,
    Query(query): Query<ActionQuery>,
) -> Response {
    delete_and_redirect(&state, &ctx, ResourceKind::SecurityService, &sec_service_id, &query).await
}

// =============================================================================
// Volume Types
// =============================================================================

async fn create_volume_type_form() -> Response {
    let form = CreateVolumeTypeForm::default();
    render_form("Create Volume Type", &Messages::new(), form.view(), &[])
}

async fn create_volume_type(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Form(form): Form<CreateVolumeTypeForm>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=volume_types") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let outcome = form.handle(&manila).await;
    finish(&state, CreateVolumeTypeForm::NAME, outcome, |errors| {
        render_form("Create Volume Type", &Messages::new(), form.view(), errors)
    })
}

async fn update_extra_specs_form(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(volume_type_id): Path<String>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=volume_types") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    match manila.volume_type_get(&volume_type_id).await {
        Ok(volume_type) => {
            let form = UpdateVolumeTypeForm::from_volume_type(&volume_type);
            render_form(
                &format!("Update Extra Specs: {}", volume_type.name),
                &Messages::new(),
                form.view(&volume_type_id),
                &[],
            )
        }
        Err(e) => detail_or_redirect(Err(e), "volume type", IndexTab::VolumeTypes),
    }
}

async fn update_extra_specs(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(volume_type_id): Path<String>,
    Form(form): Form<UpdateVolumeTypeForm>,
) -> Response {
    let manila = match connect(&state, &ctx, "/?tab=volume_types") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let name = match manila.volume_type_get(&volume_type_id).await {
        Ok(volume_type) => volume_type.name,
        Err(e) => {
            warn!("Unable to retrieve volume type name: {}", e);
            volume_type_id.clone()
        }
    };

    let outcome = form.handle(&manila, &volume_type_id, &name).await;
    finish(&state, UpdateVolumeTypeForm::NAME, outcome, |errors| {
        render_form(
            &format!("Update Extra Specs: {}", name),
            &Messages::new(),
            form.view(&volume_type_id),
            errors,
        )
    })
}

async fn delete_volume_type(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(volume_type_id): Path<String>,
    Query(query): Query<ActionQuery>,
) -> Response {
    delete_and_redirect(&state, &ctx, ResourceKind::VolumeType, &volume_type_id, &query).await
}

// =============================================================================
// Quotas
// =============================================================================

async fn show_quotas(state: &AppState, ctx: &RequestContext, scope: QuotaScope, flash: &FlashQuery) -> Response {
    let manila = match connect(state, ctx, "/?tab=limits") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let messages = Messages::from_query(flash);
    let result = views::fetch_quotas(&manila, &scope)
        .await
        .map(|quotas| views::quota_page(&scope, &quotas, None, &messages));
    detail_or_redirect(result, "quota", IndexTab::Limits)
}

async fn submit_quotas(state: &AppState, ctx: &RequestContext, scope: QuotaScope, form: QuotaForm) -> Response {
    let manila = match connect(state, ctx, "/?tab=limits") {
        Ok(manila) => manila,
        Err(response) => return response,
    };
    let outcome = form.handle(&manila, &scope).await;
    let current = match &outcome {
        FormOutcome::Invalid { .. } => views::fetch_quotas(&manila, &scope)
            .await
            .unwrap_or_else(|e| {
                warn!("Unable to retrieve quotas: {}", e);
                QuotaSet::default()
            }),
        _ => QuotaSet::default(),
    };
    finish(state, scope.form_name(), outcome, |errors| {
        let mut view = form.view(&scope);
        apply_errors(&mut view, errors);
        HtmlTemplate(views::quota_page(&scope, &current, Some(view), &Messages::new()))
            .into_response()
    })
}

async fn tenant_quotas(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(tenant_id): Path<String>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    show_quotas(&state, &ctx, QuotaScope::Tenant(tenant_id), &flash).await
}

async fn update_tenant_quotas(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Path(tenant_id): Path<String>,
    Form(form): Form<QuotaForm>,
) -> Response {
    submit_quotas(&state, &ctx, QuotaScope::Tenant(tenant_id), form).await
}

fn default_scope(ctx: &RequestContext, query: TenantQuery) -> QuotaScope {
    let tenant_id = query
        .tenant_id
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| ctx.user.tenant_id.clone());
    QuotaScope::Default(tenant_id)
}

async fn default_quotas(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Query(query): Query<TenantQuery>,
    Query(flash): Query<FlashQuery>,
) -> Response {
    let scope = default_scope(&ctx, query);
    show_quotas(&state, &ctx, scope, &flash).await
}

async fn update_default_quotas(
    State(state): State<AppState>,
    Credentials(ctx): Credentials,
    Query(query): Query<TenantQuery>,
    Form(form): Form<QuotaForm>,
) -> Response {
    let scope = default_scope(&ctx, query);
    submit_quotas(&state, &ctx, scope, form).await
}

// =============================================================================
// Service Endpoints
// =============================================================================

/// Health check
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness check
///
/// Requests may bring their own catalog, so a missing static share
/// endpoint is reported but not fatal.
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.catalog.has_service(SHARE_SERVICE) {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::OK, "ready: share endpoint taken from requests")
    }
}

/// Prometheus text exposition
async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.encode() {
        Ok((content_type, body)) => ([(CONTENT_TYPE, content_type)], body).into_response(),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::catalog::ServiceCatalog;
    use crate::api::transport::ClientConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::time::Duration;
    use tower::ServiceExt;

    fn router(catalog: ServiceCatalog) -> Router {
        let state = AppState::new(ClientConfig::default(), catalog, Duration::from_secs(60)).unwrap();
        DashboardRouter::new(state).build()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = router(ServiceCatalog::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn test_index_requires_token() {
        let response = router(ServiceCatalog::default())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_index_without_share_service() {
        let response = router(ServiceCatalog::default())
            .oneshot(
                Request::get("/?tab=snapshots")
                    .header("X-Auth-Token", "tok")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Share service is not configured."));
        assert!(html.contains("No items to display."));
    }

    #[tokio::test]
    async fn test_form_without_share_service_redirects() {
        let response = router(ServiceCatalog::default())
            .oneshot(
                Request::post("/create/volume_type")
                    .header("X-Auth-Token", "tok")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("name=gold&extra_specs=a%3D1"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()["location"].to_str().unwrap();
        assert!(location.starts_with("/?tab=volume_types&info="));
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let response = router(ServiceCatalog::default())
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
