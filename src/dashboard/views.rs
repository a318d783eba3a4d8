//! List, Detail & Tab Views
//!
//! Fetch remote records and turn them into page contexts. Fetch failures
//! never escape a list view: they become a flash message and an empty
//! table.

use crate::api::manila::ManilaClient;
use crate::api::params::SearchOpts;
use crate::dashboard::forms::{AddSecurityServiceForm, Choices, QuotaForm, QuotaScope};
use crate::dashboard::messages::Messages;
use crate::dashboard::pages::{Action, Cell, DetailTemplate, FormView, Section, TabLink, Table};
use crate::domain::models::QuotaSet;
use crate::domain::ports::{NameOrId, TenantDirectory, TenantOwned};
use crate::error::{Error, Result};
use std::collections::HashMap;
use tracing::{debug, error, warn};

/// Info shown in place of data when no share service is configured
pub const SERVICE_NOT_CONFIGURED: &str = "Share service is not configured.";
/// Warning shown when owning tenants cannot be resolved
pub const TENANT_LOOKUP_FAILED: &str = "Unable to retrieve share project information.";

// =============================================================================
// Post-processing
// =============================================================================

/// Replace absent or empty names with the record id
pub fn set_id_if_nameless<T: NameOrId>(items: &mut [T]) {
    for item in items.iter_mut() {
        if item.name().map_or(true, str::is_empty) {
            let id = item.id().to_string();
            item.set_name(id);
        }
    }
}

/// Attach owning tenant names to each record
///
/// A failed lookup queues a warning and leaves the records untouched.
pub async fn set_tenant_name_to_objects<T: TenantOwned>(
    tenants: Option<&dyn TenantDirectory>,
    items: &mut [T],
    messages: &mut Messages,
) {
    let lookup = match tenants {
        Some(directory) => directory.tenant_list().await,
        None => Err(Error::ServiceCatalog {
            service_type: "identity".to_string(),
        }),
    };

    let tenants = match lookup {
        Ok((tenants, _)) => tenants,
        Err(e) => {
            warn!("Unable to retrieve tenants: {}", e);
            messages.warning(TENANT_LOOKUP_FAILED);
            return;
        }
    };

    let names: HashMap<&str, &str> = tenants
        .iter()
        .map(|t| (t.id.as_str(), t.name.as_str()))
        .collect();

    for item in items.iter_mut() {
        let name = item
            .tenant_id()
            .and_then(|id| names.get(id))
            .map(|name| name.to_string());
        item.set_tenant_name(name);
    }
}

// =============================================================================
// Index Tabs
// =============================================================================

/// Tabs of the index page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTab {
    Shares,
    Snapshots,
    ShareNetworks,
    SecurityServices,
    VolumeTypes,
    Limits,
    Extensions,
}

impl IndexTab {
    pub const ALL: [IndexTab; 7] = [
        IndexTab::Shares,
        IndexTab::Snapshots,
        IndexTab::ShareNetworks,
        IndexTab::SecurityServices,
        IndexTab::VolumeTypes,
        IndexTab::Limits,
        IndexTab::Extensions,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            IndexTab::Shares => "shares",
            IndexTab::Snapshots => "snapshots",
            IndexTab::ShareNetworks => "share_networks",
            IndexTab::SecurityServices => "security_services",
            IndexTab::VolumeTypes => "volume_types",
            IndexTab::Limits => "limits",
            IndexTab::Extensions => "extensions",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IndexTab::Shares => "Shares",
            IndexTab::Snapshots => "Snapshots",
            IndexTab::ShareNetworks => "Share Networks",
            IndexTab::SecurityServices => "Security Services",
            IndexTab::VolumeTypes => "Volume Types",
            IndexTab::Limits => "Limits",
            IndexTab::Extensions => "Extensions",
        }
    }

    /// Collection name used in failure messages
    fn collection(&self) -> &'static str {
        match self {
            IndexTab::Shares => "share list",
            IndexTab::Snapshots => "snapshot list",
            IndexTab::ShareNetworks => "share networks",
            IndexTab::SecurityServices => "security services",
            IndexTab::VolumeTypes => "volume types",
            IndexTab::Limits => "limits",
            IndexTab::Extensions => "extensions",
        }
    }

    /// Unknown or missing slugs select the shares tab
    pub fn parse(slug: Option<&str>) -> Self {
        slug.and_then(|s| Self::ALL.into_iter().find(|t| t.slug() == s))
            .unwrap_or(IndexTab::Shares)
    }

    pub fn links(&self) -> Vec<TabLink> {
        Self::ALL
            .iter()
            .map(|t| TabLink {
                slug: t.slug().to_string(),
                label: t.label().to_string(),
                active: t == self,
            })
            .collect()
    }

    /// Empty table with the tab's columns and create action
    pub fn empty_table(&self) -> Table {
        match self {
            IndexTab::Shares => Table::new(
                "shares",
                "Shares",
                &["Name", "Project", "Size", "Status", "Protocol", "Share Network"],
            )
            .with_action(Action::link("Create Share", "/create/share")),
            IndexTab::Snapshots => Table::new(
                "snapshots",
                "Snapshots",
                &["Name", "Project", "Share", "Size", "Status"],
            )
            .with_action(Action::link("Create Snapshot", "/create/snapshot")),
            IndexTab::ShareNetworks => Table::new(
                "share_networks",
                "Share Networks",
                &["Name", "Project", "Neutron Net ID", "Neutron Subnet ID", "Status"],
            )
            .with_action(Action::link("Create Share Network", "/create/share_network")),
            IndexTab::SecurityServices => Table::new(
                "security_services",
                "Security Services",
                &["Name", "Project", "Type", "DNS IP", "Server", "Domain", "Status"],
            )
            .with_action(Action::link(
                "Create Security Service",
                "/create/security_service",
            )),
            IndexTab::VolumeTypes => {
                Table::new("volume_types", "Volume Types", &["Name", "Extra Specs"])
                    .with_action(Action::link("Create Volume Type", "/create/volume_type"))
            }
            IndexTab::Limits => Table::new("limits", "Absolute Limits", &["Resource", "Limit"]),
            IndexTab::Extensions => Table::new(
                "extensions",
                "Extensions",
                &["Name", "Alias", "Description", "Updated"],
            ),
        }
    }
}

/// Table for a tab whose share service is not configured
pub fn unavailable_table(tab: IndexTab, messages: &mut Messages) -> Table {
    messages.info(SERVICE_NOT_CONFIGURED);
    tab.empty_table()
}

/// Fetch and render the active tab
///
/// `tenant_id` is the caller's project, used for the quota links.
pub async fn tab_table(
    tab: IndexTab,
    manila: &ManilaClient,
    tenants: Option<&dyn TenantDirectory>,
    tenant_id: &str,
    messages: &mut Messages,
) -> Table {
    let mut table = tab.empty_table();
    let result = match tab {
        IndexTab::Shares => fill_shares(&mut table, manila, tenants, messages).await,
        IndexTab::Snapshots => fill_snapshots(&mut table, manila, tenants, messages).await,
        IndexTab::ShareNetworks => fill_share_networks(&mut table, manila, tenants, messages).await,
        IndexTab::SecurityServices => {
            fill_security_services(&mut table, manila, tenants, messages).await
        }
        IndexTab::VolumeTypes => fill_volume_types(&mut table, manila).await,
        IndexTab::Limits => fill_limits(&mut table, manila, tenant_id).await,
        IndexTab::Extensions => fill_extensions(&mut table, manila).await,
    };

    match result {
        Ok(()) => table,
        Err(e) if e.is_service_unavailable() => unavailable_table(tab, messages),
        Err(e) => {
            error!("Unable to retrieve {}: {}", tab.collection(), e);
            messages.error(format!("Unable to retrieve {}.", tab.collection()));
            tab.empty_table()
        }
    }
}

fn url(prefix: &str, id: &str) -> String {
    format!("{}/{}", prefix, urlencoding::encode(id))
}

/// POST target that carries the display name for the flash message
fn named_action(prefix: &str, id: &str, verb: &str, name: &str) -> String {
    format!("{}/{}?name={}", url(prefix, id), verb, urlencoding::encode(name))
}

fn size_text(size: u64) -> String {
    format!("{} GiB", size)
}

async fn fill_shares(
    table: &mut Table,
    manila: &ManilaClient,
    tenants: Option<&dyn TenantDirectory>,
    messages: &mut Messages,
) -> Result<()> {
    let mut shares = manila
        .share_list(Some(&SearchOpts::new().all_tenants()))
        .await?;
    set_id_if_nameless(&mut shares);
    set_tenant_name_to_objects(tenants, &mut shares, messages).await;

    for share in &shares {
        let name = share.name_or_id();
        table.push(
            vec![
                Cell::link(name, url("/shares", &share.id)),
                Cell::opt(share.tenant_name.as_deref()),
                Cell::text(size_text(share.size)),
                Cell::text(&share.status),
                Cell::text(&share.share_proto),
                match &share.share_network_id {
                    Some(id) => Cell::link(id, url("/share_networks", id)),
                    None => Cell::opt(None),
                },
            ],
            vec![
                Action::link("Edit Share", format!("{}/update", url("/shares", &share.id))),
                Action::link(
                    "Create Snapshot",
                    format!(
                        "/create/snapshot?share_id={}",
                        urlencoding::encode(&share.id)
                    ),
                ),
                Action::delete(
                    "Delete Share",
                    named_action("/shares", &share.id, "delete", name),
                ),
            ],
        );
    }
    Ok(())
}

async fn fill_snapshots(
    table: &mut Table,
    manila: &ManilaClient,
    tenants: Option<&dyn TenantDirectory>,
    messages: &mut Messages,
) -> Result<()> {
    let mut snapshots = manila.share_snapshot_list().await?;
    set_id_if_nameless(&mut snapshots);
    set_tenant_name_to_objects(tenants, &mut snapshots, messages).await;

    for snapshot in &snapshots {
        let name = snapshot.name_or_id();
        table.push(
            vec![
                Cell::link(name, url("/snapshots", &snapshot.id)),
                Cell::opt(snapshot.tenant_name.as_deref()),
                Cell::link(&snapshot.share_id, url("/shares", &snapshot.share_id)),
                Cell::text(size_text(snapshot.size)),
                Cell::text(&snapshot.status),
            ],
            vec![
                Action::link(
                    "Create Share",
                    format!(
                        "/create/share?snapshot_id={}",
                        urlencoding::encode(&snapshot.id)
                    ),
                ),
                Action::delete(
                    "Delete Snapshot",
                    named_action("/snapshots", &snapshot.id, "delete", name),
                ),
            ],
        );
    }
    Ok(())
}

async fn fill_share_networks(
    table: &mut Table,
    manila: &ManilaClient,
    tenants: Option<&dyn TenantDirectory>,
    messages: &mut Messages,
) -> Result<()> {
    let mut share_networks = manila
        .share_network_list(Some(&SearchOpts::new().all_tenants()))
        .await?;
    set_id_if_nameless(&mut share_networks);
    set_tenant_name_to_objects(tenants, &mut share_networks, messages).await;

    for network in &share_networks {
        let name = network.name_or_id();
        table.push(
            vec![
                Cell::link(name, url("/share_networks", &network.id)),
                Cell::opt(network.tenant_name.as_deref()),
                Cell::opt(network.neutron_net_id.as_deref()),
                Cell::opt(network.neutron_subnet_id.as_deref()),
                Cell::opt(network.status.as_deref()),
            ],
            vec![Action::delete(
                "Delete Share Network",
                named_action("/share_networks", &network.id, "delete", name),
            )],
        );
    }
    Ok(())
}

async fn fill_security_services(
    table: &mut Table,
    manila: &ManilaClient,
    tenants: Option<&dyn TenantDirectory>,
    messages: &mut Messages,
) -> Result<()> {
    let mut services = manila
        .security_service_list(Some(&SearchOpts::new().all_tenants()))
        .await?;
    set_id_if_nameless(&mut services);
    set_tenant_name_to_objects(tenants, &mut services, messages).await;

    for service in &services {
        let name = service.name_or_id();
        table.push(
            vec![
                Cell::link(name, url("/security_services", &service.id)),
                Cell::opt(service.tenant_name.as_deref()),
                Cell::text(service.service_type.label()),
                Cell::opt(service.dns_ip.as_deref()),
                Cell::opt(service.server.as_deref()),
                Cell::opt(service.domain.as_deref()),
                Cell::opt(service.status.as_deref()),
            ],
            vec![Action::delete(
                "Delete Security Service",
                named_action("/security_services", &service.id, "delete", name),
            )],
        );
    }
    Ok(())
}

async fn fill_volume_types(table: &mut Table, manila: &ManilaClient) -> Result<()> {
    for volume_type in manila.volume_type_list().await? {
        let specs = volume_type
            .extra_specs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        table.push(
            vec![Cell::text(&volume_type.name), Cell::text(specs)],
            vec![
                Action::link(
                    "Update Extra Specs",
                    format!("{}/extra_specs", url("/volume_types", &volume_type.id)),
                ),
                Action::delete(
                    "Delete Volume Type",
                    named_action("/volume_types", &volume_type.id, "delete", &volume_type.name),
                ),
            ],
        );
    }
    Ok(())
}

async fn fill_limits(table: &mut Table, manila: &ManilaClient, tenant_id: &str) -> Result<()> {
    for (resource, limit) in manila.tenant_absolute_limits().await? {
        table.push(vec![Cell::text(resource), Cell::text(limit.to_string())], vec![]);
    }
    if !tenant_id.is_empty() {
        table.actions.push(Action::link("Project Quotas", url("/quotas", tenant_id)));
        table.actions.push(Action::link(
            "Default Quotas",
            format!("/default_quotas?tenant_id={}", urlencoding::encode(tenant_id)),
        ));
    }
    Ok(())
}

async fn fill_extensions(table: &mut Table, manila: &ManilaClient) -> Result<()> {
    for extension in manila.list_extensions().await?.iter() {
        table.push(
            vec![
                Cell::text(&extension.name),
                Cell::text(&extension.alias),
                Cell::text(&extension.description),
                Cell::opt(extension.updated.as_deref()),
            ],
            vec![],
        );
    }
    Ok(())
}

// =============================================================================
// Detail Pages
// =============================================================================

fn detail_page(title: String, messages: &Messages) -> DetailTemplate {
    DetailTemplate {
        title,
        messages: messages.iter().cloned().collect(),
        back_url: "/".to_string(),
        sections: Vec::new(),
        tables: Vec::new(),
        actions: Vec::new(),
        forms: Vec::new(),
    }
}

pub async fn share_detail(
    manila: &ManilaClient,
    share_id: &str,
    messages: &Messages,
) -> Result<DetailTemplate> {
    let share = manila.share_get(share_id).await?;
    let name = share.name_or_id().to_string();
    debug!("Rendering share detail for {}", share.id);

    let mut page = detail_page(format!("Share Details: {}", name), messages);
    page.back_url = "/?tab=shares".to_string();

    let mut metadata = Section::new("Metadata");
    for (key, value) in &share.metadata {
        metadata = metadata.field(key, value.as_str());
    }

    page.sections = vec![
        Section::new("Share Overview")
            .field("Name", name.as_str())
            .field("ID", share.id.as_str())
            .opt("Description", share.description.as_deref())
            .field("Status", share.status.as_str())
            .opt("Export location", share.export_location.as_deref())
            .opt("Availability zone", share.availability_zone.as_deref())
            .opt("Created", share.created_at.as_deref()),
        Section::new("Specs")
            .field("Size", size_text(share.size))
            .field("Protocol", share.share_proto.as_str())
            .opt("Share network", share.share_network_id.as_deref())
            .opt("Source snapshot", share.snapshot_id.as_deref()),
        metadata,
    ];
    page.actions = vec![
        Action::link("Edit Share", format!("{}/update", url("/shares", &share.id))),
        Action::link(
            "Create Snapshot",
            format!("/create/snapshot?share_id={}", urlencoding::encode(&share.id)),
        ),
        Action::delete("Delete Share", named_action("/shares", &share.id, "delete", &name)),
    ];
    Ok(page)
}

pub async fn snapshot_detail(
    manila: &ManilaClient,
    snapshot_id: &str,
    messages: &Messages,
) -> Result<DetailTemplate> {
    let snapshot = manila.share_snapshot_get(snapshot_id).await?;
    let name = snapshot.name_or_id().to_string();

    let mut page = detail_page(format!("Snapshot Details: {}", name), messages);
    page.back_url = "/?tab=snapshots".to_string();
    page.sections = vec![Section::new("Snapshot Overview")
        .field("Name", name.as_str())
        .field("ID", snapshot.id.as_str())
        .opt("Description", snapshot.description.as_deref())
        .field("Status", snapshot.status.as_str())
        .field("Size", size_text(snapshot.size))
        .field("Source share", snapshot.share_id.as_str())
        .opt("Created", snapshot.created_at.as_deref())];
    page.actions = vec![
        Action::link(
            "Create Share",
            format!("/create/share?snapshot_id={}", urlencoding::encode(&snapshot.id)),
        ),
        Action::delete(
            "Delete Snapshot",
            named_action("/snapshots", &snapshot.id, "delete", &name),
        ),
    ];
    Ok(page)
}

/// Share network overview, its security services and the add form
///
/// Security service lookups are secondary: a failure there is flashed
/// and the overview still renders.
pub async fn share_network_detail(
    manila: &ManilaClient,
    share_network_id: &str,
    messages: &Messages,
) -> Result<DetailTemplate> {
    let network = manila.share_network_get(share_network_id).await?;
    let name = network.name_or_id().to_string();
    let mut flashes = messages.clone();

    let mut attached = Table::new(
        "security_services",
        "Security Services",
        &["Name", "Type", "Status"],
    );
    let mut attached_ids = Vec::new();
    let filter = SearchOpts::new().with("share_network_id", network.id.as_str());
    match manila.security_service_list(Some(&filter)).await {
        Ok(mut services) => {
            set_id_if_nameless(&mut services);
            for service in &services {
                let service_name = service.name_or_id();
                attached_ids.push(service.id.clone());
                attached.push(
                    vec![
                        Cell::link(service_name, url("/security_services", &service.id)),
                        Cell::text(service.service_type.label()),
                        Cell::opt(service.status.as_deref()),
                    ],
                    vec![Action::delete(
                        "Remove",
                        format!(
                            "{}/security_services/{}/remove?name={}",
                            url("/share_networks", &network.id),
                            urlencoding::encode(&service.id),
                            urlencoding::encode(service_name)
                        ),
                    )],
                );
            }
        }
        Err(e) => {
            error!("Unable to retrieve security services: {}", e);
            flashes.error("Unable to retrieve security services.");
        }
    }

    let mut forms = Vec::new();
    match manila.security_service_list(None).await {
        Ok(mut services) => {
            set_id_if_nameless(&mut services);
            let choices: Choices = services
                .iter()
                .filter(|s| !attached_ids.contains(&s.id))
                .map(|s| (s.id.clone(), s.name_or_id().to_string()))
                .collect();
            forms.push(AddSecurityServiceForm::default().view(&network.id, &choices));
        }
        Err(e) => warn!("Unable to list security service choices: {}", e),
    }

    let mut page = detail_page(format!("Share Network Details: {}", name), &flashes);
    page.back_url = "/?tab=share_networks".to_string();
    page.sections = vec![
        Section::new("Share Network Overview")
            .field("Name", name.as_str())
            .field("ID", network.id.as_str())
            .opt("Description", network.description.as_deref())
            .opt("Status", network.status.as_deref())
            .opt("Project", network.project_id.as_deref()),
        Section::new("Net Details")
            .opt("Neutron Net ID", network.neutron_net_id.as_deref())
            .opt("Neutron Subnet ID", network.neutron_subnet_id.as_deref())
            .opt("Network type", network.network_type.as_deref())
            .field(
                "Segmentation ID",
                network
                    .segmentation_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            )
            .opt("CIDR", network.cidr.as_deref())
            .field(
                "IP version",
                network
                    .ip_version
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
    ];
    page.tables = vec![attached];
    page.forms = forms;
    page.actions = vec![Action::delete(
        "Delete Share Network",
        named_action("/share_networks", &network.id, "delete", &name),
    )];
    Ok(page)
}

pub async fn security_service_detail(
    manila: &ManilaClient,
    security_service_id: &str,
    messages: &Messages,
) -> Result<DetailTemplate> {
    let service = manila.security_service_get(security_service_id).await?;
    let name = service.name_or_id().to_string();

    let mut page = detail_page(format!("Security Service Details: {}", name), messages);
    page.back_url = "/?tab=security_services".to_string();
    page.sections = vec![
        Section::new("Security Service Overview")
            .field("Name", name.as_str())
            .field("ID", service.id.as_str())
            .field("Type", service.service_type.label())
            .opt("Description", service.description.as_deref())
            .opt("Status", service.status.as_deref()),
        Section::new("Details")
            .opt("DNS IP", service.dns_ip.as_deref())
            .opt("Server", service.server.as_deref())
            .opt("Domain", service.domain.as_deref())
            .opt("User", service.sid.as_deref()),
    ];
    page.actions = vec![Action::delete(
        "Delete Security Service",
        named_action("/security_services", &service.id, "delete", &name),
    )];
    Ok(page)
}

// =============================================================================
// Quotas
// =============================================================================

/// Current quota values, unlimited shown as such
fn quota_section(title: &str, quotas: &QuotaSet) -> Section {
    quotas
        .items
        .iter()
        .fold(Section::new(title), |section, (name, limit)| {
            section.field(name, limit.to_string())
        })
}

/// Fetch the quota set a scope edits
pub async fn fetch_quotas(manila: &ManilaClient, scope: &QuotaScope) -> Result<QuotaSet> {
    match scope {
        QuotaScope::Tenant(tenant_id) => manila.tenant_quota_get(tenant_id).await,
        QuotaScope::Default(tenant_id) => manila.default_quota_get(tenant_id).await,
    }
}

/// Quota page with the current values and the update form
///
/// `form` carries rejected input to preserve; `None` starts from the
/// current values.
pub fn quota_page(
    scope: &QuotaScope,
    quotas: &QuotaSet,
    form: Option<FormView>,
    messages: &Messages,
) -> DetailTemplate {
    let (title, section) = match scope {
        QuotaScope::Tenant(tenant_id) => (
            format!("Project Quotas: {}", tenant_id),
            quota_section("Quotas", quotas),
        ),
        QuotaScope::Default(_) => (
            "Default Quotas".to_string(),
            quota_section("Default Quotas", quotas),
        ),
    };

    let mut page = detail_page(title, messages);
    page.back_url = "/?tab=limits".to_string();
    page.sections = vec![section];
    page.forms = vec![form.unwrap_or_else(|| QuotaForm::from_quota_set(quotas).view(scope))];
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Snapshot, Tenant};
    use async_trait::async_trait;

    struct StaticTenants(Vec<Tenant>);

    #[async_trait]
    impl TenantDirectory for StaticTenants {
        async fn tenant_list(&self) -> Result<(Vec<Tenant>, bool)> {
            Ok((self.0.clone(), false))
        }
    }

    struct BrokenTenants;

    #[async_trait]
    impl TenantDirectory for BrokenTenants {
        async fn tenant_list(&self) -> Result<(Vec<Tenant>, bool)> {
            Err(Error::Remote {
                service: "identity".into(),
                status: 500,
                message: "boom".into(),
            })
        }
    }

    fn snapshot(id: &str, name: Option<&str>, project: &str) -> Snapshot {
        Snapshot {
            id: id.into(),
            name: name.map(str::to_string),
            project_id: Some(project.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_id_if_nameless() {
        let mut snapshots = vec![
            snapshot("a", None, "t1"),
            snapshot("b", Some(""), "t1"),
            snapshot("c", Some("named"), "t1"),
        ];
        set_id_if_nameless(&mut snapshots);
        let names: Vec<_> = snapshots.iter().map(|s| s.name.as_deref()).collect();
        assert_eq!(names, vec![Some("a"), Some("b"), Some("named")]);
    }

    #[tokio::test]
    async fn test_tenant_names_attached() {
        let tenants = StaticTenants(vec![Tenant {
            id: "t1".into(),
            name: "demo".into(),
            enabled: true,
            description: None,
        }]);
        let mut snapshots = vec![snapshot("a", None, "t1"), snapshot("b", None, "t2")];
        let mut messages = Messages::new();

        set_tenant_name_to_objects(Some(&tenants as &dyn TenantDirectory), &mut snapshots, &mut messages).await;
        assert_eq!(snapshots[0].tenant_name.as_deref(), Some("demo"));
        assert_eq!(snapshots[1].tenant_name, None);
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_tenant_lookup_failure_warns() {
        let mut snapshots = vec![snapshot("a", Some("keep"), "t1")];
        let mut messages = Messages::new();

        set_tenant_name_to_objects(Some(&BrokenTenants as &dyn TenantDirectory), &mut snapshots, &mut messages).await;
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].tenant_name, None);
        let texts: Vec<_> = messages.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec![TENANT_LOOKUP_FAILED]);
    }

    #[test]
    fn test_tab_parse() {
        assert_eq!(IndexTab::parse(None), IndexTab::Shares);
        assert_eq!(IndexTab::parse(Some("limits")), IndexTab::Limits);
        assert_eq!(IndexTab::parse(Some("bogus")), IndexTab::Shares);

        let links = IndexTab::Extensions.links();
        assert_eq!(links.len(), IndexTab::ALL.len());
        assert_eq!(links.iter().filter(|l| l.active).count(), 1);
        assert!(links[6].active);
    }

    #[test]
    fn test_unavailable_table() {
        let mut messages = Messages::new();
        let table = unavailable_table(IndexTab::Shares, &mut messages);
        assert!(table.rows.is_empty());
        assert_eq!(messages.iter().next().map(|m| m.text.as_str()), Some(SERVICE_NOT_CONFIGURED));
    }

    #[test]
    fn test_quota_page_shows_unlimited() {
        let quotas = QuotaSet::from_json(&serde_json::json!({"shares": -1, "gigabytes": 100}));
        let scope = QuotaScope::Tenant("t1".into());
        let page = quota_page(&scope, &quotas, None, &Messages::new());

        let values: Vec<_> = page.sections[0]
            .fields
            .iter()
            .map(|f| (f.label.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(values, vec![("gigabytes", "100"), ("shares", "Unlimited")]);
        assert_eq!(page.forms[0].action, "/quotas/t1");
    }
}
