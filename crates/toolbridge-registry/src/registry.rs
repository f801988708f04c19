//! Process-wide store mapping service ids and tool names to their
//! definitions.
//!
//! The registry is an explicitly constructed object, shared by `Arc` and
//! passed to the transport layer and registration call sites; there is no
//! ambient singleton. Internally it keys tools by their qualified
//! `(service, tool)` identity and keeps a flat bare-name index for
//! backward-compatible name-only resolution, so lookup stays an O(1) map hit
//! on the execution hot path.
//!
//! Mutations (register/unregister) are serialized under a single writer
//! lock and are atomic: readers never observe a partially-applied
//! registration. Duplicate bare tool names are rejected, which keeps
//! name-only resolution deterministic regardless of registration order.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use toolbridge_core::{
    InputSchema, QualifiedToolName, RegistryError, RegistryResult, ServiceAdapter, ServiceId,
    ToolDef, ToolName,
};

/// A tool entry resolved from the registry: the immutable definition plus
/// the capability reference into its owning adapter.
pub struct RegisteredTool {
    pub def: ToolDef,
    pub adapter: Arc<dyn ServiceAdapter>,
}

impl RegisteredTool {
    /// Qualified identity of this tool.
    pub fn qualified_name(&self) -> QualifiedToolName {
        QualifiedToolName::new(self.def.service.clone(), self.def.name.clone())
    }
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredTool")
            .field("def", &self.def)
            .field("adapter", &"<dyn ServiceAdapter>")
            .finish()
    }
}

/// Read-only view of a registered service, as returned by listings.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSummary {
    pub id: ServiceId,
    pub display_name: String,
    pub description: String,
    pub base_endpoint: String,
    pub tools: Vec<ToolName>,
}

/// Read-only view of a registered tool, as returned by listings.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSummary {
    pub name: ToolName,
    pub service: ServiceId,
    pub description: String,
    pub input_schema: InputSchema,
}

struct ServiceEntry {
    summary: ServiceSummary,
}

#[derive(Default)]
struct RegistryState {
    services: HashMap<ServiceId, ServiceEntry>,
    service_order: Vec<ServiceId>,
    tools: HashMap<ToolName, Arc<RegisteredTool>>,
    tool_order: Vec<ToolName>,
}

/// Store mapping service ids to services and tool names to tools.
///
/// # Example
///
/// ```rust,ignore
/// let registry = Arc::new(Registry::new());
/// registry.register(Arc::new(GithubService::from_env()))?;
/// let tool = registry.lookup(&ToolName::parse("list_repos")?)?;
/// ```
#[derive(Default)]
pub struct Registry {
    state: RwLock<RegistryState>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a service and every tool it declares.
    ///
    /// Fails with [`RegistryError::DuplicateService`] if the id is taken and
    /// with [`RegistryError::DuplicateTool`] if any declared bare tool name
    /// is already bound. Registration is all-or-nothing: on any error, no
    /// part of the service becomes visible.
    pub fn register(&self, adapter: Arc<dyn ServiceAdapter>) -> RegistryResult<()> {
        let manifest = adapter.manifest();
        let mut state = self.write();

        if state.services.contains_key(&manifest.id) {
            return Err(RegistryError::DuplicateService(manifest.id));
        }

        // Collision check up front, before any insertion, so a rejected
        // registration leaves the maps untouched. The manifest itself may
        // not declare the same name twice either.
        let mut declared: Vec<&ToolName> = Vec::with_capacity(manifest.tools.len());
        for tool in &manifest.tools {
            if let Some(existing) = state.tools.get(&tool.name) {
                return Err(RegistryError::DuplicateTool {
                    tool: tool.name.clone(),
                    owner: existing.def.service.clone(),
                });
            }
            if declared.contains(&&tool.name) {
                return Err(RegistryError::DuplicateTool {
                    tool: tool.name.clone(),
                    owner: manifest.id.clone(),
                });
            }
            declared.push(&tool.name);
        }

        let tool_names: Vec<ToolName> = manifest.tools.iter().map(|t| t.name.clone()).collect();
        for tool in &manifest.tools {
            state.tools.insert(
                tool.name.clone(),
                Arc::new(RegisteredTool {
                    def: tool.clone(),
                    adapter: Arc::clone(&adapter),
                }),
            );
            state.tool_order.push(tool.name.clone());
            tracing::info!(tool = %tool.name, service = %manifest.id, "Registered tool");
        }

        let summary = ServiceSummary {
            id: manifest.id.clone(),
            display_name: manifest.display_name,
            description: manifest.description,
            base_endpoint: manifest.base_endpoint,
            tools: tool_names,
        };
        state.service_order.push(manifest.id.clone());
        state
            .services
            .insert(manifest.id.clone(), ServiceEntry { summary });
        tracing::info!(service = %manifest.id, "Registered service");

        Ok(())
    }

    /// Remove a service and all of its tools.
    ///
    /// The freed tool names become available for later registrations.
    pub fn unregister(&self, id: &ServiceId) -> RegistryResult<()> {
        let mut state = self.write();

        let entry = state
            .services
            .remove(id)
            .ok_or_else(|| RegistryError::ServiceNotFound(id.clone()))?;
        state.service_order.retain(|s| s != id);
        for name in &entry.summary.tools {
            state.tools.remove(name);
        }
        state
            .tool_order
            .retain(|name| !entry.summary.tools.contains(name));
        tracing::info!(service = %id, "Unregistered service");

        Ok(())
    }

    /// Resolve a tool by bare name. O(1) map access.
    pub fn lookup(&self, name: &ToolName) -> RegistryResult<Arc<RegisteredTool>> {
        self.read()
            .tools
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::ToolNotFound(name.clone()))
    }

    /// Resolve a tool by its qualified `(service, tool)` identity.
    ///
    /// Resolves to the same entry as a bare lookup of the name; a name owned
    /// by a different service is reported as not found rather than silently
    /// routed across services.
    pub fn lookup_qualified(
        &self,
        service: &ServiceId,
        tool: &ToolName,
    ) -> RegistryResult<Arc<RegisteredTool>> {
        let state = self.read();

        if !state.services.contains_key(service) {
            return Err(RegistryError::ServiceNotFound(service.clone()));
        }
        state
            .tools
            .get(tool)
            .filter(|entry| &entry.def.service == service)
            .cloned()
            .ok_or_else(|| RegistryError::ToolNotFound(tool.clone()))
    }

    /// Summary of one registered service.
    pub fn get_service(&self, id: &ServiceId) -> RegistryResult<ServiceSummary> {
        self.read()
            .services
            .get(id)
            .map(|entry| entry.summary.clone())
            .ok_or_else(|| RegistryError::ServiceNotFound(id.clone()))
    }

    /// All registered services, in registration order.
    pub fn list_services(&self) -> Vec<ServiceSummary> {
        let state = self.read();
        state
            .service_order
            .iter()
            .filter_map(|id| state.services.get(id))
            .map(|entry| entry.summary.clone())
            .collect()
    }

    /// All registered tools, in registration order, each tagged with its
    /// owning service id.
    pub fn list_tools(&self) -> Vec<ToolSummary> {
        let state = self.read();
        state
            .tool_order
            .iter()
            .filter_map(|name| state.tools.get(name))
            .map(|entry| summarize(entry))
            .collect()
    }

    /// The tools contributed by one service, in registration order.
    pub fn list_tools_for(&self, service: &ServiceId) -> RegistryResult<Vec<ToolSummary>> {
        let state = self.read();

        if !state.services.contains_key(service) {
            return Err(RegistryError::ServiceNotFound(service.clone()));
        }
        Ok(state
            .tool_order
            .iter()
            .filter_map(|name| state.tools.get(name))
            .filter(|entry| &entry.def.service == service)
            .map(|entry| summarize(entry))
            .collect())
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.read().tools.len()
    }

    /// Check whether the registry has no tools.
    pub fn is_empty(&self) -> bool {
        self.read().tools.is_empty()
    }
}

fn summarize(entry: &RegisteredTool) -> ToolSummary {
    ToolSummary {
        name: entry.def.name.clone(),
        service: entry.def.service.clone(),
        description: entry.def.description.clone(),
        input_schema: entry.def.input_schema.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use toolbridge_core::{
        CredentialRef, HandlerError, InputSchema, ServiceManifest, ToolDef,
    };

    /// Minimal adapter declaring a fixed set of tools, all returning `[]`.
    struct StubService {
        id: &'static str,
        tools: Vec<&'static str>,
    }

    impl StubService {
        fn new(id: &'static str, tools: &[&'static str]) -> Arc<Self> {
            Arc::new(Self {
                id,
                tools: tools.to_vec(),
            })
        }
    }

    #[async_trait]
    impl ServiceAdapter for StubService {
        fn manifest(&self) -> ServiceManifest {
            let mut manifest = ServiceManifest::new(
                ServiceId::new_unchecked(self.id),
                self.id,
                format!("{} stub service", self.id),
                "https://example.invalid",
                CredentialRef::new("stub"),
            );
            for tool in &self.tools {
                manifest = manifest.with_tool(ToolDef::new(
                    ToolName::new_unchecked(*tool),
                    format!("{tool} stub tool"),
                    InputSchema::new(),
                ));
            }
            manifest
        }

        async fn handle(&self, _tool: &ToolName, _params: Value) -> Result<Value, HandlerError> {
            Ok(json!([]))
        }
    }

    #[test]
    fn lookup_after_register_round_trips() {
        let registry = Registry::new();
        registry
            .register(StubService::new("github", &["list_issues"]))
            .unwrap();

        let tool = registry
            .lookup(&ToolName::new_unchecked("list_issues"))
            .unwrap();
        assert_eq!(tool.def.name.as_str(), "list_issues");
        assert_eq!(tool.def.service.as_str(), "github");
        assert_eq!(tool.qualified_name().to_string(), "github.list_issues");
    }

    #[test]
    fn lookup_unknown_tool_fails() {
        let registry = Registry::new();
        let err = registry
            .lookup(&ToolName::new_unchecked("list_issues"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ToolNotFound(_)));
    }

    #[test]
    fn duplicate_service_id_is_rejected_without_mutation() {
        let registry = Registry::new();
        registry
            .register(StubService::new("github", &["list_issues"]))
            .unwrap();

        let err = registry
            .register(StubService::new("github", &["other_tool"]))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateService(ServiceId::new_unchecked("github"))
        );

        // The prior registration is intact and nothing from the rejected one
        // leaked in.
        assert_eq!(registry.len(), 1);
        assert!(
            registry
                .lookup(&ToolName::new_unchecked("other_tool"))
                .is_err()
        );
    }

    #[test]
    fn duplicate_tool_name_rejects_the_whole_registration() {
        let registry = Registry::new();
        registry
            .register(StubService::new("service-a", &["sync"]))
            .unwrap();

        let err = registry
            .register(StubService::new("service-b", &["export", "sync"]))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateTool {
                tool: ToolName::new_unchecked("sync"),
                owner: ServiceId::new_unchecked("service-a"),
            }
        );

        // Atomic rollback: none of service-b is visible, and `sync` still
        // belongs to service-a.
        assert!(registry.get_service(&ServiceId::new_unchecked("service-b")).is_err());
        assert!(registry.lookup(&ToolName::new_unchecked("export")).is_err());
        let sync = registry.lookup(&ToolName::new_unchecked("sync")).unwrap();
        assert_eq!(sync.def.service.as_str(), "service-a");
    }

    #[test]
    fn duplicate_tool_inside_one_manifest_is_rejected() {
        let registry = Registry::new();
        let err = registry
            .register(StubService::new("service-a", &["sync", "sync"]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTool { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn listings_preserve_registration_order() {
        let registry = Registry::new();
        registry
            .register(StubService::new("github", &["list_issues"]))
            .unwrap();
        registry
            .register(StubService::new("linear", &["list_tickets"]))
            .unwrap();

        let services = registry.list_services();
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].id.as_str(), "github");
        assert_eq!(services[1].id.as_str(), "linear");

        let tools = registry.list_tools();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name.as_str(), "list_issues");
        assert_eq!(tools[0].service.as_str(), "github");
        assert_eq!(tools[1].name.as_str(), "list_tickets");
        assert_eq!(tools[1].service.as_str(), "linear");
    }

    #[test]
    fn tool_count_matches_sum_of_declared_tools() {
        let registry = Registry::new();
        registry
            .register(StubService::new("github", &["list_repos", "list_issues"]))
            .unwrap();
        registry
            .register(StubService::new("linear", &["list_teams"]))
            .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.list_tools().len(), 3);
    }

    #[test]
    fn list_tools_for_filters_by_owner() {
        let registry = Registry::new();
        registry
            .register(StubService::new("github", &["list_repos", "list_issues"]))
            .unwrap();
        registry
            .register(StubService::new("linear", &["list_teams"]))
            .unwrap();

        let github = registry
            .list_tools_for(&ServiceId::new_unchecked("github"))
            .unwrap();
        assert_eq!(github.len(), 2);
        assert!(github.iter().all(|t| t.service.as_str() == "github"));

        let missing = registry.list_tools_for(&ServiceId::new_unchecked("jira"));
        assert!(matches!(missing, Err(RegistryError::ServiceNotFound(_))));
    }

    #[test]
    fn qualified_lookup_resolves_the_same_tool_as_bare_lookup() {
        let registry = Registry::new();
        registry
            .register(StubService::new("github", &["list_issues"]))
            .unwrap();

        let bare = registry
            .lookup(&ToolName::new_unchecked("list_issues"))
            .unwrap();
        let qualified = registry
            .lookup_qualified(
                &ServiceId::new_unchecked("github"),
                &ToolName::new_unchecked("list_issues"),
            )
            .unwrap();
        assert!(Arc::ptr_eq(&bare, &qualified));
    }

    #[test]
    fn qualified_lookup_does_not_route_across_services() {
        let registry = Registry::new();
        registry
            .register(StubService::new("github", &["list_issues"]))
            .unwrap();
        registry
            .register(StubService::new("linear", &["list_tickets"]))
            .unwrap();

        // The name exists, but under a different owner.
        let err = registry
            .lookup_qualified(
                &ServiceId::new_unchecked("linear"),
                &ToolName::new_unchecked("list_issues"),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::ToolNotFound(_)));

        // Unknown service is distinguished from unknown tool.
        let err = registry
            .lookup_qualified(
                &ServiceId::new_unchecked("jira"),
                &ToolName::new_unchecked("list_issues"),
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::ServiceNotFound(_)));
    }

    #[test]
    fn unregister_removes_service_and_frees_tool_names() {
        let registry = Registry::new();
        registry
            .register(StubService::new("github", &["list_issues"]))
            .unwrap();
        registry
            .unregister(&ServiceId::new_unchecked("github"))
            .unwrap();

        assert!(registry.is_empty());
        assert!(registry.list_services().is_empty());
        assert!(
            registry
                .lookup(&ToolName::new_unchecked("list_issues"))
                .is_err()
        );

        // The freed name can be bound again by a different service.
        registry
            .register(StubService::new("gitlab", &["list_issues"]))
            .unwrap();
        let tool = registry
            .lookup(&ToolName::new_unchecked("list_issues"))
            .unwrap();
        assert_eq!(tool.def.service.as_str(), "gitlab");
    }

    #[test]
    fn unregister_unknown_service_fails() {
        let registry = Registry::new();
        let err = registry
            .unregister(&ServiceId::new_unchecked("github"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::ServiceNotFound(_)));
    }
}
