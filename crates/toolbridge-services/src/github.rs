//! GitHub service adapter.
//!
//! Serves repository, issue, and user tools from a fixture store seeded at
//! construction time. Created issues are kept in the adapter's own store, so
//! repeated calls observe them; the store is behind the adapter's own lock,
//! which is all the synchronization concurrent executions need.

use std::env;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use toolbridge_core::{
    CredentialRef, HandlerError, InputSchema, ParamSpec, ServiceAdapter, ServiceId,
    ServiceManifest, ToolDef, ToolName,
};

/// Environment variable holding the GitHub API credential.
pub const GITHUB_TOKEN_VAR: &str = "TOOLBRIDGE_GITHUB_TOKEN";

const SERVICE_ID: &str = "github";

#[derive(Debug, Clone, Serialize)]
struct Repo {
    id: u64,
    name: &'static str,
    private: bool,
    description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct Issue {
    id: u64,
    repo_id: u64,
    title: String,
    body: String,
    labels: Vec<String>,
    state: String,
}

#[derive(Debug, Clone, Serialize)]
struct User {
    id: u64,
    username: &'static str,
    email: &'static str,
    role: &'static str,
}

fn seed_repos() -> Vec<Repo> {
    vec![
        Repo {
            id: 1,
            name: "security-project",
            private: false,
            description: "A project about security",
        },
        Repo {
            id: 2,
            name: "private-repo",
            private: true,
            description: "Contains sensitive data",
        },
        Repo {
            id: 3,
            name: "public-apis",
            private: false,
            description: "Collection of public APIs",
        },
    ]
}

fn seed_issues() -> Vec<Issue> {
    vec![
        Issue {
            id: 101,
            repo_id: 1,
            title: "Security vulnerability found".into(),
            body: "Found a critical security issue in the authentication module".into(),
            labels: vec!["security".into(), "critical".into()],
            state: "open".into(),
        },
        Issue {
            id: 102,
            repo_id: 1,
            title: "Update documentation".into(),
            body: "Documentation needs to be updated for the new features".into(),
            labels: vec!["documentation".into()],
            state: "closed".into(),
        },
        Issue {
            id: 104,
            repo_id: 3,
            title: "Add new API endpoints".into(),
            body: "Need to add endpoints for the new features".into(),
            labels: vec!["enhancement".into()],
            state: "open".into(),
        },
    ]
}

fn seed_users() -> Vec<User> {
    vec![
        User {
            id: 201,
            username: "admin",
            email: "admin@example.com",
            role: "admin",
        },
        User {
            id: 202,
            username: "developer",
            email: "dev@example.com",
            role: "developer",
        },
        User {
            id: 203,
            username: "guest",
            email: "guest@example.com",
            role: "guest",
        },
    ]
}

/// Adapter for the GitHub backend.
pub struct GithubService {
    credential: CredentialRef,
    repos: Vec<Repo>,
    users: Vec<User>,
    issues: RwLock<Vec<Issue>>,
}

impl GithubService {
    pub fn new(credential: CredentialRef) -> Self {
        Self {
            credential,
            repos: seed_repos(),
            users: seed_users(),
            issues: RwLock::new(seed_issues()),
        }
    }

    /// Build the adapter with the credential taken from the environment.
    pub fn from_env() -> Self {
        let token = env::var(GITHUB_TOKEN_VAR).unwrap_or_else(|_| "unset".to_string());
        Self::new(CredentialRef::new(token))
    }

    fn list_repos(&self, params: &Value) -> Value {
        let include_private = params
            .get("include_private")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let repos: Vec<&Repo> = self
            .repos
            .iter()
            .filter(|repo| include_private || !repo.private)
            .collect();
        json!(repos)
    }

    fn list_issues(&self, params: &Value) -> Value {
        let repo_id = params.get("repo_id").and_then(Value::as_u64);
        let state = params.get("state").and_then(Value::as_str);
        let labels: Vec<&str> = params
            .get("labels")
            .and_then(Value::as_array)
            .map(|values| values.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let issues = self.issues.read().unwrap_or_else(|e| e.into_inner());
        let matches: Vec<&Issue> = issues
            .iter()
            .filter(|issue| repo_id.is_none_or(|id| issue.repo_id == id))
            .filter(|issue| state.is_none_or(|s| issue.state == s))
            .filter(|issue| {
                labels.is_empty() || labels.iter().any(|l| issue.labels.iter().any(|il| il == l))
            })
            .collect();
        json!(matches)
    }

    fn get_user(&self, params: &Value) -> Result<Value, HandlerError> {
        let user_id = params.get("user_id").and_then(Value::as_u64);
        let username = params.get("username").and_then(Value::as_str);

        let user = self.users.iter().find(|user| {
            user_id.is_some_and(|id| user.id == id)
                || username.is_some_and(|name| user.username == name)
        });
        match user {
            Some(user) => Ok(json!(user)),
            None => Err(HandlerError::upstream_with_detail(
                "user not found",
                json!({"user_id": user_id, "username": username}),
            )),
        }
    }

    fn create_issue(&self, params: &Value) -> Result<Value, HandlerError> {
        // repo_id and title presence is enforced by the input contract; the
        // repository itself still has to exist.
        let repo_id = params
            .get("repo_id")
            .and_then(Value::as_u64)
            .ok_or_else(|| HandlerError::upstream("repo_id and title are required"))?;
        let title = params
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| HandlerError::upstream("repo_id and title are required"))?;

        if !self.repos.iter().any(|repo| repo.id == repo_id) {
            return Err(HandlerError::upstream_with_detail(
                format!("repository with id {repo_id} not found"),
                json!({"repo_id": repo_id}),
            ));
        }

        let body = params
            .get("body")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let labels: Vec<String> = params
            .get("labels")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let mut issues = self.issues.write().unwrap_or_else(|e| e.into_inner());
        let next_id = issues.iter().map(|issue| issue.id).max().unwrap_or(100) + 1;
        let issue = Issue {
            id: next_id,
            repo_id,
            title: title.to_string(),
            body: body.to_string(),
            labels,
            state: "open".into(),
        };
        let created = json!(issue);
        issues.push(issue);
        Ok(created)
    }
}

#[async_trait]
impl ServiceAdapter for GithubService {
    fn manifest(&self) -> ServiceManifest {
        ServiceManifest::new(
            ServiceId::new_unchecked(SERVICE_ID),
            "GitHub",
            "GitHub API service for repository management",
            "https://api.github.com",
            self.credential.clone(),
        )
        .with_tool(ToolDef::new(
            ToolName::new_unchecked("list_repos"),
            "List GitHub repositories",
            InputSchema::new().property(
                "include_private",
                ParamSpec::boolean("Whether to include private repositories"),
            ),
        ))
        .with_tool(ToolDef::new(
            ToolName::new_unchecked("list_issues"),
            "List GitHub issues",
            InputSchema::new()
                .property("repo_id", ParamSpec::integer("Repository ID to filter issues by"))
                .property("state", ParamSpec::string("Issue state (open, closed)"))
                .property("labels", ParamSpec::array("Labels to filter issues by")),
        ))
        .with_tool(ToolDef::new(
            ToolName::new_unchecked("get_user"),
            "Get a GitHub user by ID or username",
            InputSchema::new()
                .property("user_id", ParamSpec::integer("User ID"))
                .property("username", ParamSpec::string("Username")),
        ))
        .with_tool(ToolDef::new(
            ToolName::new_unchecked("create_issue"),
            "Create a new GitHub issue",
            InputSchema::new()
                .property("repo_id", ParamSpec::integer("Repository ID"))
                .property("title", ParamSpec::string("Issue title"))
                .property("body", ParamSpec::string("Issue body"))
                .property("labels", ParamSpec::array("Issue labels"))
                .required("repo_id")
                .required("title"),
        ))
    }

    async fn handle(&self, tool: &ToolName, params: Value) -> Result<Value, HandlerError> {
        tracing::debug!(tool = %tool, "Executing GitHub tool");
        match tool.as_str() {
            "list_repos" => Ok(self.list_repos(&params)),
            "list_issues" => Ok(self.list_issues(&params)),
            "get_user" => self.get_user(&params),
            "create_issue" => self.create_issue(&params),
            other => Err(HandlerError::internal(format!(
                "tool '{other}' is not provided by the github service"
            ))),
        }
    }
}
