//! Linear service adapter.
//!
//! Serves team, ticket, and member tools from a fixture store seeded at
//! construction time. Tool names are distinct from the GitHub adapter's, so
//! both services can register under the flat bare-name index.

use std::env;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use toolbridge_core::{
    CredentialRef, HandlerError, InputSchema, ParamSpec, ServiceAdapter, ServiceId,
    ServiceManifest, ToolDef, ToolName,
};

/// Environment variable holding the Linear API credential.
pub const LINEAR_TOKEN_VAR: &str = "TOOLBRIDGE_LINEAR_TOKEN";

const SERVICE_ID: &str = "linear";

#[derive(Debug, Clone, Serialize)]
struct Team {
    id: &'static str,
    name: &'static str,
    key: &'static str,
    description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct Ticket {
    id: String,
    team_id: String,
    title: String,
    description: String,
    state: String,
    priority: u64,
    labels: Vec<String>,
    assignee_id: String,
}

#[derive(Debug, Clone, Serialize)]
struct Member {
    id: &'static str,
    name: &'static str,
    email: &'static str,
    active: bool,
}

fn seed_teams() -> Vec<Team> {
    vec![
        Team {
            id: "team1",
            name: "Engineering",
            key: "ENG",
            description: "Engineering team",
        },
        Team {
            id: "team2",
            name: "Product",
            key: "PROD",
            description: "Product team",
        },
        Team {
            id: "team3",
            name: "Security",
            key: "SEC",
            description: "Security team",
        },
    ]
}

fn seed_tickets() -> Vec<Ticket> {
    vec![
        Ticket {
            id: "ticket1".into(),
            team_id: "team1".into(),
            title: "Implement new feature".into(),
            description: "Implement the new user profile feature".into(),
            state: "todo".into(),
            priority: 1,
            labels: vec!["feature".into(), "frontend".into()],
            assignee_id: "user1".into(),
        },
        Ticket {
            id: "ticket2".into(),
            team_id: "team1".into(),
            title: "Fix login bug".into(),
            description: "Users can't log in with certain email domains".into(),
            state: "in_progress".into(),
            priority: 2,
            labels: vec!["bug".into(), "critical".into()],
            assignee_id: "user2".into(),
        },
        Ticket {
            id: "ticket3".into(),
            team_id: "team3".into(),
            title: "Security audit findings".into(),
            description: "Address security findings from the recent audit".into(),
            state: "todo".into(),
            priority: 0,
            labels: vec!["security".into(), "urgent".into()],
            assignee_id: "user1".into(),
        },
        Ticket {
            id: "ticket4".into(),
            team_id: "team2".into(),
            title: "Update pricing page".into(),
            description: "Update the pricing page with new plans".into(),
            state: "done".into(),
            priority: 3,
            labels: vec!["marketing".into()],
            assignee_id: "user3".into(),
        },
    ]
}

fn seed_members() -> Vec<Member> {
    vec![
        Member {
            id: "user1",
            name: "Alice Smith",
            email: "alice@example.com",
            active: true,
        },
        Member {
            id: "user2",
            name: "Bob Johnson",
            email: "bob@example.com",
            active: true,
        },
        Member {
            id: "user3",
            name: "Charlie Brown",
            email: "charlie@example.com",
            active: false,
        },
    ]
}

/// Adapter for the Linear backend.
pub struct LinearService {
    credential: CredentialRef,
    teams: Vec<Team>,
    members: Vec<Member>,
    tickets: RwLock<Vec<Ticket>>,
}

impl LinearService {
    pub fn new(credential: CredentialRef) -> Self {
        Self {
            credential,
            teams: seed_teams(),
            members: seed_members(),
            tickets: RwLock::new(seed_tickets()),
        }
    }

    /// Build the adapter with the credential taken from the environment.
    pub fn from_env() -> Self {
        let token = env::var(LINEAR_TOKEN_VAR).unwrap_or_else(|_| "unset".to_string());
        Self::new(CredentialRef::new(token))
    }

    fn list_teams(&self) -> Value {
        json!(self.teams)
    }

    fn list_tickets(&self, params: &Value) -> Value {
        let team_id = params.get("team_id").and_then(Value::as_str);
        let state = params.get("state").and_then(Value::as_str);
        let assignee_id = params.get("assignee_id").and_then(Value::as_str);
        let priority = params.get("priority").and_then(Value::as_u64);

        let tickets = self.tickets.read().unwrap_or_else(|e| e.into_inner());
        let matches: Vec<&Ticket> = tickets
            .iter()
            .filter(|ticket| team_id.is_none_or(|id| ticket.team_id == id))
            .filter(|ticket| state.is_none_or(|s| ticket.state == s))
            .filter(|ticket| assignee_id.is_none_or(|id| ticket.assignee_id == id))
            .filter(|ticket| priority.is_none_or(|p| ticket.priority == p))
            .collect();
        json!(matches)
    }

    fn get_member(&self, params: &Value) -> Result<Value, HandlerError> {
        let member_id = params.get("member_id").and_then(Value::as_str);
        let email = params.get("email").and_then(Value::as_str);

        let member = self.members.iter().find(|member| {
            member_id.is_some_and(|id| member.id == id)
                || email.is_some_and(|e| member.email == e)
        });
        match member {
            Some(member) => Ok(json!(member)),
            None => Err(HandlerError::upstream_with_detail(
                "member not found",
                json!({"member_id": member_id, "email": email}),
            )),
        }
    }

    fn create_ticket(&self, params: &Value) -> Result<Value, HandlerError> {
        let team_id = params
            .get("team_id")
            .and_then(Value::as_str)
            .ok_or_else(|| HandlerError::upstream("team_id and title are required"))?;
        let title = params
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| HandlerError::upstream("team_id and title are required"))?;

        if !self.teams.iter().any(|team| team.id == team_id) {
            return Err(HandlerError::upstream_with_detail(
                format!("team '{team_id}' not found"),
                json!({"team_id": team_id}),
            ));
        }

        let description = params
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let priority = params.get("priority").and_then(Value::as_u64).unwrap_or(3);
        let assignee_id = params
            .get("assignee_id")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let mut tickets = self.tickets.write().unwrap_or_else(|e| e.into_inner());
        let ticket = Ticket {
            id: format!("ticket{}", tickets.len() + 1),
            team_id: team_id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            state: "todo".into(),
            priority,
            labels: Vec::new(),
            assignee_id: assignee_id.to_string(),
        };
        let created = json!(ticket);
        tickets.push(ticket);
        Ok(created)
    }
}

#[async_trait]
impl ServiceAdapter for LinearService {
    fn manifest(&self) -> ServiceManifest {
        ServiceManifest::new(
            ServiceId::new_unchecked(SERVICE_ID),
            "Linear",
            "Linear API service for project management",
            "https://api.linear.app",
            self.credential.clone(),
        )
        .with_tool(ToolDef::new(
            ToolName::new_unchecked("list_teams"),
            "List Linear teams",
            InputSchema::new(),
        ))
        .with_tool(ToolDef::new(
            ToolName::new_unchecked("list_tickets"),
            "List Linear tickets",
            InputSchema::new()
                .property("team_id", ParamSpec::string("Team ID to filter tickets by"))
                .property(
                    "state",
                    ParamSpec::string("Ticket state (todo, in_progress, done)"),
                )
                .property("assignee_id", ParamSpec::string("Assignee to filter tickets by"))
                .property("priority", ParamSpec::integer("Priority to filter tickets by")),
        ))
        .with_tool(ToolDef::new(
            ToolName::new_unchecked("get_member"),
            "Get a Linear member by ID or email",
            InputSchema::new()
                .property("member_id", ParamSpec::string("Member ID"))
                .property("email", ParamSpec::string("Member email")),
        ))
        .with_tool(ToolDef::new(
            ToolName::new_unchecked("create_ticket"),
            "Create a new Linear ticket",
            InputSchema::new()
                .property("team_id", ParamSpec::string("Team ID"))
                .property("title", ParamSpec::string("Ticket title"))
                .property("description", ParamSpec::string("Ticket description"))
                .property("priority", ParamSpec::integer("Ticket priority (0-3)"))
                .property("assignee_id", ParamSpec::string("Assignee ID"))
                .required("team_id")
                .required("title"),
        ))
    }

    async fn handle(&self, tool: &ToolName, params: Value) -> Result<Value, HandlerError> {
        tracing::debug!(tool = %tool, "Executing Linear tool");
        match tool.as_str() {
            "list_teams" => Ok(self.list_teams()),
            "list_tickets" => Ok(self.list_tickets(&params)),
            "get_member" => self.get_member(&params),
            "create_ticket" => self.create_ticket(&params),
            other => Err(HandlerError::internal(format!(
                "tool '{other}' is not provided by the linear service"
            ))),
        }
    }
}
