//! Role, identity and credential resolution.

use std::env;
use std::fmt;

use uuid::Uuid;

/// Which generator executable this process is standing in for. The role only
/// changes the environment variables consulted for credentials.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Agent,
    Producer,
}

impl Role {
    fn env_prefix(&self) -> &'static str {
        match self {
            Role::Agent => "COMM_INFRA_AGENT",
            Role::Producer => "COMM_INFRA_PRODUCER",
        }
    }

    pub fn username_var(&self) -> String {
        format!("{}_USERNAME", self.env_prefix())
    }

    pub fn password_var(&self) -> String {
        format!("{}_PASSWORD", self.env_prefix())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Agent => write!(f, "agent"),
            Role::Producer => write!(f, "producer"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Immutable per-process identity, resolved once at startup and passed down
/// by value. `client_id` never changes for the lifetime of the process.
#[derive(Clone, Debug)]
pub struct Identity {
    pub client_id: String,
    pub credentials: Credentials,
}

impl Identity {
    /// Resolve from the role's environment variables. Absent configuration is
    /// a valid case, not an error: it falls back to guest/guest with a fresh
    /// random client id.
    pub fn resolve(role: Role) -> Self {
        Self::from_parts(
            env::var(role.username_var()).ok(),
            env::var(role.password_var()).ok(),
        )
    }

    /// Both variables set: credentials verbatim, client id equals the
    /// username. Anything else: guest/guest and a UUID v4 client id.
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Self {
        match (username, password) {
            (Some(username), Some(password)) => Identity {
                client_id: username.clone(),
                credentials: Credentials { username, password },
            },
            _ => Identity {
                client_id: Uuid::new_v4().to_string(),
                credentials: Credentials {
                    username: "guest".to_string(),
                    password: "guest".to_string(),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_supplied_credentials_are_used_verbatim() {
        let identity =
            Identity::from_parts(Some("alice".to_string()), Some("secret".to_string()));
        assert_eq!(identity.client_id, "alice");
        assert_eq!(identity.credentials.username, "alice");
        assert_eq!(identity.credentials.password, "secret");
    }

    #[test]
    fn missing_credentials_fall_back_to_guest_and_random_id() {
        let identity = Identity::from_parts(None, None);
        assert_eq!(identity.credentials.username, "guest");
        assert_eq!(identity.credentials.password, "guest");
        // UUID v4 textual form
        assert_eq!(identity.client_id.len(), 36);
    }

    #[test]
    fn partial_credentials_count_as_missing() {
        let identity = Identity::from_parts(Some("alice".to_string()), None);
        assert_eq!(identity.credentials.username, "guest");
        assert_ne!(identity.client_id, "alice");
    }

    #[test]
    fn fallback_identity_is_fresh_each_resolution() {
        let a = Identity::from_parts(None, None);
        let b = Identity::from_parts(None, None);
        assert_ne!(a.client_id, b.client_id);
    }

    #[test]
    fn role_env_var_names() {
        assert_eq!(Role::Agent.username_var(), "COMM_INFRA_AGENT_USERNAME");
        assert_eq!(Role::Producer.password_var(), "COMM_INFRA_PRODUCER_PASSWORD");
    }
}
