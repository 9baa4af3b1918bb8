use anyhow::anyhow;
use std::env;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

/// Identity forwarded to the registry in the `x-actor-*` headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorIdentity {
    pub id: String,
    pub name: Option<String>,
    pub role: String,
}

impl ActorIdentity {
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            role: role.into(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api_base_url: String,
    pub actor: Option<ActorIdentity>,
}

impl ConsoleConfig {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_base_url = read("CIVREG_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(anyhow!(
                "CIVREG_API_BASE_URL must start with http:// or https://"
            ));
        }

        let actor = read("CIVREG_ACTOR_ID").map(|id| ActorIdentity {
            id,
            name: read("CIVREG_ACTOR_NAME"),
            role: read("CIVREG_ACTOR_ROLE").unwrap_or_else(|| "staff".to_string()),
        });

        Ok(ConsoleConfig {
            api_base_url,
            actor,
        })
    }
}
