use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::client::SlackClient;
use super::error::ApiError;

#[derive(Debug, Clone, Copy)]
enum Namespace {
    User,
    Channel,
    Group,
}

impl Namespace {
    fn as_str(self) -> &'static str {
        match self {
            Namespace::User => "user",
            Namespace::Channel => "channel",
            Namespace::Group => "group",
        }
    }
}

/// Memoizes id to display-name lookups for the lifetime of a run.
///
/// Users, channels and groups are separate namespaces with separate maps.
/// Each map is append-only: a successful lookup is cached forever, a failed
/// one is not, so retrying the same id later hits the network again. Safe
/// to share across concurrent downloads; two in-flight lookups of one id
/// may both call the API and both insert the same name, which is harmless.
pub struct NameResolver {
    client: SlackClient,
    users: Mutex<HashMap<String, String>>,
    channels: Mutex<HashMap<String, String>>,
    groups: Mutex<HashMap<String, String>>,
}

impl NameResolver {
    pub fn new(client: SlackClient) -> Self {
        Self {
            client,
            users: Mutex::new(HashMap::new()),
            channels: Mutex::new(HashMap::new()),
            groups: Mutex::new(HashMap::new()),
        }
    }

    pub async fn user_name(&self, id: &str) -> Result<String, ApiError> {
        self.resolve(Namespace::User, id).await
    }

    pub async fn channel_name(&self, id: &str) -> Result<String, ApiError> {
        self.resolve(Namespace::Channel, id).await
    }

    pub async fn group_name(&self, id: &str) -> Result<String, ApiError> {
        self.resolve(Namespace::Group, id).await
    }

    async fn resolve(&self, namespace: Namespace, id: &str) -> Result<String, ApiError> {
        if let Some(name) = lock(self.map(namespace)).get(id).cloned() {
            debug!(namespace = namespace.as_str(), id, name = %name, "Name cache hit");
            return Ok(name);
        }

        // No guard is held across this await.
        let name = match namespace {
            Namespace::User => self.client.user_name(id).await?,
            Namespace::Channel => self.client.channel_name(id).await?,
            Namespace::Group => self.client.group_name(id).await?,
        };

        lock(self.map(namespace)).insert(id.to_string(), name.clone());
        debug!(namespace = namespace.as_str(), id, name = %name, "Resolved name");
        Ok(name)
    }

    fn map(&self, namespace: Namespace) -> &Mutex<HashMap<String, String>> {
        match namespace {
            Namespace::User => &self.users,
            Namespace::Channel => &self.channels,
            Namespace::Group => &self.groups,
        }
    }
}

/// A poisoned map still holds only fully inserted entries, so it stays
/// usable.
fn lock(map: &Mutex<HashMap<String, String>>) -> MutexGuard<'_, HashMap<String, String>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}
