//! Keyed collections held by the store.

use crate::error::{Entity, LifecycleError};
use crate::types::{
    Component, ComponentId, ComponentRequest, RequestId, RequestStatus, User, UserDetails, UserId,
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Component catalog
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    components: HashMap<ComponentId, Component>,
}

impl Catalog {
    /// Creates an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a component by ID
    #[must_use]
    pub fn get(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// Gets a component or reports it missing
    ///
    /// # Errors
    ///
    /// [`LifecycleError::NotFound`] if no component has this id.
    pub fn require(&self, id: &ComponentId) -> Result<&Component, LifecycleError> {
        self.components
            .get(id)
            .ok_or_else(|| LifecycleError::not_found(Entity::Component, id))
    }

    /// Gets a mutable component by ID
    pub fn get_mut(&mut self, id: &ComponentId) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    /// Checks if a component exists
    #[must_use]
    pub fn exists(&self, id: &ComponentId) -> bool {
        self.components.contains_key(id)
    }

    /// Inserts or replaces a component
    pub fn insert(&mut self, component: Component) {
        self.components.insert(component.id.clone(), component);
    }

    /// Removes a component
    pub fn remove(&mut self, id: &ComponentId) -> Option<Component> {
        self.components.remove(id)
    }

    /// Components ordered by name
    #[must_use]
    pub fn list_by_name(&self) -> Vec<Component> {
        let mut components: Vec<Component> = self.components.values().cloned().collect();
        components.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        components
    }

    /// Number of components
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// All component requests
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestBook {
    requests: HashMap<RequestId, ComponentRequest>,
}

impl RequestBook {
    /// Creates an empty book
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a request by ID
    #[must_use]
    pub fn get(&self, id: &RequestId) -> Option<&ComponentRequest> {
        self.requests.get(id)
    }

    /// Gets a request or reports it missing
    ///
    /// # Errors
    ///
    /// [`LifecycleError::NotFound`] if no request has this id.
    pub fn require(&self, id: &RequestId) -> Result<&ComponentRequest, LifecycleError> {
        self.requests
            .get(id)
            .ok_or_else(|| LifecycleError::not_found(Entity::Request, id))
    }

    /// Gets a mutable request by ID
    pub fn get_mut(&mut self, id: &RequestId) -> Option<&mut ComponentRequest> {
        self.requests.get_mut(id)
    }

    /// Checks if a request exists
    #[must_use]
    pub fn exists(&self, id: &RequestId) -> bool {
        self.requests.contains_key(id)
    }

    /// Inserts or replaces a request
    pub fn insert(&mut self, request: ComponentRequest) {
        self.requests.insert(request.id.clone(), request);
    }

    /// Iterates in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &ComponentRequest> {
        self.requests.values()
    }

    /// Requests newest first
    #[must_use]
    pub fn list_newest_first(&self) -> Vec<ComponentRequest> {
        self.select(|_| true)
    }

    /// Requests in `status`, newest first
    #[must_use]
    pub fn with_status(&self, status: RequestStatus) -> Vec<ComponentRequest> {
        self.select(|request| request.status == status)
    }

    /// Approval queue
    #[must_use]
    pub fn pending(&self) -> Vec<ComponentRequest> {
        self.with_status(RequestStatus::Pending)
    }

    /// Requests with units still out
    #[must_use]
    pub fn outstanding(&self) -> Vec<ComponentRequest> {
        self.select(|request| request.status.accepts_returns())
    }

    /// Requests submitted by `user_id`, newest first
    #[must_use]
    pub fn for_user(&self, user_id: &UserId) -> Vec<ComponentRequest> {
        self.select(|request| &request.user_id == user_id)
    }

    /// Number of requests
    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the book is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    fn select(&self, keep: impl Fn(&ComponentRequest) -> bool) -> Vec<ComponentRequest> {
        let mut requests: Vec<ComponentRequest> = self
            .requests
            .values()
            .filter(|request| keep(request))
            .cloned()
            .collect();
        requests.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        requests
    }
}

/// Known members
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserDirectory {
    users: HashMap<UserId, User>,
}

impl UserDirectory {
    /// Creates an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a user by ID
    #[must_use]
    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    /// Gets a mutable user by ID
    pub fn get_mut(&mut self, id: &UserId) -> Option<&mut User> {
        self.users.get_mut(id)
    }

    /// Inserts or replaces a user
    pub fn insert(&mut self, user: User) {
        self.users.insert(user.id.clone(), user);
    }

    /// Records submitted details, keeping the first-seen time of a known user
    pub fn upsert(&mut self, id: UserId, details: UserDetails, now: DateTime<Utc>) -> User {
        let user = self
            .users
            .entry(id.clone())
            .and_modify(|user| user.apply_details(details.clone()))
            .or_insert_with(|| User::from_details(id, details, now));
        user.clone()
    }

    /// Users newest first
    #[must_use]
    pub fn list_newest_first(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        users
    }

    /// Number of users
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the directory is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Everything the lending desk store owns
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeskState {
    /// Component catalog
    pub catalog: Catalog,
    /// Component requests
    pub requests: RequestBook,
    /// Members
    pub users: UserDirectory,
}

impl DeskState {
    /// Creates an empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State with these components and nothing else
    #[must_use]
    pub fn with_components(components: impl IntoIterator<Item = Component>) -> Self {
        let mut state = Self::new();
        for component in components {
            state.catalog.insert(component);
        }
        state
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn component(id: &str, name: &str) -> Component {
        Component {
            id: ComponentId::from(id),
            name: name.to_string(),
            description: String::new(),
            quantity: 1,
            icon: "Cpu".to_string(),
        }
    }

    fn request(id: &str, user: &str, status: RequestStatus, age_days: i64) -> ComponentRequest {
        ComponentRequest {
            id: RequestId::from(id),
            user_id: UserId::from(user),
            user_name: user.to_string(),
            department: String::new(),
            year: String::new(),
            items: Vec::new(),
            purpose: String::new(),
            status,
            created_at: DateTime::<Utc>::UNIX_EPOCH + Duration::days(100 - age_days),
            approved_at: None,
        }
    }

    fn details(name: &str) -> UserDetails {
        UserDetails {
            name: name.to_string(),
            email: format!("{}@example.edu", name.to_lowercase()),
            department: "Physics".to_string(),
            year: "1st".to_string(),
        }
    }

    #[test]
    fn catalog_lists_by_name() {
        let state = DeskState::with_components([
            component("2", "Raspberry Pi 4"),
            component("1", "Arduino Uno"),
            component("3", "DHT11 Sensor"),
        ]);

        let names: Vec<String> = state
            .catalog
            .list_by_name()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Arduino Uno", "DHT11 Sensor", "Raspberry Pi 4"]);
    }

    #[test]
    fn require_reports_missing_component() {
        let catalog = Catalog::new();
        assert_eq!(
            catalog.require(&ComponentId::from("9")).unwrap_err(),
            LifecycleError::not_found(Entity::Component, "9")
        );
    }

    #[test]
    fn request_views_are_newest_first() {
        let mut book = RequestBook::new();
        book.insert(request("old", "alice", RequestStatus::Pending, 5));
        book.insert(request("new", "bob", RequestStatus::Pending, 1));
        book.insert(request("out", "alice", RequestStatus::PartiallyReturned, 3));
        book.insert(request("done", "alice", RequestStatus::Returned, 2));

        let ids = |requests: Vec<ComponentRequest>| -> Vec<String> {
            requests.into_iter().map(|r| r.id.to_string()).collect()
        };

        assert_eq!(ids(book.list_newest_first()), vec!["new", "done", "out", "old"]);
        assert_eq!(ids(book.pending()), vec!["new", "old"]);
        assert_eq!(ids(book.outstanding()), vec!["out"]);
        assert_eq!(
            ids(book.for_user(&UserId::from("alice"))),
            vec!["done", "out", "old"]
        );
    }

    #[test]
    fn upsert_keeps_first_seen_time() {
        let mut users = UserDirectory::new();
        let first = DateTime::<Utc>::UNIX_EPOCH;
        let later = first + Duration::days(3);

        users.upsert(UserId::from("u1"), details("Alice"), first);
        let updated = users.upsert(UserId::from("u1"), details("Alicia"), later);

        assert_eq!(updated.created_at, first);
        assert_eq!(updated.name, "Alicia");
        assert_eq!(users.len(), 1);
    }
}
