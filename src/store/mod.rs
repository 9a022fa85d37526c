//! Client-side caches for backend collections.
//!
//! An [`EntityStore`] owns the list of entities for one collection. Callers
//! only read projections of it; every change goes through an operation that
//! calls the backend and patches the list from the response.

pub mod subscriptions;
pub mod users;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{RwLock, watch};

use crate::api::EntityApi;
use crate::error::Result;
use crate::notify::{Notice, Notifier};
use crate::session::SessionSignal;

pub use subscriptions::SubscriptionStore;
pub use users::UserStore;

pub trait Entity: Clone + Send + Sync + 'static {
    /// Payload for creating a new entity; the backend assigns the id.
    type Draft: Serialize + Send + Sync;
    /// Payload for updating an existing entity.
    type Changes: Serialize + Send + Sync;
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// Point-in-time copy of a store.
#[derive(Debug, Clone)]
pub struct StoreSnapshot<E> {
    pub entities: Vec<E>,
    pub loading: bool,
    pub error: Option<String>,
}

struct StoreState<E> {
    entities: Vec<E>,
    outstanding: usize,
    error: Option<String>,
    // latest request generation per key; older responses for the key are dropped
    latest: HashMap<String, u64>,
    next_generation: u64,
    session_resets: u64,
}

impl<E> StoreState<E> {
    fn new(session_resets: u64) -> Self {
        Self {
            entities: Vec::new(),
            outstanding: 0,
            error: None,
            latest: HashMap::new(),
            next_generation: 0,
            session_resets,
        }
    }
}

const LIST_KEY: &str = "list";

struct Ticket {
    key: Option<String>,
    generation: u64,
    session_resets: u64,
}

pub struct EntityStore<E, A: ?Sized> {
    api: Arc<A>,
    state: RwLock<StoreState<E>>,
    session: watch::Receiver<SessionSignal>,
    notifier: Arc<dyn Notifier>,
}

impl<E, A> EntityStore<E, A>
where
    E: Entity,
    A: EntityApi<E> + ?Sized,
{
    pub fn new(
        api: Arc<A>,
        session: watch::Receiver<SessionSignal>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let resets = session.borrow().resets;
        Self {
            api,
            state: RwLock::new(StoreState::new(resets)),
            session,
            notifier,
        }
    }

    pub(crate) fn api(&self) -> &A {
        &self.api
    }

    /// Replaces the cached list with the backend's. On failure the previous
    /// list stays in place and only `error` changes.
    pub async fn load(&self) -> Result<()> {
        let ticket = self.begin(Some(LIST_KEY)).await;
        let result = self.api.list().await;
        let result = self
            .finish(ticket, result, |entities, fresh: &Vec<E>| {
                *entities = fresh.clone();
            })
            .await;
        match &result {
            Ok(list) => tracing::debug!(kind = E::KIND, count = list.len(), "list refreshed"),
            Err(e) => tracing::warn!(kind = E::KIND, "list refresh failed, keeping cached data: {}", e),
        }
        result.map(|_| ())
    }

    /// Appends the entity returned by the backend. Nothing is inserted before
    /// the backend answers. If a list refresh already brought the entity in,
    /// that copy is replaced so ids stay unique.
    pub async fn add(&self, draft: &E::Draft) -> Result<E> {
        let ticket = self.begin(None).await;
        let result = self.api.add(draft).await;
        let result = self
            .finish(ticket, result, |entities, created: &E| {
                match entities.iter_mut().find(|e| e.id() == created.id()) {
                    Some(slot) => *slot = created.clone(),
                    None => entities.push(created.clone()),
                }
            })
            .await;
        self.announce("added", &result);
        result
    }

    pub async fn update(&self, id: &str, changes: &E::Changes) -> Result<E> {
        let result = self.replace_with(id, self.api.update(id, changes)).await;
        self.announce("updated", &result);
        result
    }

    /// Removes the entity once the backend confirms. Deleting an id that is
    /// not cached leaves the list as it is.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let ticket = self.begin(Some(id)).await;
        let result = self.api.delete(id).await;
        let result = self
            .finish(ticket, result, |entities, _: &()| {
                entities.retain(|e| e.id() != id);
            })
            .await;
        self.announce("deleted", &result);
        result
    }

    /// Runs `call` as a request for `id` and swaps the returned entity into
    /// the position the old one held.
    pub(crate) async fn replace_with<F>(&self, id: &str, call: F) -> Result<E>
    where
        F: Future<Output = Result<E>>,
    {
        let ticket = self.begin(Some(id)).await;
        let result = call.await;
        self.finish(ticket, result, |entities, updated: &E| {
            if let Some(slot) = entities.iter_mut().find(|e| e.id() == id) {
                *slot = updated.clone();
            }
        })
        .await
    }

    pub async fn entities(&self) -> Vec<E> {
        self.read(|s| s.entities.clone()).await
    }

    pub async fn count(&self) -> usize {
        self.read(|s| s.entities.len()).await
    }

    pub async fn find(&self, id: &str) -> Option<E> {
        self.read(|s| s.entities.iter().find(|e| e.id() == id).cloned())
            .await
    }

    pub async fn filter<P>(&self, predicate: P) -> Vec<E>
    where
        P: Fn(&E) -> bool,
    {
        self.read(|s| s.entities.iter().filter(|e| predicate(e)).cloned().collect())
            .await
    }

    pub async fn loading(&self) -> bool {
        self.read(|s| s.outstanding > 0).await
    }

    pub async fn error(&self) -> Option<String> {
        self.read(|s| s.error.clone()).await
    }

    pub async fn snapshot(&self) -> StoreSnapshot<E> {
        self.read(|s| StoreSnapshot {
            entities: s.entities.clone(),
            loading: s.outstanding > 0,
            error: s.error.clone(),
        })
        .await
    }

    /// Drops cached entities and forgets pending responses.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        Self::clear(&mut state);
    }

    async fn read<R>(&self, f: impl FnOnce(&StoreState<E>) -> R) -> R {
        let mut state = self.state.write().await;
        self.sync_session(&mut state);
        f(&state)
    }

    fn clear(state: &mut StoreState<E>) {
        state.entities.clear();
        state.error = None;
        state.latest.clear();
    }

    fn sync_session(&self, state: &mut StoreState<E>) {
        let resets = self.session.borrow().resets;
        if resets != state.session_resets {
            tracing::info!(kind = E::KIND, "session ended, clearing cached entities");
            Self::clear(state);
            state.session_resets = resets;
        }
    }

    async fn begin(&self, key: Option<&str>) -> Ticket {
        let mut state = self.state.write().await;
        self.sync_session(&mut state);
        state.outstanding += 1;
        state.error = None;
        state.next_generation += 1;
        let generation = state.next_generation;
        if let Some(key) = key {
            state.latest.insert(key.to_string(), generation);
        }
        Ticket {
            key: key.map(str::to_string),
            generation,
            session_resets: state.session_resets,
        }
    }

    async fn finish<T>(
        &self,
        ticket: Ticket,
        result: Result<T>,
        apply: impl FnOnce(&mut Vec<E>, &T),
    ) -> Result<T> {
        let mut state = self.state.write().await;
        self.sync_session(&mut state);
        state.outstanding = state.outstanding.saturating_sub(1);

        let current = ticket.session_resets == state.session_resets
            && match &ticket.key {
                Some(key) => state.latest.get(key) == Some(&ticket.generation),
                None => true,
            };
        if !current {
            tracing::debug!(
                kind = E::KIND,
                key = ticket.key.as_deref().unwrap_or("-"),
                "discarding superseded response"
            );
            return result;
        }
        if let Some(key) = &ticket.key {
            state.latest.remove(key);
        }

        match &result {
            Ok(value) => apply(&mut state.entities, value),
            Err(e) => state.error = Some(e.user_message()),
        }
        result
    }

    fn announce<T>(&self, verb: &str, result: &Result<T>) {
        match result {
            Ok(_) => self
                .notifier
                .notify(Notice::success(format!("{} {}", capitalize(E::KIND), verb))),
            Err(e) => self.notifier.notify(Notice::error(e.user_message())),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory backend shared by the store and console tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::sync::oneshot;

    use super::Entity;
    use crate::api::EntityApi;
    use crate::error::{ConsoleError, Result};

    /// Returns queued responses in order. A queued `Gate` holds the call until
    /// the test releases it, which is how races are staged.
    pub enum Scripted<T> {
        Ready(Result<T>),
        Gate(oneshot::Receiver<Result<T>>),
    }

    pub struct FakeApi<E: Entity> {
        pub lists: Mutex<VecDeque<Scripted<Vec<E>>>>,
        pub adds: Mutex<VecDeque<Scripted<E>>>,
        pub updates: Mutex<VecDeque<Scripted<E>>>,
        pub deletes: Mutex<VecDeque<Scripted<()>>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl<E: Entity> Default for FakeApi<E> {
        fn default() -> Self {
            Self {
                lists: Mutex::new(VecDeque::new()),
                adds: Mutex::new(VecDeque::new()),
                updates: Mutex::new(VecDeque::new()),
                deletes: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    pub fn backend_error(status: u16) -> ConsoleError {
        ConsoleError::Backend {
            status,
            message: format!("backend said {}", status),
        }
    }

    async fn next<T>(queue: &Mutex<VecDeque<Scripted<T>>>) -> Result<T> {
        let scripted = queue.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted::Ready(r)) => r,
            Some(Scripted::Gate(rx)) => rx.await.unwrap_or_else(|_| Err(backend_error(599))),
            None => Err(backend_error(500)),
        }
    }

    impl<E: Entity> FakeApi<E> {
        pub fn push_list(&self, r: Result<Vec<E>>) {
            self.lists.lock().unwrap().push_back(Scripted::Ready(r));
        }
        pub fn push_add(&self, r: Result<E>) {
            self.adds.lock().unwrap().push_back(Scripted::Ready(r));
        }
        pub fn push_update(&self, r: Result<E>) {
            self.updates.lock().unwrap().push_back(Scripted::Ready(r));
        }
        pub fn push_delete(&self, r: Result<()>) {
            self.deletes.lock().unwrap().push_back(Scripted::Ready(r));
        }
        pub fn gate_add(&self) -> oneshot::Sender<Result<E>> {
            let (tx, rx) = oneshot::channel();
            self.adds.lock().unwrap().push_back(Scripted::Gate(rx));
            tx
        }
        pub fn gate_update(&self) -> oneshot::Sender<Result<E>> {
            let (tx, rx) = oneshot::channel();
            self.updates.lock().unwrap().push_back(Scripted::Gate(rx));
            tx
        }
        pub fn gate_list(&self) -> oneshot::Sender<Result<Vec<E>>> {
            let (tx, rx) = oneshot::channel();
            self.lists.lock().unwrap().push_back(Scripted::Gate(rx));
            tx
        }
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl<E: Entity> EntityApi<E> for FakeApi<E> {
        async fn list(&self) -> Result<Vec<E>> {
            self.calls.lock().unwrap().push("list".into());
            next(&self.lists).await
        }

        async fn add(&self, _draft: &E::Draft) -> Result<E> {
            self.calls.lock().unwrap().push("add".into());
            next(&self.adds).await
        }

        async fn update(&self, id: &str, _changes: &E::Changes) -> Result<E> {
            self.calls.lock().unwrap().push(format!("update:{}", id));
            next(&self.updates).await
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.calls.lock().unwrap().push(format!("delete:{}", id));
            next(&self.deletes).await
        }
    }
}
