//! Client-session orchestration.
//!
//! A session talks to three collaborators behind async traits: an identity
//! provider, a profile source, and a data provider. All waiting is bounded:
//! the silent session check gets 5 seconds before the app proceeds
//! unauthenticated, an interactive login gets 15 before it fails. Domain
//! collections live in memory and change only after a collaborator call has
//! confirmed the mutation.

use async_trait::async_trait;
use log::{info, warn};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

use crate::domain::access;
use crate::domain::models::Profile;
use shared::{
    AddWeightEntryRequest, CreateEventRequest, CreatePetRequest, CreateTaskRequest,
    CreateVaccineRequest, Event, Pet, Task, UpdatePetRequest, UserProfile, Vaccine, View,
};

/// Silent session restoration budget.
const SESSION_CHECK_TIMEOUT: Duration = Duration::from_secs(5);
/// Interactive login budget.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Authentication failures surfaced to the user.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Authentication timed out")]
    Timeout,
    #[error("Authentication provider failure: {0}")]
    Provider(String),
}

/// An authenticated identity, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub name: String,
    pub email: String,
}

/// Identity collaborator: session restoration, login, logout.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Check for an existing session (e.g. a persisted token)
    async fn current_session(&self) -> anyhow::Result<Option<Session>>;

    /// Authenticate with credentials
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Tear down the current session
    async fn sign_out(&self) -> anyhow::Result<()>;
}

/// Profile collaborator, fetched once per new session.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> anyhow::Result<Option<UserProfile>>;
}

/// Data collaborator: per-entity CRUD plus task completion. The in-memory
/// collections mirror whatever this provider confirms.
#[async_trait]
pub trait DataProvider: Send + Sync {
    async fn list_pets(&self) -> anyhow::Result<Vec<Pet>>;
    async fn list_tasks(&self) -> anyhow::Result<Vec<Task>>;
    async fn list_events(&self) -> anyhow::Result<Vec<Event>>;
    async fn list_vaccines(&self) -> anyhow::Result<Vec<Vaccine>>;

    async fn create_pet(&self, request: CreatePetRequest) -> anyhow::Result<Pet>;
    async fn update_pet(&self, pet_id: &str, request: UpdatePetRequest) -> anyhow::Result<Pet>;
    async fn add_weight_entry(&self, pet_id: &str, request: AddWeightEntryRequest) -> anyhow::Result<Pet>;
    async fn delete_pet(&self, pet_id: &str) -> anyhow::Result<()>;

    async fn create_task(&self, request: CreateTaskRequest) -> anyhow::Result<Task>;
    async fn complete_task(&self, task_id: &str) -> anyhow::Result<Task>;
    async fn delete_task(&self, task_id: &str) -> anyhow::Result<()>;

    async fn create_event(&self, request: CreateEventRequest) -> anyhow::Result<Event>;
    async fn delete_event(&self, event_id: &str) -> anyhow::Result<()>;

    async fn create_vaccine(&self, request: CreateVaccineRequest) -> anyhow::Result<Vaccine>;
    async fn delete_vaccine(&self, vaccine_id: &str) -> anyhow::Result<()>;
}

/// Whether the domain collections are usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataState {
    /// Nothing fetched yet (or the last load failed)
    NotLoaded,
    /// Subscription expired: fetching is deliberately withheld
    Blocked,
    /// All four collections loaded
    Loaded,
}

#[derive(Debug, Clone, Default)]
struct Collections {
    pets: Vec<Pet>,
    tasks: Vec<Task>,
    events: Vec<Event>,
    vaccines: Vec<Vaccine>,
}

#[derive(Debug, Clone)]
struct SessionState {
    session: Option<Session>,
    profile: Option<Profile>,
    data_state: DataState,
    collections: Collections,
    current_view: View,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            session: None,
            profile: None,
            data_state: DataState::NotLoaded,
            collections: Collections::default(),
            current_view: View::Dashboard,
        }
    }
}

/// Orchestrates one user session over the three collaborators.
pub struct SessionManager {
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileSource>,
    data: Arc<dyn DataProvider>,
    state: Mutex<SessionState>,
    /// Task ids with a completion currently outstanding. A second request
    /// for the same id while one is in flight is a suppressed no-op.
    in_flight_completions: Mutex<HashSet<String>>,
}

impl SessionManager {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileSource>,
        data: Arc<dyn DataProvider>,
    ) -> Self {
        Self {
            identity,
            profiles,
            data,
            state: Mutex::new(SessionState::default()),
            in_flight_completions: Mutex::new(HashSet::new()),
        }
    }

    /// Silent session restoration at startup. Bounded: a slow or failing
    /// identity provider leaves the app unauthenticated rather than hung.
    pub async fn start(&self) {
        let check = tokio::time::timeout(SESSION_CHECK_TIMEOUT, self.identity.current_session()).await;

        let session = match check {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => {
                warn!("Session check failed, proceeding unauthenticated: {:#}", e);
                None
            }
            Err(_) => {
                warn!("Session check timed out, proceeding unauthenticated");
                None
            }
        };

        match session {
            Some(session) => self.establish_session(session).await,
            None => {
                let mut state = self.state.lock().unwrap();
                *state = SessionState::default();
            }
        }
    }

    /// Interactive login, racing the identity provider against a timeout.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let attempt = tokio::time::timeout(LOGIN_TIMEOUT, self.identity.sign_in(email, password)).await;

        let session = match attempt {
            Ok(Ok(session)) => session,
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(AuthError::Timeout),
        };

        info!("Logged in as {}", session.user_id);
        self.establish_session(session).await;
        Ok(())
    }

    /// Sign out and tear the whole session state down.
    pub async fn logout(&self) {
        if let Err(e) = self.identity.sign_out().await {
            warn!("Sign-out call failed: {:#}", e);
        }
        let mut state = self.state.lock().unwrap();
        *state = SessionState::default();
        self.in_flight_completions.lock().unwrap().clear();
    }

    async fn establish_session(&self, session: Session) {
        let profile = self.fetch_profile(&session).await;
        {
            let mut state = self.state.lock().unwrap();
            state.session = Some(session);
            state.profile = Some(profile);
            state.data_state = DataState::NotLoaded;
            state.collections = Collections::default();
        }
        self.load_data().await;
    }

    /// Fetch the profile for a fresh session. A missing or unfetchable
    /// profile degrades to a plain trial fallback so the session can still
    /// proceed; it is never treated as expired.
    async fn fetch_profile(&self, session: &Session) -> Profile {
        match self.profiles.fetch_profile(&session.user_id).await {
            Ok(Some(dto)) => match Profile::from_dto(dto) {
                Ok(profile) => profile,
                Err(e) => {
                    warn!("Profile for {} is malformed, using fallback: {:#}", session.user_id, e);
                    Profile::fallback(&session.user_id, &session.name, &session.email)
                }
            },
            Ok(None) => {
                warn!("No profile found for {}, using fallback", session.user_id);
                Profile::fallback(&session.user_id, &session.name, &session.email)
            }
            Err(e) => {
                warn!("Profile fetch for {} failed, using fallback: {:#}", session.user_id, e);
                Profile::fallback(&session.user_id, &session.name, &session.email)
            }
        }
    }

    /// Load all four collections behind a join barrier. Either everything
    /// lands atomically or nothing changes. An expired subscription blocks
    /// the load outright.
    pub async fn load_data(&self) {
        let expired = {
            let state = self.state.lock().unwrap();
            if state.session.is_none() {
                return;
            }
            state
                .profile
                .as_ref()
                .map(|p| access::is_expired(p, chrono::Utc::now()))
                .unwrap_or(false)
        };

        if expired {
            info!("Subscription expired, domain data load blocked");
            let mut state = self.state.lock().unwrap();
            state.data_state = DataState::Blocked;
            state.collections = Collections::default();
            return;
        }

        let fetched = tokio::try_join!(
            self.data.list_pets(),
            self.data.list_tasks(),
            self.data.list_events(),
            self.data.list_vaccines(),
        );

        match fetched {
            Ok((pets, tasks, events, vaccines)) => {
                let mut state = self.state.lock().unwrap();
                state.collections = Collections { pets, tasks, events, vaccines };
                state.data_state = DataState::Loaded;
                info!(
                    "Loaded {} pets, {} tasks, {} events, {} vaccines",
                    state.collections.pets.len(),
                    state.collections.tasks.len(),
                    state.collections.events.len(),
                    state.collections.vaccines.len()
                );
            }
            Err(e) => {
                warn!("Data load failed, collections unchanged: {:#}", e);
            }
        }
    }

    /// Resolve a navigation request through the access gate and record the
    /// resulting view.
    pub fn navigate(&self, requested: View) -> View {
        let mut state = self.state.lock().unwrap();
        let resolved = match &state.profile {
            Some(profile) => access::resolve_view(profile, requested, chrono::Utc::now()),
            None => requested,
        };
        state.current_view = resolved;
        resolved
    }

    // -- confirmed mutations ------------------------------------------------
    //
    // Every mutation calls the provider first and touches the in-memory
    // collection only on success. A failure leaves state exactly as it was.

    pub async fn create_pet(&self, request: CreatePetRequest) -> anyhow::Result<Pet> {
        let pet = self.data.create_pet(request).await?;
        let mut state = self.state.lock().unwrap();
        state.collections.pets.push(pet.clone());
        Ok(pet)
    }

    pub async fn update_pet(&self, pet_id: &str, request: UpdatePetRequest) -> anyhow::Result<Pet> {
        let pet = self.data.update_pet(pet_id, request).await?;
        self.replace_pet(&pet);
        Ok(pet)
    }

    pub async fn add_weight_entry(&self, pet_id: &str, request: AddWeightEntryRequest) -> anyhow::Result<Pet> {
        let pet = self.data.add_weight_entry(pet_id, request).await?;
        self.replace_pet(&pet);
        Ok(pet)
    }

    /// Delete a pet and cascade the in-memory projection: its tasks, events
    /// and vaccine records disappear with it.
    pub async fn delete_pet(&self, pet_id: &str) -> anyhow::Result<()> {
        self.data.delete_pet(pet_id).await?;
        let mut state = self.state.lock().unwrap();
        state.collections.pets.retain(|p| p.id != pet_id);
        state.collections.tasks.retain(|t| t.pet_id != pet_id);
        state.collections.events.retain(|e| e.pet_id != pet_id);
        state.collections.vaccines.retain(|v| v.pet_id != pet_id);
        Ok(())
    }

    pub async fn create_task(&self, request: CreateTaskRequest) -> anyhow::Result<Task> {
        let task = self.data.create_task(request).await?;
        let mut state = self.state.lock().unwrap();
        state.collections.tasks.push(task.clone());
        Ok(task)
    }

    /// Complete a task at most once: while a completion for this id is in
    /// flight, further requests return None without reaching the provider.
    pub async fn complete_task(&self, task_id: &str) -> anyhow::Result<Option<Task>> {
        {
            let mut in_flight = self.in_flight_completions.lock().unwrap();
            if !in_flight.insert(task_id.to_string()) {
                info!("Completion already in flight for {}, suppressing", task_id);
                return Ok(None);
            }
        }

        let result = self.data.complete_task(task_id).await;

        self.in_flight_completions.lock().unwrap().remove(task_id);

        match result {
            Ok(task) => {
                let mut state = self.state.lock().unwrap();
                if let Some(slot) = state.collections.tasks.iter_mut().find(|t| t.id == task.id) {
                    *slot = task.clone();
                }
                Ok(Some(task))
            }
            Err(e) => {
                warn!("Task completion failed for {}: {:#}", task_id, e);
                Err(e)
            }
        }
    }

    pub async fn delete_task(&self, task_id: &str) -> anyhow::Result<()> {
        self.data.delete_task(task_id).await?;
        let mut state = self.state.lock().unwrap();
        state.collections.tasks.retain(|t| t.id != task_id);
        Ok(())
    }

    pub async fn create_event(&self, request: CreateEventRequest) -> anyhow::Result<Event> {
        let event = self.data.create_event(request).await?;
        let mut state = self.state.lock().unwrap();
        state.collections.events.push(event.clone());
        Ok(event)
    }

    pub async fn delete_event(&self, event_id: &str) -> anyhow::Result<()> {
        self.data.delete_event(event_id).await?;
        let mut state = self.state.lock().unwrap();
        state.collections.events.retain(|e| e.id != event_id);
        Ok(())
    }

    pub async fn create_vaccine(&self, request: CreateVaccineRequest) -> anyhow::Result<Vaccine> {
        let vaccine = self.data.create_vaccine(request).await?;
        let mut state = self.state.lock().unwrap();
        state.collections.vaccines.push(vaccine.clone());
        Ok(vaccine)
    }

    pub async fn delete_vaccine(&self, vaccine_id: &str) -> anyhow::Result<()> {
        self.data.delete_vaccine(vaccine_id).await?;
        let mut state = self.state.lock().unwrap();
        state.collections.vaccines.retain(|v| v.id != vaccine_id);
        Ok(())
    }

    fn replace_pet(&self, pet: &Pet) {
        let mut state = self.state.lock().unwrap();
        if let Some(slot) = state.collections.pets.iter_mut().find(|p| p.id == pet.id) {
            *slot = pet.clone();
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn is_authenticated(&self) -> bool {
        self.state.lock().unwrap().session.is_some()
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state.lock().unwrap().profile.clone()
    }

    pub fn data_state(&self) -> DataState {
        self.state.lock().unwrap().data_state
    }

    pub fn current_view(&self) -> View {
        self.state.lock().unwrap().current_view
    }

    pub fn pets(&self) -> Vec<Pet> {
        self.state.lock().unwrap().collections.pets.clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.lock().unwrap().collections.tasks.clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.state.lock().unwrap().collections.events.clone()
    }

    pub fn vaccines(&self) -> Vec<Vaccine> {
        self.state.lock().unwrap().collections.vaccines.clone()
    }
}

/// In-process [`DataProvider`] over the domain services, for running the
/// whole stack locally against file storage.
pub struct LocalBackend {
    pets: crate::domain::PetService,
    tasks: crate::domain::TaskService,
    events: crate::domain::EventService,
    vaccines: crate::domain::VaccineService,
}

impl LocalBackend {
    pub fn new(csv_conn: Arc<crate::storage::csv::CsvConnection>) -> Self {
        Self {
            pets: crate::domain::PetService::new(csv_conn.clone()),
            tasks: crate::domain::TaskService::new(csv_conn.clone()),
            events: crate::domain::EventService::new(csv_conn.clone()),
            vaccines: crate::domain::VaccineService::new(csv_conn),
        }
    }
}

#[async_trait]
impl DataProvider for LocalBackend {
    async fn list_pets(&self) -> anyhow::Result<Vec<Pet>> {
        Ok(self.pets.list_pets(None)?.pets.into_iter().map(Into::into).collect())
    }

    async fn list_tasks(&self) -> anyhow::Result<Vec<Task>> {
        Ok(self.tasks.list_tasks(None)?.tasks.into_iter().map(Into::into).collect())
    }

    async fn list_events(&self) -> anyhow::Result<Vec<Event>> {
        Ok(self.events.list_events(None)?.events)
    }

    async fn list_vaccines(&self) -> anyhow::Result<Vec<Vaccine>> {
        Ok(self.vaccines.list_vaccines(None)?.vaccines)
    }

    async fn create_pet(&self, request: CreatePetRequest) -> anyhow::Result<Pet> {
        use crate::domain::commands::pets::CreatePetCommand;
        let result = self.pets.create_pet(CreatePetCommand {
            user_id: None,
            name: request.name,
            kind: request.kind,
            breed: request.breed,
            size: request.size,
            birthday: request.birthday,
            current_weight: request.current_weight,
            weight_unit: request.weight_unit,
            gender: request.gender,
            coat_type: request.coat_type,
        })?;
        Ok(result.pet.into())
    }

    async fn update_pet(&self, pet_id: &str, request: UpdatePetRequest) -> anyhow::Result<Pet> {
        use crate::domain::commands::pets::UpdatePetCommand;
        let result = self.pets.update_pet(UpdatePetCommand {
            user_id: None,
            pet_id: pet_id.to_string(),
            name: request.name,
            kind: request.kind,
            breed: request.breed,
            size: request.size,
            current_weight: request.current_weight,
            weight_unit: request.weight_unit,
            gender: request.gender,
            coat_type: request.coat_type,
        })?;
        Ok(result.pet.into())
    }

    async fn add_weight_entry(&self, pet_id: &str, request: AddWeightEntryRequest) -> anyhow::Result<Pet> {
        use crate::domain::commands::pets::AddWeightEntryCommand;
        let result = self.pets.add_weight_entry(AddWeightEntryCommand {
            user_id: None,
            pet_id: pet_id.to_string(),
            weight: request.weight,
            unit: request.unit,
            date: request.date,
        })?;
        Ok(result.pet.into())
    }

    async fn delete_pet(&self, pet_id: &str) -> anyhow::Result<()> {
        use crate::domain::commands::pets::DeletePetCommand;
        self.pets.delete_pet(DeletePetCommand {
            user_id: None,
            pet_id: pet_id.to_string(),
        })?;
        Ok(())
    }

    async fn create_task(&self, request: CreateTaskRequest) -> anyhow::Result<Task> {
        use crate::domain::commands::tasks::CreateTaskCommand;
        let result = self.tasks.create_task(CreateTaskCommand {
            user_id: None,
            pet_id: request.pet_id,
            name: request.name,
            frequency: request.frequency,
            frequency_days: request.frequency_days,
            next_date: request.next_date,
            time: request.time,
            color: request.color,
        })?;
        Ok(result.task.into())
    }

    async fn complete_task(&self, task_id: &str) -> anyhow::Result<Task> {
        use crate::domain::commands::tasks::CompleteTaskCommand;
        let result = self.tasks.complete_task(CompleteTaskCommand {
            user_id: None,
            task_id: task_id.to_string(),
        })?;
        Ok(result.task.into())
    }

    async fn delete_task(&self, task_id: &str) -> anyhow::Result<()> {
        use crate::domain::commands::tasks::DeleteTaskCommand;
        self.tasks.delete_task(DeleteTaskCommand {
            user_id: None,
            task_id: task_id.to_string(),
        })?;
        Ok(())
    }

    async fn create_event(&self, request: CreateEventRequest) -> anyhow::Result<Event> {
        use crate::domain::commands::events::CreateEventCommand;
        let result = self.events.create_event(CreateEventCommand {
            user_id: None,
            pet_id: request.pet_id,
            name: request.name,
            date: request.date,
            location: request.location,
            description: request.description,
        })?;
        Ok(result.event)
    }

    async fn delete_event(&self, event_id: &str) -> anyhow::Result<()> {
        use crate::domain::commands::events::DeleteEventCommand;
        self.events.delete_event(DeleteEventCommand {
            user_id: None,
            event_id: event_id.to_string(),
        })?;
        Ok(())
    }

    async fn create_vaccine(&self, request: CreateVaccineRequest) -> anyhow::Result<Vaccine> {
        use crate::domain::commands::vaccines::CreateVaccineCommand;
        let result = self.vaccines.create_vaccine(CreateVaccineCommand {
            user_id: None,
            pet_id: request.pet_id,
            name: request.name,
            brand: request.brand,
            date: request.date,
            veterinarian: request.veterinarian,
            clinic: request.clinic,
        })?;
        Ok(result.vaccine)
    }

    async fn delete_vaccine(&self, vaccine_id: &str) -> anyhow::Result<()> {
        use crate::domain::commands::vaccines::DeleteVaccineCommand;
        self.vaccines.delete_vaccine(DeleteVaccineCommand {
            user_id: None,
            vaccine_id: vaccine_id.to_string(),
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Frequency, PetKind, SubscriptionStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn session() -> Session {
        Session {
            user_id: "user-1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
        }
    }

    fn profile_dto(status: SubscriptionStatus) -> UserProfile {
        UserProfile {
            id: "user-1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            is_admin: false,
            subscription_status: status,
            subscription_end_date: None,
        }
    }

    fn sample_pet(id: &str) -> Pet {
        Pet {
            id: id.to_string(),
            name: "Luna".to_string(),
            kind: PetKind::Dog,
            breed: None,
            size: None,
            birthday: None,
            current_weight: None,
            weight_unit: None,
            gender: None,
            coat_type: None,
            weight_history: Vec::new(),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    fn sample_task(id: &str, pet_id: &str) -> Task {
        Task {
            id: id.to_string(),
            pet_id: pet_id.to_string(),
            name: "Walk".to_string(),
            frequency: Frequency::Daily,
            frequency_days: 1,
            next_date: "2024-05-01".to_string(),
            time: None,
            last_completed: None,
            color: "#000".to_string(),
            completed: false,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    /// Identity mock: configurable restoration and sign-in behavior.
    struct MockIdentity {
        restored: Option<Session>,
        hang_session_check: bool,
        hang_sign_in: bool,
        reject_sign_in: bool,
    }

    impl Default for MockIdentity {
        fn default() -> Self {
            Self {
                restored: None,
                hang_session_check: false,
                hang_sign_in: false,
                reject_sign_in: false,
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for MockIdentity {
        async fn current_session(&self) -> anyhow::Result<Option<Session>> {
            if self.hang_session_check {
                std::future::pending::<()>().await;
            }
            Ok(self.restored.clone())
        }

        async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, AuthError> {
            if self.hang_sign_in {
                std::future::pending::<()>().await;
            }
            if self.reject_sign_in {
                return Err(AuthError::InvalidCredentials);
            }
            Ok(session())
        }

        async fn sign_out(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct MockProfiles {
        profile: Option<UserProfile>,
        fail: bool,
    }

    #[async_trait]
    impl ProfileSource for MockProfiles {
        async fn fetch_profile(&self, _user_id: &str) -> anyhow::Result<Option<UserProfile>> {
            if self.fail {
                return Err(anyhow::anyhow!("profile backend unavailable"));
            }
            Ok(self.profile.clone())
        }
    }

    /// Data mock: canned collections, optional failure injection, and call
    /// counting for the completion guard tests.
    #[derive(Default)]
    struct MockData {
        pets: Vec<Pet>,
        tasks: Vec<Task>,
        fail_list_events: bool,
        fail_create_pet: bool,
        slow_completion: bool,
        list_calls: AtomicUsize,
        completion_calls: AtomicUsize,
    }

    #[async_trait]
    impl DataProvider for MockData {
        async fn list_pets(&self) -> anyhow::Result<Vec<Pet>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pets.clone())
        }

        async fn list_tasks(&self) -> anyhow::Result<Vec<Task>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.tasks.clone())
        }

        async fn list_events(&self) -> anyhow::Result<Vec<Event>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list_events {
                return Err(anyhow::anyhow!("events backend unavailable"));
            }
            Ok(Vec::new())
        }

        async fn list_vaccines(&self) -> anyhow::Result<Vec<Vaccine>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn create_pet(&self, request: CreatePetRequest) -> anyhow::Result<Pet> {
            if self.fail_create_pet {
                return Err(anyhow::anyhow!("create rejected"));
            }
            let mut pet = sample_pet("pet::new");
            pet.name = request.name;
            Ok(pet)
        }

        async fn update_pet(&self, pet_id: &str, _request: UpdatePetRequest) -> anyhow::Result<Pet> {
            Ok(sample_pet(pet_id))
        }

        async fn add_weight_entry(&self, pet_id: &str, _request: AddWeightEntryRequest) -> anyhow::Result<Pet> {
            Ok(sample_pet(pet_id))
        }

        async fn delete_pet(&self, _pet_id: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn create_task(&self, request: CreateTaskRequest) -> anyhow::Result<Task> {
            let mut task = sample_task("task::new", &request.pet_id);
            task.name = request.name;
            Ok(task)
        }

        async fn complete_task(&self, task_id: &str) -> anyhow::Result<Task> {
            self.completion_calls.fetch_add(1, Ordering::SeqCst);
            if self.slow_completion {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            let mut task = sample_task(task_id, "pet::1");
            task.last_completed = Some("2024-05-01T10:00:00+00:00".to_string());
            task.next_date = "2024-05-02".to_string();
            Ok(task)
        }

        async fn delete_task(&self, _task_id: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn create_event(&self, _request: CreateEventRequest) -> anyhow::Result<Event> {
            anyhow::bail!("not used in tests")
        }

        async fn delete_event(&self, _event_id: &str) -> anyhow::Result<()> {
            Ok(())
        }

        async fn create_vaccine(&self, _request: CreateVaccineRequest) -> anyhow::Result<Vaccine> {
            anyhow::bail!("not used in tests")
        }

        async fn delete_vaccine(&self, _vaccine_id: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn manager(identity: MockIdentity, profiles: MockProfiles, data: MockData) -> SessionManager {
        SessionManager::new(Arc::new(identity), Arc::new(profiles), Arc::new(data))
    }

    fn manager_with_data(identity: MockIdentity, profiles: MockProfiles, data: Arc<MockData>) -> SessionManager {
        SessionManager::new(
            Arc::new(identity),
            Arc::new(profiles),
            data as Arc<dyn DataProvider>,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_session_check_proceeds_unauthenticated() {
        let m = manager(
            MockIdentity {
                hang_session_check: true,
                ..Default::default()
            },
            MockProfiles { profile: None, fail: false },
            MockData::default(),
        );

        m.start().await;
        assert!(!m.is_authenticated());
        assert_eq!(m.data_state(), DataState::NotLoaded);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_login_surfaces_timeout() {
        let m = manager(
            MockIdentity {
                hang_sign_in: true,
                ..Default::default()
            },
            MockProfiles { profile: None, fail: false },
            MockData::default(),
        );

        let err = m.login("ana@example.com", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Timeout));
        assert!(!m.is_authenticated());
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_credentials_error() {
        let m = manager(
            MockIdentity {
                reject_sign_in: true,
                ..Default::default()
            },
            MockProfiles { profile: None, fail: false },
            MockData::default(),
        );

        let err = m.login("ana@example.com", "bad").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_loads_all_collections() {
        let m = manager(
            MockIdentity::default(),
            MockProfiles {
                profile: Some(profile_dto(SubscriptionStatus::Active)),
                fail: false,
            },
            MockData {
                pets: vec![sample_pet("pet::1")],
                tasks: vec![sample_task("task::1", "pet::1")],
                ..Default::default()
            },
        );

        m.login("ana@example.com", "pw").await.unwrap();
        assert!(m.is_authenticated());
        assert_eq!(m.data_state(), DataState::Loaded);
        assert_eq!(m.pets().len(), 1);
        assert_eq!(m.tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_partial_fetch_failure_leaves_collections_untouched() {
        let m = manager(
            MockIdentity::default(),
            MockProfiles {
                profile: Some(profile_dto(SubscriptionStatus::Active)),
                fail: false,
            },
            MockData {
                pets: vec![sample_pet("pet::1")],
                fail_list_events: true,
                ..Default::default()
            },
        );

        m.login("ana@example.com", "pw").await.unwrap();
        // One failing fetch poisons the whole barrier
        assert_eq!(m.data_state(), DataState::NotLoaded);
        assert!(m.pets().is_empty());
    }

    #[tokio::test]
    async fn test_expired_profile_blocks_data_load() {
        let data = Arc::new(MockData {
            pets: vec![sample_pet("pet::1")],
            ..Default::default()
        });
        let m = manager_with_data(
            MockIdentity::default(),
            MockProfiles {
                profile: Some(profile_dto(SubscriptionStatus::Expired)),
                fail: false,
            },
            data.clone(),
        );

        m.login("ana@example.com", "pw").await.unwrap();
        assert_eq!(m.data_state(), DataState::Blocked);
        assert!(m.pets().is_empty());
        // No domain fetch was issued at all
        assert_eq!(data.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_profile_fetch_failure_falls_back_to_trial() {
        let m = manager(
            MockIdentity::default(),
            MockProfiles { profile: None, fail: true },
            MockData::default(),
        );

        m.login("ana@example.com", "pw").await.unwrap();
        let profile = m.profile().unwrap();
        assert_eq!(profile.subscription_status, SubscriptionStatus::Trial);
        assert!(!profile.is_admin);
        // Fallback is never expired, data loads normally
        assert_eq!(m.data_state(), DataState::Loaded);
    }

    #[tokio::test]
    async fn test_failed_create_leaves_collection_untouched() {
        let m = manager(
            MockIdentity::default(),
            MockProfiles {
                profile: Some(profile_dto(SubscriptionStatus::Active)),
                fail: false,
            },
            MockData {
                fail_create_pet: true,
                ..Default::default()
            },
        );

        m.login("ana@example.com", "pw").await.unwrap();
        let before = m.pets();
        assert!(m.create_pet(create_pet_request("Rex")).await.is_err());
        assert_eq!(m.pets(), before);
    }

    #[tokio::test]
    async fn test_confirmed_create_appends() {
        let m = manager(
            MockIdentity::default(),
            MockProfiles {
                profile: Some(profile_dto(SubscriptionStatus::Active)),
                fail: false,
            },
            MockData::default(),
        );

        m.login("ana@example.com", "pw").await.unwrap();
        let pet = m.create_pet(create_pet_request("Rex")).await.unwrap();
        assert_eq!(pet.name, "Rex");
        assert_eq!(m.pets().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_completion_is_suppressed() {
        let data = Arc::new(MockData {
            tasks: vec![sample_task("task::1", "pet::1")],
            slow_completion: true,
            ..Default::default()
        });
        let m = Arc::new(manager_with_data(
            MockIdentity::default(),
            MockProfiles {
                profile: Some(profile_dto(SubscriptionStatus::Active)),
                fail: false,
            },
            data.clone(),
        ));

        m.login("ana@example.com", "pw").await.unwrap();

        let (first, second) = tokio::join!(m.complete_task("task::1"), m.complete_task("task::1"));
        let results = [first.unwrap(), second.unwrap()];

        // Exactly one request reached the provider; the other was a no-op
        assert_eq!(data.completion_calls.load(Ordering::SeqCst), 1);
        assert_eq!(results.iter().filter(|r| r.is_some()).count(), 1);

        // Once the first settles, the task can be completed again
        let third = m.complete_task("task::1").await.unwrap();
        assert!(third.is_some());
        assert_eq!(data.completion_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_delete_pet_cascades_in_memory() {
        let m = manager(
            MockIdentity::default(),
            MockProfiles {
                profile: Some(profile_dto(SubscriptionStatus::Active)),
                fail: false,
            },
            MockData {
                pets: vec![sample_pet("pet::1"), sample_pet("pet::2")],
                tasks: vec![sample_task("task::1", "pet::1"), sample_task("task::2", "pet::2")],
                ..Default::default()
            },
        );

        m.login("ana@example.com", "pw").await.unwrap();
        m.delete_pet("pet::1").await.unwrap();

        assert_eq!(m.pets().len(), 1);
        let tasks = m.tasks();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].pet_id, "pet::2");
    }

    #[tokio::test]
    async fn test_navigation_respects_gate() {
        let m = manager(
            MockIdentity::default(),
            MockProfiles {
                profile: Some(profile_dto(SubscriptionStatus::Expired)),
                fail: false,
            },
            MockData::default(),
        );

        m.login("ana@example.com", "pw").await.unwrap();
        assert_eq!(m.navigate(View::Dashboard), View::Subscription);
        assert_eq!(m.navigate(View::Settings), View::Settings);
        assert_eq!(m.current_view(), View::Settings);
    }

    #[tokio::test]
    async fn test_logout_tears_state_down() {
        let m = manager(
            MockIdentity::default(),
            MockProfiles {
                profile: Some(profile_dto(SubscriptionStatus::Active)),
                fail: false,
            },
            MockData {
                pets: vec![sample_pet("pet::1")],
                ..Default::default()
            },
        );

        m.login("ana@example.com", "pw").await.unwrap();
        assert!(m.is_authenticated());

        m.logout().await;
        assert!(!m.is_authenticated());
        assert!(m.profile().is_none());
        assert!(m.pets().is_empty());
        assert_eq!(m.data_state(), DataState::NotLoaded);
    }

    fn create_pet_request(name: &str) -> CreatePetRequest {
        CreatePetRequest {
            name: name.to_string(),
            kind: PetKind::Dog,
            breed: None,
            size: None,
            birthday: None,
            current_weight: None,
            weight_unit: None,
            gender: None,
            coat_type: None,
        }
    }
}
