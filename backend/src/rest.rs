use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::events::{CreateEventCommand, DeleteEventCommand};
use crate::domain::commands::pets::{
    AddWeightEntryCommand, CreatePetCommand, DeletePetCommand, UpdatePetCommand,
};
use crate::domain::commands::reports::ReportDataQuery;
use crate::domain::commands::tasks::{CompleteTaskCommand, CreateTaskCommand, DeleteTaskCommand};
use crate::domain::commands::vaccines::{CreateVaccineCommand, DeleteVaccineCommand};
use crate::domain::dates;
use crate::domain::subscription_service::WebhookOutcome;
use crate::domain::{
    AgendaService, EventService, PetService, ReportService, SubscriptionService, TaskService,
    UserService, VaccineService,
};
use crate::storage::csv::CsvConnection;
use shared::{
    AddWeightEntryRequest, CreateEventRequest, CreatePetRequest, CreateTaskRequest,
    CreateVaccineRequest, Event, PaymentWebhookPayload, Pet, Task, UpdatePetRequest, UserProfile,
    WebhookAck,
};

/// Application state containing every domain service
#[derive(Clone)]
pub struct AppState {
    pub pet_service: PetService,
    pub task_service: TaskService,
    pub event_service: EventService,
    pub vaccine_service: VaccineService,
    pub user_service: UserService,
    pub subscription_service: SubscriptionService,
    pub report_service: ReportService,
    pub agenda_service: AgendaService,
}

impl AppState {
    /// Create new application state over the given storage connection
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            pet_service: PetService::new(csv_conn.clone()),
            task_service: TaskService::new(csv_conn.clone()),
            event_service: EventService::new(csv_conn.clone()),
            vaccine_service: VaccineService::new(csv_conn.clone()),
            user_service: UserService::new(csv_conn.clone()),
            subscription_service: SubscriptionService::new(csv_conn.clone()),
            report_service: ReportService::new(csv_conn),
            agenda_service: AgendaService::new(),
        }
    }
}

/// Build the API router with all routes nested under /api
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/pets", get(list_pets).post(create_pet))
        .route("/pets/:pet_id", put(update_pet).delete(delete_pet))
        .route("/pets/:pet_id/weights", post(add_weight_entry))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/:task_id", delete(delete_task))
        .route("/tasks/:task_id/complete", post(complete_task))
        .route("/events", get(list_events).post(create_event))
        .route("/events/:event_id", delete(delete_event))
        .route("/vaccines", get(list_vaccines).post(create_vaccine))
        .route("/vaccines/:vaccine_id", delete(delete_vaccine))
        .route("/calendar/:year/:month", get(get_calendar_month))
        .route("/calendar/previous", post(calendar_previous))
        .route("/calendar/next", post(calendar_next))
        .route("/agenda/upcoming", get(upcoming_agenda))
        .route("/dashboard", get(dashboard_summary))
        .route("/history", get(care_history))
        .route("/reports", get(report_data))
        .route("/reports/purge", post(purge_old_data))
        .route("/profile", get(get_profile))
        .route("/profile/active", put(set_active_user))
        .route("/webhooks/payment", post(payment_webhook));

    Router::new().nest("/api", api_routes).with_state(state)
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Serialize)]
struct DeletePetResponse {
    deleted_tasks: usize,
    deleted_events: usize,
    deleted_vaccines: usize,
    message: String,
}

#[derive(Serialize)]
struct PurgeResponse {
    deleted_tasks: usize,
    deleted_events: usize,
    deleted_vaccines: usize,
}

#[derive(Deserialize, Debug)]
pub struct SetActiveUserRequest {
    pub user_id: String,
}

/// Query parameters for the report data endpoint
#[derive(Deserialize, Debug)]
pub struct ReportQuery {
    pub pet_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

// -- pets -------------------------------------------------------------------

/// Axum handler for GET /api/pets
pub async fn list_pets(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/pets");

    match state.pet_service.list_pets(None) {
        Ok(result) => {
            let pets: Vec<Pet> = result.pets.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(pets)).into_response()
        }
        Err(e) => {
            tracing::error!("Error listing pets: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing pets").into_response()
        }
    }
}

/// Axum handler for POST /api/pets
pub async fn create_pet(
    State(state): State<AppState>,
    Json(request): Json<CreatePetRequest>,
) -> impl IntoResponse {
    info!("POST /api/pets - name: {}", request.name);

    let command = CreatePetCommand {
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
    };

    match state.pet_service.create_pet(command) {
        Ok(result) => {
            let pet: Pet = result.pet.into();
            (StatusCode::CREATED, Json(pet)).into_response()
        }
        Err(e) => {
            tracing::error!("Error creating pet: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler for PUT /api/pets/:pet_id
pub async fn update_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
    Json(request): Json<UpdatePetRequest>,
) -> impl IntoResponse {
    info!("PUT /api/pets/{}", pet_id);

    let command = UpdatePetCommand {
        user_id: None,
        pet_id,
        name: request.name,
        kind: request.kind,
        breed: request.breed,
        size: request.size,
        current_weight: request.current_weight,
        weight_unit: request.weight_unit,
        gender: request.gender,
        coat_type: request.coat_type,
    };

    match state.pet_service.update_pet(command) {
        Ok(result) => {
            let pet: Pet = result.pet.into();
            (StatusCode::OK, Json(pet)).into_response()
        }
        Err(e) => {
            tracing::error!("Error updating pet: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler for POST /api/pets/:pet_id/weights
pub async fn add_weight_entry(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
    Json(request): Json<AddWeightEntryRequest>,
) -> impl IntoResponse {
    info!("POST /api/pets/{}/weights", pet_id);

    let command = AddWeightEntryCommand {
        user_id: None,
        pet_id,
        weight: request.weight,
        unit: request.unit,
        date: request.date,
    };

    match state.pet_service.add_weight_entry(command) {
        Ok(result) => {
            let pet: Pet = result.pet.into();
            (StatusCode::OK, Json(pet)).into_response()
        }
        Err(e) => {
            tracing::error!("Error adding weight entry: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler for DELETE /api/pets/:pet_id
pub async fn delete_pet(
    State(state): State<AppState>,
    Path(pet_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/pets/{}", pet_id);

    let command = DeletePetCommand {
        user_id: None,
        pet_id,
    };

    match state.pet_service.delete_pet(command) {
        Ok(result) => (
            StatusCode::OK,
            Json(DeletePetResponse {
                deleted_tasks: result.deleted_tasks,
                deleted_events: result.deleted_events,
                deleted_vaccines: result.deleted_vaccines,
                message: result.success_message,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error deleting pet: {:?}", e);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

// -- tasks ------------------------------------------------------------------

/// Axum handler for GET /api/tasks
pub async fn list_tasks(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/tasks");

    match state.task_service.list_tasks(None) {
        Ok(result) => {
            let tasks: Vec<Task> = result.tasks.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(tasks)).into_response()
        }
        Err(e) => {
            tracing::error!("Error listing tasks: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing tasks").into_response()
        }
    }
}

/// Axum handler for POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> impl IntoResponse {
    info!("POST /api/tasks - name: {}", request.name);

    let command = CreateTaskCommand {
        user_id: None,
        pet_id: request.pet_id,
        name: request.name,
        frequency: request.frequency,
        frequency_days: request.frequency_days,
        next_date: request.next_date,
        time: request.time,
        color: request.color,
    };

    match state.task_service.create_task(command) {
        Ok(result) => {
            let task: Task = result.task.into();
            (StatusCode::CREATED, Json(task)).into_response()
        }
        Err(e) => {
            tracing::error!("Error creating task: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler for POST /api/tasks/:task_id/complete
pub async fn complete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    info!("POST /api/tasks/{}/complete", task_id);

    let command = CompleteTaskCommand {
        user_id: None,
        task_id,
    };

    match state.task_service.complete_task(command) {
        Ok(result) => {
            let task: Task = result.task.into();
            (StatusCode::OK, Json(task)).into_response()
        }
        Err(e) => {
            tracing::error!("Error completing task: {:?}", e);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

/// Axum handler for DELETE /api/tasks/:task_id
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/tasks/{}", task_id);

    let command = DeleteTaskCommand {
        user_id: None,
        task_id,
    };

    match state.task_service.delete_task(command) {
        Ok(result) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: result.success_message,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error deleting task: {:?}", e);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

// -- events -----------------------------------------------------------------

/// Axum handler for GET /api/events
pub async fn list_events(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/events");

    match state.event_service.list_events(None) {
        Ok(result) => (StatusCode::OK, Json(result.events)).into_response(),
        Err(e) => {
            tracing::error!("Error listing events: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing events").into_response()
        }
    }
}

/// Axum handler for POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> impl IntoResponse {
    info!("POST /api/events - name: {}", request.name);

    let command = CreateEventCommand {
        user_id: None,
        pet_id: request.pet_id,
        name: request.name,
        date: request.date,
        location: request.location,
        description: request.description,
    };

    match state.event_service.create_event(command) {
        Ok(result) => (StatusCode::CREATED, Json(result.event)).into_response(),
        Err(e) => {
            tracing::error!("Error creating event: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler for DELETE /api/events/:event_id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/events/{}", event_id);

    let command = DeleteEventCommand {
        user_id: None,
        event_id,
    };

    match state.event_service.delete_event(command) {
        Ok(result) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: result.success_message,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error deleting event: {:?}", e);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

// -- vaccines ---------------------------------------------------------------

/// Axum handler for GET /api/vaccines
pub async fn list_vaccines(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/vaccines");

    match state.vaccine_service.list_vaccines(None) {
        Ok(result) => (StatusCode::OK, Json(result.vaccines)).into_response(),
        Err(e) => {
            tracing::error!("Error listing vaccines: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error listing vaccines").into_response()
        }
    }
}

/// Axum handler for POST /api/vaccines
pub async fn create_vaccine(
    State(state): State<AppState>,
    Json(request): Json<CreateVaccineRequest>,
) -> impl IntoResponse {
    info!("POST /api/vaccines - name: {}", request.name);

    let command = CreateVaccineCommand {
        user_id: None,
        pet_id: request.pet_id,
        name: request.name,
        brand: request.brand,
        date: request.date,
        veterinarian: request.veterinarian,
        clinic: request.clinic,
    };

    match state.vaccine_service.create_vaccine(command) {
        Ok(result) => (StatusCode::CREATED, Json(result.vaccine)).into_response(),
        Err(e) => {
            tracing::error!("Error recording vaccine: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// Axum handler for DELETE /api/vaccines/:vaccine_id
pub async fn delete_vaccine(
    State(state): State<AppState>,
    Path(vaccine_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/vaccines/{}", vaccine_id);

    let command = DeleteVaccineCommand {
        user_id: None,
        vaccine_id,
    };

    match state.vaccine_service.delete_vaccine(command) {
        Ok(result) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: result.success_message,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error deleting vaccine: {:?}", e);
            (StatusCode::NOT_FOUND, e.to_string()).into_response()
        }
    }
}

// -- calendar and agenda ----------------------------------------------------

/// Collect the task and event collections as the calendar consumes them:
/// pending tasks regardless of date, events from today onward.
fn calendar_inputs(state: &AppState) -> anyhow::Result<(Vec<Task>, Vec<Event>)> {
    let tasks: Vec<Task> = state
        .task_service
        .list_tasks(None)?
        .tasks
        .into_iter()
        .map(Into::into)
        .collect();
    let events = state.event_service.list_events(None)?.events;

    let today = dates::today();
    Ok((
        AgendaService::pending_tasks(&tasks),
        AgendaService::upcoming_events(&events, &today),
    ))
}

/// Axum handler for GET /api/calendar/:year/:month
pub async fn get_calendar_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(u32, u32)>,
) -> impl IntoResponse {
    info!("GET /api/calendar/{}/{}", year, month);

    if let Err(e) = state.agenda_service.set_focus_date(month, year) {
        return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
    }

    match calendar_inputs(&state) {
        Ok((tasks, events)) => {
            let calendar = state
                .agenda_service
                .generate_calendar_month(month, year, tasks, events);
            (StatusCode::OK, Json(calendar)).into_response()
        }
        Err(e) => {
            tracing::error!("Error generating calendar: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error generating calendar").into_response()
        }
    }
}

/// Axum handler for POST /api/calendar/previous
pub async fn calendar_previous(State(state): State<AppState>) -> impl IntoResponse {
    let focus = state.agenda_service.navigate_previous_month();
    info!("POST /api/calendar/previous - now {}/{}", focus.month, focus.year);
    (StatusCode::OK, Json(focus)).into_response()
}

/// Axum handler for POST /api/calendar/next
pub async fn calendar_next(State(state): State<AppState>) -> impl IntoResponse {
    let focus = state.agenda_service.navigate_next_month();
    info!("POST /api/calendar/next - now {}/{}", focus.month, focus.year);
    (StatusCode::OK, Json(focus)).into_response()
}

/// Axum handler for GET /api/agenda/upcoming
pub async fn upcoming_agenda(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/agenda/upcoming");

    let tasks = match state.task_service.list_tasks(None) {
        Ok(result) => result
            .tasks
            .into_iter()
            .map(Into::into)
            .collect::<Vec<Task>>(),
        Err(e) => {
            tracing::error!("Error listing tasks for agenda: {:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error building agenda").into_response();
        }
    };
    let events = match state.event_service.list_events(None) {
        Ok(result) => result.events,
        Err(e) => {
            tracing::error!("Error listing events for agenda: {:?}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error building agenda").into_response();
        }
    };

    let items = state
        .agenda_service
        .upcoming_agenda(&tasks, &events, &dates::today());
    (StatusCode::OK, Json(items)).into_response()
}

// -- dashboard and history --------------------------------------------------

/// Axum handler for GET /api/dashboard
pub async fn dashboard_summary(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/dashboard");

    match state.task_service.dashboard_summary(None) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!("Error building dashboard summary: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error building dashboard summary",
            )
                .into_response()
        }
    }
}

/// Axum handler for GET /api/history
pub async fn care_history(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/history");

    match state.task_service.care_history(None) {
        Ok(history) => (StatusCode::OK, Json(history)).into_response(),
        Err(e) => {
            tracing::error!("Error building care history: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error building care history").into_response()
        }
    }
}

// -- reports ----------------------------------------------------------------

/// Axum handler for GET /api/reports
pub async fn report_data(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    info!("GET /api/reports - query: {:?}", query);

    let query = ReportDataQuery {
        user_id: None,
        pet_id: query.pet_id,
        start_date: query.start_date,
        end_date: query.end_date,
    };

    match state.report_service.report_data(query) {
        Ok(data) => (StatusCode::OK, Json(data)).into_response(),
        Err(e) => {
            tracing::error!("Error assembling report data: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error assembling report data",
            )
                .into_response()
        }
    }
}

/// Axum handler for POST /api/reports/purge
pub async fn purge_old_data(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/reports/purge");

    match state.report_service.purge_old_data(None) {
        Ok(result) => (
            StatusCode::OK,
            Json(PurgeResponse {
                deleted_tasks: result.deleted_tasks,
                deleted_events: result.deleted_events,
                deleted_vaccines: result.deleted_vaccines,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error purging old data: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error purging old data").into_response()
        }
    }
}

// -- profile ----------------------------------------------------------------

/// Axum handler for GET /api/profile
pub async fn get_profile(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/profile");

    match state.user_service.get_active_profile() {
        Ok(Some(profile)) => {
            let dto: UserProfile = profile.into();
            (StatusCode::OK, Json(dto)).into_response()
        }
        Ok(None) => (StatusCode::NOT_FOUND, "No active user").into_response(),
        Err(e) => {
            tracing::error!("Error loading profile: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error loading profile").into_response()
        }
    }
}

/// Axum handler for PUT /api/profile/active
pub async fn set_active_user(
    State(state): State<AppState>,
    Json(request): Json<SetActiveUserRequest>,
) -> impl IntoResponse {
    info!("PUT /api/profile/active - user: {}", request.user_id);

    match state.user_service.set_active_user(&request.user_id) {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Active user updated".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error setting active user: {:?}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

// -- payment webhook --------------------------------------------------------

/// Axum handler for POST /api/webhooks/payment
///
/// Recognized events update the matched profile. Everything else is
/// acknowledged with 200 so the provider does not retry; only a payload
/// that identifies no user at all is the caller's error.
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<PaymentWebhookPayload>,
) -> impl IntoResponse {
    info!("POST /api/webhooks/payment - event: {}", payload.event);

    match state.subscription_service.process_webhook(payload) {
        Ok(WebhookOutcome::Applied { user_id, .. }) => (
            StatusCode::OK,
            Json(WebhookAck {
                success: true,
                message: format!("Subscription updated for {}", user_id),
            }),
        )
            .into_response(),
        Ok(WebhookOutcome::Ignored { event }) => (
            StatusCode::OK,
            Json(WebhookAck {
                success: true,
                message: format!("Event ignored: {}", event),
            }),
        )
            .into_response(),
        Ok(WebhookOutcome::UserNotFound) => (
            StatusCode::OK,
            Json(WebhookAck {
                success: false,
                message: "No matching user".to_string(),
            }),
        )
            .into_response(),
        Ok(WebhookOutcome::MissingIdentification) => (
            StatusCode::BAD_REQUEST,
            Json(WebhookAck {
                success: false,
                message: "Payload identifies no user".to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Error processing payment webhook: {:?}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error processing webhook").into_response()
        }
    }
}
