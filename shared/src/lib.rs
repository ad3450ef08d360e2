use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Species category of a pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetKind {
    Dog,
    Cat,
    Bird,
    Fish,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetGender {
    Male,
    Female,
}

/// A single recorded weight measurement for a pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: String,
    pub weight: f64,
    pub unit: String,
    /// Calendar date of the measurement (YYYY-MM-DD)
    pub date: String,
}

/// Pet DTO as exposed over the API. Dates are strings: calendar dates in
/// canonical YYYY-MM-DD form, timestamps in RFC 3339.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub kind: PetKind,
    pub breed: Option<String>,
    pub size: Option<PetSize>,
    pub birthday: Option<String>,
    pub current_weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub gender: Option<PetGender>,
    pub coat_type: Option<String>,
    pub weight_history: Vec<WeightEntry>,
    pub created_at: String,
}

/// How often a care task recurs. The resolved day count lives on the task
/// itself (`frequency_days`); this is the user-facing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Custom,
}

/// Recurring care task DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub pet_id: String,
    pub name: String,
    pub frequency: Frequency,
    /// Resolved recurrence interval in days, always > 0
    pub frequency_days: u32,
    /// Next due date in canonical YYYY-MM-DD form
    pub next_date: String,
    /// Optional time of day (HH:MM)
    pub time: Option<String>,
    /// RFC 3339 timestamp of the most recent completion
    pub last_completed: Option<String>,
    pub color: String,
    /// "Acknowledged but not yet rolled over", not "retired"
    pub completed: bool,
    pub created_at: String,
}

/// One-shot event DTO. No recurrence, no completion state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub pet_id: String,
    pub name: String,
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Vaccine record DTO.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vaccine {
    pub id: String,
    pub pet_id: String,
    pub name: String,
    pub brand: Option<String>,
    /// Administration date (YYYY-MM-DD)
    pub date: String,
    pub veterinarian: Option<String>,
    pub clinic: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
    Canceled,
}

/// User profile DTO: identity plus the subscription fields the access gate
/// derives from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub subscription_status: SubscriptionStatus,
    /// RFC 3339 timestamp; None means no fixed end date
    pub subscription_end_date: Option<String>,
}

/// Navigable views of the application surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    Dashboard,
    Pets,
    Calendar,
    Events,
    History,
    Settings,
    Vaccines,
    Admin,
    Subscription,
}

/// Type of calendar day for explicit rendering logic
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum CalendarDayType {
    /// Empty padding day before the start of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
}

/// A single cell of the calendar grid: the pending tasks due and the
/// upcoming events falling on that day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    pub day: u32,
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
    pub day_type: CalendarDayType,
}

impl CalendarDay {
    pub fn has_items(&self) -> bool {
        !self.tasks.is_empty() || !self.events.is_empty()
    }
}

/// A calendar month projection with leading padding cells.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: u32,
    pub days: Vec<CalendarDay>,
    pub first_day_of_week: u32, // 0 = Sunday, 1 = Monday, etc.
}

/// Represents the current focus date for calendar navigation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarFocusDate {
    pub month: u32,
    pub year: u32,
}

impl Default for CalendarFocusDate {
    fn default() -> Self {
        let now = chrono::Local::now();
        Self {
            month: now.month(),
            year: now.year() as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgendaItemKind {
    Task,
    Event,
}

/// An entry of the merged "next appointments" list across tasks and events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub kind: AgendaItemKind,
    /// Canonical YYYY-MM-DD date the item falls on
    pub date: String,
    pub id: String,
    pub pet_id: String,
    pub name: String,
    /// Task display color; None for events
    pub color: Option<String>,
}

/// Dashboard counters derived from the task and pet collections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub active_tasks: usize,
    pub overdue_tasks: usize,
    pub due_today: usize,
    pub pet_count: usize,
}

/// Care history projection: completion counters plus recent completions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareHistory {
    pub completed_count: usize,
    pub total_count: usize,
    /// Rounded percentage, 0 when there are no tasks
    pub completion_rate: u32,
    /// Tasks with a completion stamp, most recent first
    pub recent: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePetRequest {
    pub name: String,
    pub kind: PetKind,
    pub breed: Option<String>,
    pub size: Option<PetSize>,
    pub birthday: Option<String>,
    pub current_weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub gender: Option<PetGender>,
    pub coat_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdatePetRequest {
    pub name: Option<String>,
    pub kind: Option<PetKind>,
    pub breed: Option<String>,
    pub size: Option<PetSize>,
    pub current_weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub gender: Option<PetGender>,
    pub coat_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddWeightEntryRequest {
    pub weight: f64,
    pub unit: String,
    /// Measurement date; defaults to today when omitted
    pub date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub pet_id: String,
    pub name: String,
    pub frequency: Frequency,
    /// Explicit interval override for custom/biweekly frequencies
    pub frequency_days: Option<u32>,
    pub next_date: String,
    pub time: Option<String>,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub pet_id: String,
    pub name: String,
    pub date: String,
    pub location: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateVaccineRequest {
    pub pet_id: String,
    pub name: String,
    pub brand: Option<String>,
    pub date: String,
    pub veterinarian: Option<String>,
    pub clinic: Option<String>,
}

/// Customer identification carried on a payment-provider webhook call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookCustomer {
    pub email: Option<String>,
    /// The application user id the provider was given at checkout
    pub external_id: Option<String>,
}

/// Payload posted by the payment provider on subscription events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentWebhookPayload {
    pub event: String,
    pub customer: Option<WebhookCustomer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookAck {
    pub success: bool,
    pub message: String,
}

/// Report data consumed by the PDF exporter: entity snapshots restricted to
/// a date range and optionally a single pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub pets: Vec<Pet>,
    pub tasks: Vec<Task>,
    pub events: Vec<Event>,
    pub vaccines: Vec<Vaccine>,
}
