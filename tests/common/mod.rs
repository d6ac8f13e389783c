//! In-process fake of the shop backend: REST endpoints under `/api` plus
//! the `task-moved` event stream.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use suds_common::{
    ColumnId, Customer, CustomerSnapshot, KanbanData, LoyaltyAccount, LoyaltyTier, Priority, Reward, RewardKind,
    Task, TaskDraft, TaskId,
};
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

pub struct ShopState {
    pub board: KanbanData,
    pub customers: Vec<Customer>,
    pub loyalty: HashMap<String, LoyaltyAccount>,
    pub rewards: Vec<Reward>,
    /// Answer every move with a 500.
    pub reject_moves: bool,
    /// Answer every board fetch with a 503.
    pub fail_board: bool,
    /// `(taskId, newStatus)` of every move request received.
    pub moves: Vec<(String, String)>,
    /// Authorization header of the last request, if any.
    pub last_auth: Option<String>,
    next_id: u32,
}

#[derive(Clone)]
pub struct FakeShop {
    state: Arc<Mutex<ShopState>>,
    events: broadcast::Sender<String>,
    pub base_url: String,
}

impl FakeShop {
    /// Bind on a random local port and serve the seeded shop.
    pub async fn start() -> Self {
        Self::start_with(seed()).await
    }

    pub async fn start_with(state: ShopState) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (events, _) = broadcast::channel(16);
        let shop = Self {
            state: Arc::new(Mutex::new(state)),
            events,
            base_url: format!("http://{}", addr),
        };

        let app = router(shop.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        shop
    }

    pub fn state(&self) -> MutexGuard<'_, ShopState> {
        self.state.lock().unwrap()
    }

    /// Move a task as another operator would and push the event.
    pub fn move_remotely(&self, task_id: &str, to: ColumnId) -> Task {
        let task = {
            let mut state = self.state();
            let mut task = take_task(&mut state.board, task_id).unwrap();
            task.status = to;
            state.board.column_mut(to).push(task.clone());
            task
        };
        self.push_raw(
            &json!({ "taskId": task_id, "newStatus": to.as_str(), "task": task }).to_string(),
        );
        task
    }

    /// Send a raw `task-moved` payload to every connected stream.
    pub fn push_raw(&self, data: &str) {
        let _ = self.events.send(data.to_string());
    }

    pub fn column_of(&self, task_id: &str) -> Option<ColumnId> {
        let state = self.state();
        ColumnId::ALL
            .into_iter()
            .find(|c| state.board.column(*c).iter().any(|t| t.id.as_str() == task_id))
    }
}

fn router(shop: FakeShop) -> Router {
    Router::new()
        .route("/api/kanban", get(kanban))
        .route("/api/kanban/move", patch(move_task))
        .route("/api/tasks", post(create_task))
        .route("/api/tasks/{id}", put(update_task).delete(delete_task))
        .route("/api/customers", get(list_customers))
        .route("/api/customers/{id}", get(get_customer))
        .route("/api/loyalty/rewards", get(list_rewards))
        .route("/api/loyalty/{id}", get(get_loyalty))
        .route("/api/loyalty/{id}/redeem", post(redeem))
        .route("/api/events", get(events))
        .with_state(shop)
}

fn take_task(board: &mut KanbanData, task_id: &str) -> Option<Task> {
    for column in ColumnId::ALL {
        let tasks = board.column_mut(column);
        if let Some(pos) = tasks.iter().position(|t| t.id.as_str() == task_id) {
            return Some(tasks.remove(pos));
        }
    }
    None
}

fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("{} not found", what)).into_response()
}

async fn kanban(State(shop): State<FakeShop>, headers: axum::http::HeaderMap) -> Response {
    let mut state = shop.state();
    state.last_auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    if state.fail_board {
        return (StatusCode::SERVICE_UNAVAILABLE, "board unavailable").into_response();
    }
    Json(state.board.clone()).into_response()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoveBody {
    task_id: String,
    new_status: String,
}

async fn move_task(State(shop): State<FakeShop>, Json(body): Json<MoveBody>) -> Response {
    let mut state = shop.state();
    state.moves.push((body.task_id.clone(), body.new_status.clone()));
    if state.reject_moves {
        return (StatusCode::INTERNAL_SERVER_ERROR, "move rejected").into_response();
    }
    let Ok(to) = body.new_status.parse::<ColumnId>() else {
        return (StatusCode::BAD_REQUEST, "bad status").into_response();
    };
    let Some(mut task) = take_task(&mut state.board, &body.task_id) else {
        return not_found("task");
    };
    task.status = to;
    state.board.column_mut(to).push(task.clone());
    Json(task).into_response()
}

fn apply_draft(task: &mut Task, draft: &TaskDraft) {
    if let Some(title) = &draft.title {
        task.title = title.clone();
    }
    if let Some(description) = &draft.description {
        task.description = Some(description.clone());
    }
    if let Some(priority) = draft.priority {
        task.priority = priority;
    }
    if let Some(due) = draft.due_date {
        task.due_date = due;
    }
    if let Some(items) = draft.items {
        task.items = items;
    }
    if draft.weight.is_some() {
        task.weight = draft.weight;
    }
    if let Some(flag) = draft.has_blankets {
        task.has_blankets = flag;
    }
    if let Some(count) = draft.blanket_count {
        task.blanket_count = count;
    }
    if let Some(paid) = draft.is_paid {
        task.is_paid = paid;
    }
    if draft.total_price.is_some() {
        task.total_price = draft.total_price;
    }
    if draft.service_type.is_some() {
        task.service_type = draft.service_type.clone();
    }
    if draft.assigned_to_id.is_some() {
        task.assigned_to_id = draft.assigned_to_id.clone();
    }
}

async fn create_task(State(shop): State<FakeShop>, Json(draft): Json<TaskDraft>) -> Response {
    let mut state = shop.state();
    let (Some(title), Some(customer_id), Some(due)) = (&draft.title, &draft.customer_id, draft.due_date) else {
        return (StatusCode::BAD_REQUEST, "title, customerId and dueDate are required").into_response();
    };
    let Some(customer) = state.customers.iter().find(|c| &c.id == customer_id).cloned() else {
        return not_found("customer");
    };

    state.next_id += 1;
    let status = draft.status.unwrap_or(ColumnId::Todo);
    let mut task = Task::new(
        format!("new{}", state.next_id),
        title.clone(),
        status,
        CustomerSnapshot {
            id: customer.id,
            name: customer.name,
            room_number: customer.room_number,
        },
        due,
    );
    apply_draft(&mut task, &draft);
    state.board.column_mut(status).push(task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn update_task(State(shop): State<FakeShop>, Path(id): Path<String>, Json(draft): Json<TaskDraft>) -> Response {
    let mut state = shop.state();
    let Some(mut task) = take_task(&mut state.board, &id) else {
        return not_found("task");
    };
    apply_draft(&mut task, &draft);
    if let Some(status) = draft.status {
        task.status = status;
    }
    state.board.column_mut(task.status).push(task.clone());
    Json(task).into_response()
}

async fn delete_task(State(shop): State<FakeShop>, Path(id): Path<String>) -> Response {
    let mut state = shop.state();
    match take_task(&mut state.board, &id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => not_found("task"),
    }
}

async fn list_customers(State(shop): State<FakeShop>) -> Response {
    Json(shop.state().customers.clone()).into_response()
}

async fn get_customer(State(shop): State<FakeShop>, Path(id): Path<String>) -> Response {
    match shop.state().customers.iter().find(|c| c.id == id) {
        Some(customer) => Json(customer.clone()).into_response(),
        None => not_found("customer"),
    }
}

async fn list_rewards(State(shop): State<FakeShop>) -> Response {
    Json(shop.state().rewards.clone()).into_response()
}

async fn get_loyalty(State(shop): State<FakeShop>, Path(id): Path<String>) -> Response {
    match shop.state().loyalty.get(&id) {
        Some(account) => Json(account.clone()).into_response(),
        None => not_found("loyalty account"),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedeemBody {
    reward_id: String,
    points_cost: u32,
}

async fn redeem(State(shop): State<FakeShop>, Path(id): Path<String>, Json(body): Json<RedeemBody>) -> Response {
    let mut state = shop.state();
    if !state.rewards.iter().any(|r| r.id == body.reward_id) {
        return not_found("reward");
    }
    let Some(account) = state.loyalty.get_mut(&id) else {
        return not_found("loyalty account");
    };
    if account.points < body.points_cost {
        return (StatusCode::BAD_REQUEST, "not enough points").into_response();
    }
    account.points -= body.points_cost;
    account.tier = LoyaltyTier::for_points(account.points);
    Json(account.clone()).into_response()
}

async fn events(State(shop): State<FakeShop>) -> impl IntoResponse {
    let stream = BroadcastStream::new(shop.events.subscribe())
        .filter_map(|msg| msg.ok())
        .map(|data| Ok::<_, Infallible>(Event::default().event("task-moved").data(data)));
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_millis(100)))
}

// ── Fixtures ─────────────────────────────────────────────────────────

fn customer(id: &str, name: &str, room: Option<&str>) -> Customer {
    Customer {
        id: id.to_string(),
        name: name.to_string(),
        email: None,
        phone: None,
        room_number: room.map(str::to_string),
        loyalty_points: None,
        loyalty_tier: None,
        join_date: None,
        total_spent: None,
    }
}

fn order(id: &str, title: &str, status: ColumnId, who: &Customer, price: f64, paid: bool) -> Task {
    let mut task = Task::new(
        id,
        title,
        status,
        CustomerSnapshot {
            id: who.id.clone(),
            name: who.name.clone(),
            room_number: who.room_number.clone(),
        },
        Utc.with_ymd_and_hms(2030, 6, 1, 9, 0, 0).unwrap(),
    );
    task.total_price = Some(price);
    task.is_paid = paid;
    task
}

/// Four orders, one per column, for three customers.
pub fn seed() -> ShopState {
    let maria = customer("c1", "Maria", Some("204"));
    let jose = customer("c2", "Jose", None);
    let ana = customer("c3", "Ana", Some("101"));

    let mut wash = order("t1", "Wash Set", ColumnId::Todo, &maria, 250.0, false);
    wash.priority = Priority::High;
    let dry = order("t2", "Dry Clean", ColumnId::InProgress, &jose, 120.5, true);
    let mut blankets = order("t3", "Blanket Wash", ColumnId::Done, &maria, 300.0, true);
    blankets.has_blankets = true;
    blankets.blanket_count = 2;
    let fold = order("t4", "Fold Only", ColumnId::Delivery, &ana, 80.0, false);

    let board = KanbanData {
        todo: vec![wash],
        in_progress: vec![dry],
        done: vec![blankets],
        delivery: vec![fold],
    };

    let mut loyalty = HashMap::new();
    loyalty.insert(
        "c1".to_string(),
        LoyaltyAccount {
            id: "l1".to_string(),
            customer_id: "c1".to_string(),
            points: 320,
            lifetime_points: 800,
            tier: LoyaltyTier::Silver,
            join_date: None,
            redeemed_rewards: Vec::new(),
        },
    );

    let rewards = vec![
        Reward {
            id: "r1".to_string(),
            name: "Free Wash".to_string(),
            description: String::new(),
            points_cost: 150,
            kind: RewardKind::FreeService,
            expiry_days: 30,
        },
        Reward {
            id: "r2".to_string(),
            name: "Duvet Clean".to_string(),
            description: String::new(),
            points_cost: 900,
            kind: RewardKind::FreeService,
            expiry_days: 30,
        },
    ];

    ShopState {
        board,
        customers: vec![maria, jose, ana],
        loyalty,
        rewards,
        reject_moves: false,
        fail_board: false,
        moves: Vec::new(),
        last_auth: None,
        next_id: 0,
    }
}

/// Poll `check` every 20ms until it holds or two seconds pass.
pub async fn eventually<F: FnMut() -> bool>(mut check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}

pub fn task_id(id: &str) -> TaskId {
    TaskId::from(id)
}
