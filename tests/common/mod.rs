//! Common test utilities for integration tests
//! Provides an in-process fake of the student records backend plus builders.
//!
//! The fake keeps students in memory, records every request it receives and
//! can be told to fail a path or delay a keyword search.

#![allow(dead_code)]

use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use chrono::{Local, NaiveDateTime};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use student_records_client::models::{Category, Gender, Page, Student, StudentDraft};
use student_records_client::notify::{MemoryNotifier, Notifier};
use student_records_client::ApiClient;

/// One request as seen by the fake backend
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct BackendState {
    students: Vec<Student>,
    next_id: i64,
    requests: Vec<RecordedRequest>,
    /// path -> (status, raw body)
    overrides: HashMap<String, (u16, String)>,
    /// keyword -> delay in ms
    delays: HashMap<String, u64>,
}

type Shared = web::Data<Mutex<BackendState>>;

/// Handle to a running fake backend
pub struct FakeBackend {
    pub addr: String,
    state: Shared,
}

impl FakeBackend {
    /// Bind to a random port and serve in the background
    pub async fn start() -> Self {
        let state: Shared = web::Data::new(Mutex::new(BackendState {
            next_id: 1,
            ..Default::default()
        }));

        let app_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_state.clone())
                .default_service(web::to(handle))
        })
        .workers(1)
        .bind("127.0.0.1:0")
        .expect("Failed to bind fake backend");

        let addr = server
            .addrs()
            .first()
            .expect("No bind address found")
            .to_string();
        tokio::spawn(server.run());

        // Give server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(100)).await;

        FakeBackend { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(Some(&self.url()), Some(Duration::from_secs(10)))
            .expect("Failed to create API client")
    }

    pub fn shared_api(&self) -> Arc<ApiClient> {
        Arc::new(self.api())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().expect("backend state poisoned")
    }

    pub fn seed(&self, draft: StudentDraft) -> Student {
        self.seed_at(draft, Local::now().naive_local())
    }

    pub fn seed_at(&self, draft: StudentDraft, created_at: NaiveDateTime) -> Student {
        self.lock().insert(draft, created_at)
    }

    pub fn students(&self) -> Vec<Student> {
        self.lock().students.clone()
    }

    /// Answer every request to `path` with `status` and an optional `{message}` body
    pub fn fail(&self, path: &str, status: u16, message: Option<&str>) {
        let body = message
            .map(|m| json!({ "message": m }).to_string())
            .unwrap_or_default();
        self.respond_raw(path, status, &body);
    }

    pub fn respond_raw(&self, path: &str, status: u16, body: &str) {
        self.lock()
            .overrides
            .insert(path.to_string(), (status, body.to_string()));
    }

    pub fn clear_failures(&self) {
        self.lock().overrides.clear();
    }

    pub fn delay_keyword(&self, keyword: &str, millis: u64) {
        self.lock().delays.insert(keyword.to_string(), millis);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn requests_to(&self, method: &str, path_prefix: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path.starts_with(path_prefix))
            .collect()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.lock().requests.last().cloned()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }
}

async fn handle(req: HttpRequest, body: web::Bytes, state: Shared) -> HttpResponse {
    let method = req.method().as_str().to_string();
    let path = req.path().to_string();
    let query = web::Query::<BTreeMap<String, String>>::from_query(req.query_string())
        .map(|q| q.into_inner())
        .unwrap_or_default();
    let body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<Value>(&body).ok()
    };

    let delay = {
        let mut backend = state.lock().expect("backend state poisoned");
        backend.requests.push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: query.clone(),
            body: body.clone(),
        });
        query
            .get("keyword")
            .and_then(|k| backend.delays.get(k).copied())
    };
    if let Some(millis) = delay {
        actix_web::rt::time::sleep(Duration::from_millis(millis)).await;
    }

    let mut backend = state.lock().expect("backend state poisoned");
    if let Some((status, raw)) = backend.overrides.get(&path).cloned() {
        return HttpResponse::build(StatusCode::from_u16(status).expect("valid status"))
            .content_type("application/json")
            .body(raw);
    }
    backend.route(&method, &path, &query, body)
}

fn message(status: StatusCode, text: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "message": text }))
}

fn counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<Value> {
    let mut map: BTreeMap<&str, u64> = BTreeMap::new();
    for label in labels {
        *map.entry(label).or_default() += 1;
    }
    map.into_iter()
        .map(|(label, count)| json!({ "label": label, "count": count }))
        .collect()
}

impl BackendState {
    fn insert(&mut self, draft: StudentDraft, created_at: NaiveDateTime) -> Student {
        let student = Student {
            id: self.next_id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone_number: draft.phone_number,
            gender: draft.gender,
            address: draft.address,
            institute: draft.institute,
            category: draft.category,
            profile_image_url: draft.profile_image_url,
            created_at: Some(created_at),
            updated_at: Some(created_at),
        };
        self.next_id += 1;
        self.students.push(student.clone());
        student
    }

    fn route(
        &mut self,
        method: &str,
        path: &str,
        query: &BTreeMap<String, String>,
        body: Option<Value>,
    ) -> HttpResponse {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match (method, segments.as_slice()) {
            ("GET", ["dashboard", "total-students"]) => {
                HttpResponse::Ok().json(self.students.len())
            }
            ("GET", ["dashboard", "gender-count"]) => {
                HttpResponse::Ok().json(counts(self.students.iter().map(|s| s.gender.as_str())))
            }
            ("GET", ["dashboard", "category-count"]) => HttpResponse::Ok()
                .json(counts(self.students.iter().map(|s| s.category.as_str()))),
            ("GET", ["dashboard", "institute-count"]) => HttpResponse::Ok()
                .json(counts(self.students.iter().map(|s| s.institute.as_str()))),
            ("GET", ["dashboard", "registration-trend"]) => {
                let year: i32 = match query.get("year").and_then(|y| y.parse().ok()) {
                    Some(year) => year,
                    None => return message(StatusCode::BAD_REQUEST, "year is required"),
                };
                let mut months: BTreeMap<u32, u64> = BTreeMap::new();
                for created in self.students.iter().filter_map(|s| s.created_at) {
                    if chrono::Datelike::year(&created) == year {
                        *months.entry(chrono::Datelike::month(&created)).or_default() += 1;
                    }
                }
                let trend: Vec<Value> = months
                    .into_iter()
                    .map(|(month, count)| json!({ "month": month, "count": count }))
                    .collect();
                HttpResponse::Ok().json(trend)
            }
            ("GET", ["students", "search"]) => {
                let keyword = query
                    .get("keyword")
                    .map(|k| k.to_lowercase())
                    .unwrap_or_default();
                let matches = self
                    .students
                    .iter()
                    .filter(|s| {
                        keyword.is_empty()
                            || [&s.first_name, &s.last_name, &s.email, &s.institute]
                                .iter()
                                .any(|v| v.to_lowercase().contains(&keyword))
                    })
                    .cloned()
                    .collect();
                HttpResponse::Ok().json(paginate(matches, query))
            }
            ("GET", ["students", "category", category]) => {
                let category: Category = match category.parse() {
                    Ok(category) => category,
                    Err(_) => return message(StatusCode::BAD_REQUEST, "Unknown category"),
                };
                let matches = self
                    .students
                    .iter()
                    .filter(|s| s.category == category)
                    .cloned()
                    .collect();
                HttpResponse::Ok().json(paginate(matches, query))
            }
            ("POST", ["students"]) => {
                let draft: StudentDraft = match body.map(serde_json::from_value) {
                    Some(Ok(draft)) => draft,
                    _ => return message(StatusCode::BAD_REQUEST, "Malformed student"),
                };
                if draft.first_name.is_empty() || draft.email.is_empty() {
                    return message(StatusCode::BAD_REQUEST, "First name and email are required");
                }
                if self.students.iter().any(|s| s.email == draft.email) {
                    return message(StatusCode::CONFLICT, "Email already exists");
                }
                let student = self.insert(draft, Local::now().naive_local());
                HttpResponse::Created().json(student)
            }
            ("PATCH", ["students", id]) => {
                let Some(student) = id
                    .parse::<i64>()
                    .ok()
                    .and_then(|id| self.students.iter_mut().find(|s| s.id == id))
                else {
                    return message(StatusCode::NOT_FOUND, "Student not found");
                };
                let mut merged = serde_json::to_value(&*student).expect("student serializes");
                if let (Some(target), Some(Value::Object(patch))) = (merged.as_object_mut(), body) {
                    for (key, value) in patch {
                        target.insert(key, value);
                    }
                }
                match serde_json::from_value::<Student>(merged) {
                    Ok(mut updated) => {
                        updated.updated_at = Some(Local::now().naive_local());
                        *student = updated.clone();
                        HttpResponse::Ok().json(updated)
                    }
                    Err(_) => message(StatusCode::BAD_REQUEST, "Invalid field value"),
                }
            }
            ("DELETE", ["students", id]) => {
                let before = self.students.len();
                if let Ok(id) = id.parse::<i64>() {
                    self.students.retain(|s| s.id != id);
                }
                if self.students.len() == before {
                    message(StatusCode::NOT_FOUND, "Student not found")
                } else {
                    HttpResponse::NoContent().finish()
                }
            }
            _ => message(StatusCode::NOT_FOUND, "No such endpoint"),
        }
    }
}

fn paginate(mut students: Vec<Student>, query: &BTreeMap<String, String>) -> Page<Student> {
    let size: usize = query
        .get("size")
        .and_then(|s| s.parse().ok())
        .filter(|s| *s > 0)
        .unwrap_or(10);
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let sort_by = query.get("sortBy").map(String::as_str).unwrap_or("createdAt");
    let descending = query.get("direction").map(String::as_str) == Some("desc");

    students.sort_by(|a, b| {
        let ordering = match sort_by {
            "firstName" => a.first_name.cmp(&b.first_name),
            "lastName" => a.last_name.cmp(&b.last_name),
            "email" => a.email.cmp(&b.email),
            "category" => a.category.as_str().cmp(b.category.as_str()),
            _ => a.created_at.cmp(&b.created_at),
        }
        .then(a.id.cmp(&b.id));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    let total = students.len();
    Page {
        total_pages: total.div_ceil(size) as u32,
        total_elements: total as u64,
        number: page as u32,
        size: size as u32,
        content: students.into_iter().skip(page * size).take(size).collect(),
    }
}

/// Helper for building student drafts
pub struct TestStudentBuilder {
    draft: StudentDraft,
}

impl Default for TestStudentBuilder {
    fn default() -> Self {
        TestStudentBuilder {
            draft: StudentDraft {
                first_name: "Test".to_string(),
                last_name: "Student".to_string(),
                email: "test@example.com".to_string(),
                phone_number: "9000000000".to_string(),
                gender: Gender::Male,
                address: "1 Main Street".to_string(),
                institute: "NIT".to_string(),
                category: Category::Cs,
                profile_image_url: String::new(),
            },
        }
    }
}

impl TestStudentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets first name and a matching unique email
    pub fn named(mut self, first_name: &str) -> Self {
        self.draft.first_name = first_name.to_string();
        self.draft.email = format!("{}@example.com", first_name.to_lowercase());
        self
    }

    pub fn last_name(mut self, last_name: &str) -> Self {
        self.draft.last_name = last_name.to_string();
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.draft.gender = gender;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.draft.category = category;
        self
    }

    pub fn institute(mut self, institute: &str) -> Self {
        self.draft.institute = institute.to_string();
        self
    }

    pub fn build(self) -> StudentDraft {
        self.draft
    }
}

/// Shared notifier handle plus the trait object controllers take
pub fn notifier() -> (MemoryNotifier, Arc<dyn Notifier>) {
    let notifier = MemoryNotifier::new();
    let shared: Arc<dyn Notifier> = Arc::new(notifier.clone());
    (notifier, shared)
}

pub fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
