// tavola-client/tests/common/mod.rs
// Scripted in-memory backend for bridge tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tavola_client::backend::{Backend, Query, Row};
use tavola_client::{ClientError, ClientResult, Session, SessionUser};

/// How the admin remote procedure answers
#[derive(Debug, Clone)]
pub enum RpcAnswer {
    Value(Value),
    Error,
}

/// In-memory tables with per-operation failure switches
pub struct MockBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    failing_selects: Mutex<HashSet<String>>,
    fail_writes: Mutex<bool>,
    session: Mutex<Option<Session>>,
    rpc_answer: Mutex<RpcAnswer>,
    calls: Mutex<Vec<String>>,
    next_id: Mutex<i64>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            failing_selects: Mutex::new(HashSet::new()),
            fail_writes: Mutex::new(false),
            session: Mutex::new(None),
            rpc_answer: Mutex::new(RpcAnswer::Value(json!(false))),
            calls: Mutex::new(Vec::new()),
            next_id: Mutex::new(1000),
        }
    }

    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.tables.lock().unwrap().insert(table.to_string(), rows);
        self
    }

    pub fn with_session(self) -> Self {
        *self.session.lock().unwrap() = Some(Session {
            access_token: "jwt".into(),
            refresh_token: None,
            expires_at: None,
            user: SessionUser {
                id: "user-1".into(),
                email: Some("staff@example.com".into()),
                role: Some("authenticated".into()),
            },
        });
        self
    }

    pub fn with_rpc(self, answer: RpcAnswer) -> Self {
        *self.rpc_answer.lock().unwrap() = answer;
        self
    }

    pub fn fail_select(self, table: &str) -> Self {
        self.failing_selects.lock().unwrap().insert(table.to_string());
        self
    }

    pub fn fail_writes(self) -> Self {
        *self.fail_writes.lock().unwrap() = true;
        self
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn denied(&self) -> ClientResult<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(ClientError::backend("42501", "permission denied for table"));
        }
        Ok(())
    }

    fn matches(row: &Value, query: &Query) -> bool {
        query.filters.iter().all(|f| match row.get(&f.column) {
            Some(Value::String(s)) => *s == f.value,
            Some(other) => other.to_string() == f.value,
            None => false,
        })
    }

    fn project(row: &Value, columns: &str) -> Value {
        if columns == "*" {
            return row.clone();
        }
        let mut out = Map::new();
        for column in columns.split(',') {
            if let Some(v) = row.get(column) {
                out.insert(column.to_string(), v.clone());
            }
        }
        Value::Object(out)
    }
}

fn sort_key(value: Option<&Value>) -> (f64, String) {
    match value {
        Some(Value::Number(n)) => (n.as_f64().unwrap_or(0.0), String::new()),
        Some(Value::String(s)) => (0.0, s.clone()),
        _ => (0.0, String::new()),
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn select(&self, query: &Query) -> ClientResult<Vec<Row>> {
        self.record(format!("select:{}", query.table));
        if self.failing_selects.lock().unwrap().contains(&query.table) {
            return Err(ClientError::backend("42501", "permission denied for table"));
        }

        let mut rows: Vec<Value> = self
            .rows(&query.table)
            .into_iter()
            .filter(|row| Self::matches(row, query))
            .collect();
        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ka = sort_key(a.get(&order.column));
                let kb = sort_key(b.get(&order.column));
                let ord = ka.partial_cmp(&kb).unwrap_or(std::cmp::Ordering::Equal);
                if order.ascending { ord } else { ord.reverse() }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows
            .iter()
            .map(|row| Self::project(row, &query.columns))
            .collect())
    }

    async fn insert(
        &self,
        table: &str,
        rows: Vec<Map<String, Value>>,
        returning: bool,
    ) -> ClientResult<Vec<Row>> {
        self.record(format!("insert:{table}"));
        self.denied()?;

        let mut inserted = Vec::new();
        for mut row in rows {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            row.insert("id".to_string(), json!(*next_id));
            inserted.push(Value::Object(row));
        }
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(inserted.clone());
        Ok(if returning { inserted } else { Vec::new() })
    }

    async fn update(&self, query: &Query, patch: Map<String, Value>) -> ClientResult<Vec<Row>> {
        self.record(format!("update:{}", query.table));
        self.denied()?;

        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(query.table.clone()).or_default();
        let mut updated = Vec::new();
        for row in rows.iter_mut().filter(|row| Self::matches(row, query)) {
            if let Some(obj) = row.as_object_mut() {
                for (k, v) in &patch {
                    obj.insert(k.clone(), v.clone());
                }
            }
            updated.push(Self::project(row, &query.columns));
        }
        Ok(updated)
    }

    async fn delete(&self, query: &Query) -> ClientResult<()> {
        self.record(format!("delete:{}", query.table));
        self.denied()?;

        let mut tables = self.tables.lock().unwrap();
        if let Some(rows) = tables.get_mut(&query.table) {
            rows.retain(|row| !Self::matches(row, query));
        }
        Ok(())
    }

    async fn session(&self) -> ClientResult<Option<Session>> {
        self.record("session".to_string());
        Ok(self.session.lock().unwrap().clone())
    }

    async fn rpc(&self, function: &str, _args: Value) -> ClientResult<Value> {
        self.record(format!("rpc:{function}"));
        match self.rpc_answer.lock().unwrap().clone() {
            RpcAnswer::Value(v) => Ok(v),
            RpcAnswer::Error => Err(ClientError::NotFound(format!("function {function}"))),
        }
    }
}

pub fn reservation_row(id: i64, name: &str, date: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "phone": "555-0100",
        "date": date,
        "people": 2,
        "status": "new",
        "notes": "",
        "table_no": null,
        "duration_minutes": 90
    })
}
