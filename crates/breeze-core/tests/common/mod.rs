//! Shared test support: an in-memory GraphQL todo service served through
//! wiremock, so integration tests exercise the real HTTP + envelope path.

use std::sync::Mutex;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Stateful fake of the remote todo service.
///
/// Dispatches on the GraphQL operation inside the POSTed document and keeps
/// accounts and todos in memory, so mutation-then-refetch flows observe real
/// state changes instead of canned payloads.
pub struct FakeTodoService {
    state: Mutex<ServiceState>,
}

#[derive(Default)]
struct ServiceState {
    accounts: Vec<FakeAccount>,
    todos: Vec<FakeTodo>,
    next_account: u64,
    next_todo: u64,
}

struct FakeAccount {
    id: String,
    email: String,
    password: String,
}

struct FakeTodo {
    id: String,
    user_id: String,
    text: String,
    completed: bool,
}

#[allow(dead_code)]
impl FakeTodoService {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ServiceState::default()),
        }
    }

    /// Seed an account; ids are assigned in order as `u-1`, `u-2`, ...
    pub fn with_account(self, email: &str, password: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = format!("u-{}", state.next_account + 1);
            state.next_account += 1;
            state.accounts.push(FakeAccount {
                id,
                email: email.to_string(),
                password: password.to_string(),
            });
        }
        self
    }

    /// Seed a todo for a user; ids are assigned in order as `t-1`, `t-2`, ...
    pub fn with_todo(self, user_id: &str, text: &str, completed: bool) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = format!("t-{}", state.next_todo + 1);
            state.next_todo += 1;
            state.todos.push(FakeTodo {
                id,
                user_id: user_id.to_string(),
                text: text.to_string(),
                completed,
            });
        }
        self
    }

    /// Mount the service on a fresh mock server and return it.
    pub async fn start(self) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(self)
            .mount(&server)
            .await;
        server
    }
}

impl Respond for FakeTodoService {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let Ok(body) = serde_json::from_slice::<Value>(&request.body) else {
            return ResponseTemplate::new(400).set_body_string("malformed request body");
        };
        let query = body["query"].as_str().unwrap_or_default();
        let variables = &body["variables"];
        let mut state = self.state.lock().unwrap();
        ResponseTemplate::new(200).set_body_json(state.dispatch(query, variables))
    }
}

impl ServiceState {
    fn dispatch(&mut self, query: &str, variables: &Value) -> Value {
        if query.contains("mutation Login") {
            self.login(variables)
        } else if query.contains("mutation Signup") {
            self.signup(variables)
        } else if query.contains("query Todos") {
            self.todos(variables)
        } else if query.contains("mutation AddTodo") {
            self.add_todo(variables)
        } else if query.contains("mutation DeleteTodo") {
            self.delete_todo(variables)
        } else if query.contains("mutation ToggleTodoCompleted") {
            self.toggle_todo(variables)
        } else {
            graphql_error("Unknown operation")
        }
    }

    fn login(&self, variables: &Value) -> Value {
        let email = str_var(variables, "email");
        let password = str_var(variables, "password");
        match self
            .accounts
            .iter()
            .find(|account| account.email == email && account.password == password)
        {
            Some(account) => json!({
                "data": { "login": { "id": account.id, "email": account.email } }
            }),
            None => graphql_error("Invalid credentials"),
        }
    }

    fn signup(&mut self, variables: &Value) -> Value {
        let email = str_var(variables, "email");
        let password = str_var(variables, "password");
        if self.accounts.iter().any(|account| account.email == email) {
            return graphql_error("Email already registered");
        }
        let id = format!("u-{}", self.next_account + 1);
        self.next_account += 1;
        self.accounts.push(FakeAccount {
            id: id.clone(),
            email: email.clone(),
            password,
        });
        json!({ "data": { "signup": { "id": id, "email": email } } })
    }

    fn todos(&self, variables: &Value) -> Value {
        let user_id = str_var(variables, "userId");
        let todos: Vec<Value> = self
            .todos
            .iter()
            .filter(|todo| todo.user_id == user_id)
            .map(todo_json)
            .collect();
        json!({ "data": { "todos": todos } })
    }

    fn add_todo(&mut self, variables: &Value) -> Value {
        let user_id = str_var(variables, "userId");
        let text = str_var(variables, "text");
        let id = format!("t-{}", self.next_todo + 1);
        self.next_todo += 1;
        let todo = FakeTodo {
            id,
            user_id,
            text,
            completed: false,
        };
        let payload = json!({ "data": { "addTodo": todo_json(&todo) } });
        self.todos.push(todo);
        payload
    }

    fn delete_todo(&mut self, variables: &Value) -> Value {
        let id = str_var(variables, "id");
        let before = self.todos.len();
        self.todos.retain(|todo| todo.id != id);
        // A miss reports `false` rather than an error, mirroring the bare
        // boolean this mutation returns.
        json!({ "data": { "deleteTodo": self.todos.len() < before } })
    }

    fn toggle_todo(&mut self, variables: &Value) -> Value {
        let id = str_var(variables, "id");
        match self.todos.iter_mut().find(|todo| todo.id == id) {
            Some(todo) => {
                todo.completed = !todo.completed;
                json!({
                    "data": {
                        "toggleTodoCompleted": { "id": todo.id, "completed": todo.completed }
                    }
                })
            }
            None => graphql_error("Todo not found"),
        }
    }
}

fn todo_json(todo: &FakeTodo) -> Value {
    json!({ "id": todo.id, "text": todo.text, "completed": todo.completed })
}

fn graphql_error(message: &str) -> Value {
    json!({ "data": null, "errors": [{ "message": message }] })
}

fn str_var(variables: &Value, key: &str) -> String {
    variables[key].as_str().unwrap_or_default().to_string()
}

/// How many recorded requests carry the given GraphQL document fragment.
#[allow(dead_code)]
pub async fn requests_containing(server: &MockServer, fragment: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| {
            std::str::from_utf8(&request.body)
                .map(|body| body.contains(fragment))
                .unwrap_or(false)
        })
        .count()
}
