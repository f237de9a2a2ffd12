//! Typed GraphQL client for the remote todo service.
//!
//! Every operation is one HTTP POST of `{"query", "variables"}` to the
//! single configured endpoint. The operation names and selection sets are
//! the server's schema contract and must not drift; response payloads are
//! deserialized through per-operation wire structs.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::models::{Account, Todo, TodoId, TodoPatch, UserId};

const LOGIN: &str = "
  mutation Login($email: String!, $password: String!) {
    login(email: $email, password: $password) {
      id
      email
    }
  }
";

const SIGNUP: &str = "
  mutation Signup($email: String!, $password: String!) {
    signup(email: $email, password: $password) {
      id
      email
    }
  }
";

const GET_TODOS: &str = "
  query Todos($userId: ID!) {
    todos(userId: $userId) {
      id
      text
      completed
    }
  }
";

const ADD_TODO: &str = "
  mutation AddTodo($userId: ID!, $text: String!) {
    addTodo(userId: $userId, text: $text) {
      id
      text
      completed
    }
  }
";

const DELETE_TODO: &str = "
  mutation DeleteTodo($id: ID!) {
    deleteTodo(id: $id)
  }
";

const TOGGLE_TODO: &str = "
  mutation ToggleTodoCompleted($id: ID!) {
    toggleTodoCompleted(id: $id) {
      id
      completed
    }
  }
";

/// GraphQL client for the todo service.
///
/// Cheap to clone; construct once at startup and hand it to whatever drives
/// the screens.
#[derive(Debug, Clone)]
pub struct TodoApi {
    endpoint: String,
    client: Client,
}

impl TodoApi {
    /// Build a client against a validated endpoint.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            endpoint: config.endpoint().to_string(),
            client: Client::new(),
        }
    }

    /// Authenticate an existing account.
    pub async fn login(&self, email: &str, password: &str) -> Result<Account> {
        let data: LoginData = self
            .execute(LOGIN, json!({ "email": email, "password": password }))
            .await
            .map_err(auth_rejection)?;
        Ok(data.login)
    }

    /// Register a new account; the server signs it in implicitly by
    /// returning the account payload.
    pub async fn signup(&self, email: &str, password: &str) -> Result<Account> {
        let data: SignupData = self
            .execute(SIGNUP, json!({ "email": email, "password": password }))
            .await
            .map_err(auth_rejection)?;
        Ok(data.signup)
    }

    /// Fetch a user's full todo list. No pagination: the server returns
    /// everything the user owns.
    pub async fn todos(&self, user_id: &UserId) -> Result<Vec<Todo>> {
        let data: TodosData = self.execute(GET_TODOS, json!({ "userId": user_id })).await?;
        Ok(data.todos)
    }

    /// Create a todo and return it with its server-assigned id.
    ///
    /// Whitespace-only drafts are rejected locally before any request is
    /// sent; a draft that passes is transmitted exactly as typed.
    pub async fn add_todo(&self, user_id: &UserId, text: &str) -> Result<Todo> {
        if text.trim().is_empty() {
            return Err(Error::Validation("Todo text cannot be empty".to_string()));
        }
        let data: AddTodoData = self
            .execute(ADD_TODO, json!({ "userId": user_id, "text": text }))
            .await?;
        Ok(data.add_todo)
    }

    /// Delete a todo. The server answers with a bare boolean.
    pub async fn delete_todo(&self, id: &TodoId) -> Result<bool> {
        let data: DeleteTodoData = self.execute(DELETE_TODO, json!({ "id": id })).await?;
        Ok(data.delete_todo)
    }

    /// Flip a todo's completion flag server-side; the response carries only
    /// the id and the new flag.
    pub async fn toggle_todo(&self, id: &TodoId) -> Result<TodoPatch> {
        let data: ToggleTodoData = self.execute(TOGGLE_TODO, json!({ "id": id })).await?;
        Ok(data.toggle_todo_completed)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &'static str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let payload = GraphQlRequest { query, variables };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&payload)
            .send()
            .await
            .map_err(|error| Error::Network(error.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|error| Error::Network(error.to_string()))?;
        if !status.is_success() {
            return Err(Error::Server(describe_http_failure(status, &body)));
        }

        let envelope: GraphQlResponse<T> = serde_json::from_str(&body)?;
        if let Some(message) = envelope.first_error() {
            return Err(Error::Server(message));
        }
        envelope
            .data
            .ok_or_else(|| Error::Server("response carried neither data nor errors".to_string()))
    }
}

/// Login and signup share the transport with every other operation, but a
/// server-side rejection there is an authentication failure, not a generic
/// server fault.
fn auth_rejection(error: Error) -> Error {
    match error {
        Error::Server(message) => Error::Auth(message),
        other => other,
    }
}

fn describe_http_failure(status: StatusCode, body: &str) -> String {
    let compact: String = body.trim().chars().take(200).collect();
    if compact.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", compact, status.as_u16())
    }
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

impl<T> GraphQlResponse<T> {
    /// GraphQL allows multiple errors per response; the screens surface the
    /// first one, matching how the original banner behaved.
    fn first_error(&self) -> Option<String> {
        self.errors
            .as_ref()?
            .first()
            .map(|error| error.message.clone())
    }
}

#[derive(Debug, Deserialize)]
struct LoginData {
    login: Account,
}

#[derive(Debug, Deserialize)]
struct SignupData {
    signup: Account,
}

#[derive(Debug, Deserialize)]
struct TodosData {
    todos: Vec<Todo>,
}

#[derive(Debug, Deserialize)]
struct AddTodoData {
    #[serde(rename = "addTodo")]
    add_todo: Todo,
}

#[derive(Debug, Deserialize)]
struct DeleteTodoData {
    #[serde(rename = "deleteTodo")]
    delete_todo: bool,
}

#[derive(Debug, Deserialize)]
struct ToggleTodoData {
    #[serde(rename = "toggleTodoCompleted")]
    toggle_todo_completed: TodoPatch,
}
