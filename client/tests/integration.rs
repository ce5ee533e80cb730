//! Full CRUD lifecycle test against a live todo server.
//!
//! # Design
//! Starts the server on a random port, then exercises every client operation
//! over real HTTP using ureq. Validates that request building and envelope
//! parsing work end-to-end against the actual server.

use todo_client::{ApiError, CreateTodo, HttpMethod, HttpResponse, Priority, TodoClient, UpdateTodo};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the client
/// handle status interpretation.
fn execute(req: todo_client::HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.url).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.url).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.url).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.url).send_empty(),
        (HttpMethod::Patch, Some(body)) => {
            agent.patch(&req.url).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Patch, None) => agent.patch(&req.url).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers: Vec::new(),
        body,
    }
}

#[test]
fn crud_lifecycle() {
    // Step 1: start the server on a random port.
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, todo_server::TodoService::in_memory()).await
        })
        .unwrap();
    });

    let client = TodoClient::new(&format!("http://{addr}/api/v1/todos"));

    // Step 2: list — should be empty.
    let todos = client.parse_list_todos(execute(client.build_list_todos(None))).unwrap();
    assert!(todos.is_empty(), "expected empty list");

    // Step 3: create two todos.
    let create_input = CreateTodo {
        title: "Buy milk".to_string(),
        completed: false,
        priority: Priority::Medium,
    };
    let req = client.build_create_todo(&create_input).unwrap();
    let created = client.parse_create_todo(execute(req)).unwrap();
    assert_eq!(created.title, "Buy milk");
    assert_eq!(created.priority, Priority::Medium);
    assert!(!created.completed);
    let id = created.id;

    let other = CreateTodo {
        title: "Fix the roof".to_string(),
        completed: false,
        priority: Priority::Extreme,
    };
    let req = client.build_create_todo(&other).unwrap();
    let other = client.parse_create_todo(execute(req)).unwrap();

    // Step 4: list — newest first, and filterable.
    let todos = client.parse_list_todos(execute(client.build_list_todos(None))).unwrap();
    assert_eq!(todos, vec![other.clone(), created.clone()]);
    let req = client.build_list_todos(Some(Priority::Medium));
    let todos = client.parse_list_todos(execute(req)).unwrap();
    assert_eq!(todos, vec![created.clone()]);

    // Step 5: mark done; title and priority are untouched.
    let update_input = UpdateTodo {
        completed: Some(true),
        ..UpdateTodo::default()
    };
    let req = client.build_update_todo(id, &update_input).unwrap();
    let updated = client.parse_update_todo(execute(req)).unwrap();
    assert!(updated.completed);
    assert_eq!(updated.title, "Buy milk");
    assert_eq!(updated.priority, Priority::Medium);

    // Step 6: invalid create comes back as a failure envelope.
    let blank = CreateTodo {
        title: String::new(),
        completed: false,
        priority: Priority::Normal,
    };
    let req = client.build_create_todo(&blank).unwrap();
    let err = client.parse_create_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::Api { status: 500, .. }));

    // Step 7: delete.
    client.parse_delete_todo(execute(client.build_delete_todo(id))).unwrap();

    // Step 8: update and delete after delete — NotFound.
    let req = client.build_update_todo(id, &update_input).unwrap();
    let err = client.parse_update_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    let err = client.parse_delete_todo(execute(client.build_delete_todo(id))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    // Step 9: list — only the other todo remains.
    let todos = client.parse_list_todos(execute(client.build_list_todos(None))).unwrap();
    assert_eq!(todos, vec![other]);
}
