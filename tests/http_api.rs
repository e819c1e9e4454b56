//! End-to-end tests against a real listening server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use task_runner::executor::manager::{ManagerConfig, TaskManager};
use task_runner::executor::registry::FnFactory;
use task_runner::executor::types::{Task, TaskStatus};
use task_runner::server::serve;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<anyhow::Result<()>>,
}

async fn start_server(manager: Arc<TaskManager>) -> TestServer {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(serve(
        listener,
        manager,
        Duration::from_secs(5),
        async move {
            let _ = shutdown_rx.await;
        },
    ));

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

fn test_manager() -> Arc<TaskManager> {
    let manager = TaskManager::new(ManagerConfig {
        queue_capacity: 2,
        tick_interval: Duration::from_millis(20),
    });

    manager.register_factory("mock", FnFactory::shared(|_task| async { Ok(()) }));
    manager.register_factory(
        "blocked",
        FnFactory::shared(|_task| async {
            std::future::pending::<()>().await;
            Ok(())
        }),
    );

    manager
}

async fn poll_until_terminal(client: &reqwest::Client, url: &str) -> Task {
    let deadline = Instant::now() + Duration::from_secs(2);

    loop {
        let task: Task = client.get(url).send().await.unwrap().json().await.unwrap();
        if task.status.is_terminal() {
            return task;
        }
        assert!(Instant::now() < deadline, "task never finished: {:?}", task);
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_create_poll_delete_over_http() {
    let server = start_server(test_manager()).await;
    let client = reqwest::Client::new();
    let base = format!("http://{}", server.addr);

    // Create
    let response = client
        .post(format!("{base}/tasks?type=mock"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CREATED);
    let created: Task = response.json().await.unwrap();
    assert_eq!(created.status, TaskStatus::Pending);
    assert_eq!(created.task_type, "mock");

    // Poll
    let url = format!("{base}/tasks/{}", created.id);
    let finished = poll_until_terminal(&client, &url).await;
    assert_eq!(finished.status, TaskStatus::Done);
    assert!(finished.result.is_some());
    assert!(finished.duration.is_some());

    // Delete
    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);
    let response = client.get(&url).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

    drop(client);
    server.shutdown.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_admission_and_conflicts_over_http() {
    let server = start_server(test_manager()).await;
    let client = reqwest::Client::new();
    let base = format!("http://{}", server.addr);

    let first: Task = client
        .post(format!("{base}/tasks?type=blocked"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second = client
        .post(format!("{base}/tasks?type=blocked"))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), reqwest::StatusCode::CREATED);

    let third = client
        .post(format!("{base}/tasks?type=blocked"))
        .send()
        .await
        .unwrap();
    assert_eq!(third.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);

    // Wait for the first task to be picked up, then try to delete it
    let url = format!("{base}/tasks/{}", first.id);
    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let task: Task = client.get(&url).send().await.unwrap().json().await.unwrap();
        if task.status == TaskStatus::Running {
            break;
        }
        assert!(Instant::now() < deadline, "task never started");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let response = client.delete(&url).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);

    let response = client
        .post(format!("{base}/tasks?type=nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let response = client.put(format!("{base}/tasks")).send().await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);

    drop(client);
    server.shutdown.send(()).unwrap();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_is_bounded_by_grace_period() {
    let grace = Duration::from_millis(300);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, shutdown_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(serve(listener, test_manager(), grace, async move {
        let _ = shutdown_rx.await;
    }));

    // A request whose head never completes keeps its connection in flight
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /tasks/x HTTP/1.1\r\nHost: localhost\r\n")
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let started = Instant::now();
    shutdown.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(3), handle).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Ok(Ok(Ok(())))), "serve did not return Ok: {:?}", result);
    assert!(elapsed >= grace, "returned before the grace period: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "grace period not enforced: {:?}", elapsed);

    drop(stream);
}
