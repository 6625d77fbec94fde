//! Drives a queue the way an executor would: front to back, handing each
//! middleware a `next` continuation.

use std::any::type_name;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tsu_middleware::{Entry, Error, MiddlewareQueue};

type Trail = Vec<&'static str>;
type BoxFuture = Pin<Box<dyn Future<Output = Trail> + Send + 'static>>;

/// The call signature this executor expects every entry to store.
trait Layer: Send + Sync + 'static {
    fn call(&self, trail: Trail, next: Next) -> BoxFuture;
}

type Step = Arc<dyn Layer>;

struct Next {
    queue: Arc<MiddlewareQueue>,
    index: usize,
}

impl Next {
    fn run(self, trail: Trail) -> BoxFuture {
        run(self.queue, self.index, trail)
    }
}

fn run(queue: Arc<MiddlewareQueue>, index: usize, trail: Trail) -> BoxFuture {
    let step = queue
        .get(index)
        .and_then(|entry| entry.downcast_ref::<Step>())
        .cloned();

    match step {
        Some(step) => step.call(trail, Next { queue, index: index + 1 }),
        None => Box::pin(async move { trail }),
    }
}

// ── Middleware ────────────────────────────────────────────────────────────────

struct Mark(&'static str);

impl Layer for Mark {
    fn call(&self, mut trail: Trail, next: Next) -> BoxFuture {
        trail.push(self.0);
        next.run(trail)
    }
}

struct Auth;

impl Layer for Auth {
    fn call(&self, mut trail: Trail, next: Next) -> BoxFuture {
        trail.push("auth");
        next.run(trail)
    }
}

struct Deny;

impl Layer for Deny {
    fn call(&self, mut trail: Trail, _next: Next) -> BoxFuture {
        Box::pin(async move {
            trail.push("deny");
            trail
        })
    }
}

fn layer<L: Layer>(unit: L) -> Entry {
    Entry::tagged::<L, _>(Arc::new(unit) as Step)
}

fn mark(name: &'static str) -> Entry {
    Entry::callable(Arc::new(Mark(name)) as Step)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn executor_walks_entries_in_queue_order() -> Result<(), Error> {
    init_tracing();

    let mut queue = MiddlewareQueue::new();
    queue
        .add(mark("log"))
        .add(layer(Auth))
        .add(mark("route"))
        .insert_before_type::<Auth>(mark("cors"))?
        .insert_after_type::<Auth>(mark("session"))
        .prepend(mark("request-id"));

    let trail = run(Arc::new(queue), 0, Vec::new()).await;
    assert_eq!(trail, ["request-id", "log", "cors", "auth", "session", "route"]);
    Ok(())
}

#[tokio::test]
async fn short_circuit_skips_the_rest() {
    init_tracing();

    let mut queue = MiddlewareQueue::new();
    queue
        .add(mark("log"))
        .add(mark("route"))
        .insert_at(-1, layer(Deny));

    let trail = run(Arc::new(queue), 0, Vec::new()).await;
    assert_eq!(trail, ["log", "deny"]);
}

#[tokio::test]
async fn missing_anchor_for_insert_after_still_runs() {
    init_tracing();

    let mut queue = MiddlewareQueue::from(vec![mark("log"), mark("route")]);
    queue.insert_after_type::<Auth>(mark("late"));

    let trail = run(Arc::new(queue), 0, Vec::new()).await;
    assert_eq!(trail, ["log", "route", "late"]);
}

#[tokio::test]
async fn missing_anchor_for_insert_before_is_reported() {
    init_tracing();

    let mut queue = MiddlewareQueue::from(vec![mark("log")]);
    let err = queue.insert_before_type::<Auth>(mark("early")).unwrap_err();

    assert_eq!(err, Error::NotFound { type_name: type_name::<Auth>().to_owned() });
    let trail = run(Arc::new(queue), 0, Vec::new()).await;
    assert_eq!(trail, ["log"]);
}

#[tokio::test]
async fn finished_queue_is_shared_across_tasks() {
    let mut queue = MiddlewareQueue::new();
    queue.add(mark("a")).add(layer(Auth)).add(mark("b"));
    let queue = Arc::new(queue);

    let tasks: Vec<_> = (0..4)
        .map(|_| tokio::spawn(run(Arc::clone(&queue), 0, Vec::new())))
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap(), ["a", "auth", "b"]);
    }
}

#[tokio::test]
async fn string_lookup_finds_tagged_layers() {
    let mut queue = MiddlewareQueue::from(vec![layer(Auth), mark("route")]);
    queue.insert_after(type_name::<Auth>(), mark("session"));

    let trail = run(Arc::new(queue), 0, Vec::new()).await;
    assert_eq!(trail, ["auth", "session", "route"]);
}

#[test]
fn count_and_get_cover_the_whole_pipeline() {
    let mut queue = MiddlewareQueue::new();
    queue.add(mark("a")).add(mark("b")).add(layer(Auth));

    let by_index: Vec<_> = (0..queue.count()).map(|i| queue.get(i).unwrap()).collect();
    let by_iter: Vec<_> = (&queue).into_iter().collect();

    assert_eq!(by_index.len(), 3);
    for (x, y) in by_index.iter().zip(by_iter) {
        assert!(x.ptr_eq(y));
    }
    assert!(queue.get(queue.count()).is_none());
}
