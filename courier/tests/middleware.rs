//! Middleware chains around dispatch: idempotence, short-circuit policy,
//! post-chain behavior.

mod common;

use common::{Greet, GreetHandler};
use courier::middleware::{self, Flow};
use courier::{BoxError, Context, DispatchError, ErasedRequest, Mediator, observe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn counting(
    counter: Arc<AtomicUsize>,
) -> impl Fn(Context, ErasedRequest) -> (Context, ErasedRequest, Flow) + Send + Sync + 'static {
    move |ctx, request| {
        counter.fetch_add(1, Ordering::SeqCst);
        (ctx, request, Flow::Continue)
    }
}

#[tokio::test]
async fn same_named_middleware_executes_once_per_dispatch() {
    let mediator = Mediator::new();
    let counter = Arc::new(AtomicUsize::new(0));

    mediator
        .register_command_handler::<Greet, _>(GreetHandler)
        .pre("count", counting(counter.clone()))
        .pre("count", counting(counter.clone()));

    let ctx = Context::new();
    let _: String = mediator
        .send_command(&ctx, Greet::new("Ana"))
        .await
        .unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    let _: String = mediator
        .send_command(&ctx, Greet::new("Ana"))
        .await
        .unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn halt_skips_middleware_but_not_the_handler() {
    let mediator = Mediator::new();
    let ran = Arc::new(Mutex::new(Vec::new()));

    let trace = |label: &'static str, flow: Flow| {
        let ran = ran.clone();
        move |ctx: Context, request: ErasedRequest| {
            ran.lock().unwrap().push(label);
            (ctx, request, flow)
        }
    };

    mediator
        .register_command_handler::<Greet, _>(GreetHandler)
        .pre("a", trace("a", Flow::Continue))
        .pre(
            "b",
            middleware::typed::<Greet, _>(|ctx, mut greet| {
                greet.name = "halted".into();
                (ctx, greet, Flow::Halt)
            }),
        )
        .pre("c", trace("c", Flow::Continue));

    let ctx = Context::new();
    let reply: String = mediator
        .send_command(&ctx, Greet::new("Ana"))
        .await
        .unwrap();

    // The handler still ran, with the request the halting middleware produced.
    assert_eq!(reply, "hello, halted");
    assert_eq!(*ran.lock().unwrap(), ["a"]);
}

#[tokio::test]
async fn post_chain_runs_even_when_the_handler_fails() {
    let mediator = Mediator::new();
    let post_ran = Arc::new(AtomicUsize::new(0));

    mediator
        .register_command_handler::<Greet, _>(|_ctx: Context, _req: Greet| async move {
            Err::<String, BoxError>("boom".into())
        })
        .post("observe", counting(post_ran.clone()));

    let ctx = Context::new();
    let err = mediator
        .send_command::<String, _>(&ctx, Greet::new("Ana"))
        .await
        .unwrap_err();

    assert!(matches!(err, DispatchError::Handler(_)));
    assert_eq!(post_ran.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn post_chain_cannot_rewrite_the_response() {
    let mediator = Mediator::new();

    mediator
        .register_command_handler::<Greet, _>(GreetHandler)
        .post("rewrite", |ctx, _request| {
            (ctx, Arc::new(String::from("hijacked")) as ErasedRequest, Flow::Continue)
        });

    let ctx = Context::new();
    let reply: String = mediator
        .send_command(&ctx, Greet::new("Ana"))
        .await
        .unwrap();
    assert_eq!(reply, "hello, Ana");
}

#[tokio::test]
async fn middleware_chains_are_per_handler() {
    #[derive(Clone, Debug)]
    struct Other;
    impl courier::Message for Other {}

    let mediator = Mediator::new();
    let counter = Arc::new(AtomicUsize::new(0));

    mediator
        .register_command_handler::<Greet, _>(GreetHandler)
        .pre("count", counting(counter.clone()));
    mediator.register_command_handler::<Other, _>(|_ctx: Context, _req: Other| async move {
        Ok::<(), BoxError>(())
    });

    let ctx = Context::new();
    let _: () = mediator.send_command(&ctx, Other).await.unwrap();
    assert_eq!(
        counter.load(Ordering::SeqCst),
        0,
        "other handler's dispatch must not run this chain"
    );
}

#[tokio::test]
async fn stamped_context_is_visible_to_later_middleware_only() {
    #[derive(Clone, Debug, PartialEq)]
    struct Stage(&'static str);

    let mediator = Mediator::new();
    let seen_by_handler = Arc::new(Mutex::new(None));
    let seen = seen_by_handler.clone();

    mediator
        .register_command_handler::<Greet, _>(move |ctx: Context, req: Greet| {
            let seen = seen.clone();
            async move {
                *seen.lock().unwrap() = ctx.get::<Stage>().cloned();
                Ok::<String, BoxError>(req.name)
            }
        })
        .pre("log", observe::log_requests("greet"))
        .pre("stamp", observe::stamp(Stage("validated")));

    let ctx = Context::new();
    let _: String = mediator
        .send_command(&ctx, Greet::new("Ana"))
        .await
        .unwrap();

    // Context edits are chain-local; the handler sees the caller's context.
    assert_eq!(*seen_by_handler.lock().unwrap(), None);
}

#[tokio::test]
async fn rewritten_request_of_wrong_type_is_surfaced() {
    let mediator = Mediator::new();

    mediator
        .register_command_handler::<Greet, _>(GreetHandler)
        .pre("sabotage", |ctx, _request| {
            (ctx, Arc::new(42u32) as ErasedRequest, Flow::Continue)
        });

    let ctx = Context::new();
    let err = mediator
        .send_command::<String, _>(&ctx, Greet::new("Ana"))
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::RequestTypeMismatch { .. }));
}
