//! Concurrent dispatch: independent calls must not observe each other.

mod common;

use common::{Greet, GreetHandler, Ping};
use courier::testing::CountingEventHandler;
use courier::{BoxError, Context, EventRegistration, Mediator};
use std::sync::Arc;

#[tokio::test]
async fn concurrent_commands_get_independent_responses() {
    let mediator = Arc::new(Mediator::new());
    mediator.register_command_handler::<Greet, _>(GreetHandler);

    let mut tasks = Vec::new();
    for i in 0..16 {
        let mediator = Arc::clone(&mediator);
        tasks.push(tokio::spawn(async move {
            let ctx = Context::new();
            let reply: String = mediator
                .send_command(&ctx, Greet::new(format!("caller-{i}")))
                .await
                .unwrap();
            (i, reply)
        }));
    }

    for task in tasks {
        let (i, reply) = task.await.unwrap();
        assert_eq!(reply, format!("hello, caller-{i}"), "cross-talk between calls");
    }
}

#[tokio::test]
async fn registration_and_dispatch_interleave_safely() {
    let mediator = Arc::new(Mediator::new());
    mediator
        .register_event_handlers([EventRegistration::<Ping>::named(
            "base",
            CountingEventHandler::new(),
        )])
        .unwrap();

    let registrar = {
        let mediator = Arc::clone(&mediator);
        tokio::spawn(async move {
            for i in 0..32 {
                mediator
                    .register_event_handlers([EventRegistration::<Ping>::named(
                        format!("extra-{i}"),
                        CountingEventHandler::new(),
                    )])
                    .unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    let publisher = {
        let mediator = Arc::clone(&mediator);
        tokio::spawn(async move {
            let ctx = Context::new();
            for _ in 0..32 {
                // The base handler is always present, so publish never fails.
                mediator.publish(&ctx, Ping).await.unwrap();
                tokio::task::yield_now().await;
            }
        })
    };

    registrar.await.unwrap();
    publisher.await.unwrap();
}

#[tokio::test]
async fn concurrent_queries_do_not_block_each_other_on_the_registry() {
    let mediator = Arc::new(Mediator::new());
    mediator.register_query_handler::<Greet, _>(|_ctx: Context, req: Greet| async move {
        tokio::task::yield_now().await;
        Ok::<String, BoxError>(req.name)
    });

    let mut tasks = Vec::new();
    for i in 0..8 {
        let mediator = Arc::clone(&mediator);
        tasks.push(tokio::spawn(async move {
            let ctx = Context::new();
            mediator
                .send_query::<String, _>(&ctx, Greet::new(format!("q{i}")))
                .await
                .unwrap()
        }));
    }

    let mut replies = Vec::new();
    for task in tasks {
        replies.push(task.await.unwrap());
    }
    replies.sort();
    assert_eq!(replies.len(), 8);
    assert_eq!(replies[0], "q0");
    assert_eq!(replies[7], "q7");
}
