//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use courier::{BoxError, Context, Message, RequestHandler};

#[derive(Clone, Debug, PartialEq)]
pub struct Greet {
    pub name: String,
}

impl Message for Greet {}

impl Greet {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ping;

impl Message for Ping {}

pub struct GreetHandler;

impl RequestHandler<Greet> for GreetHandler {
    type Response = String;

    async fn handle(&self, _ctx: Context, request: Greet) -> Result<String, BoxError> {
        Ok(format!("hello, {}", request.name))
    }
}
