use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub mod case_events;
pub mod case_search;
pub mod idam;
pub mod role_assignment;
