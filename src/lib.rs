pub mod bot;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod handlers;
pub mod slack;
pub mod store;
pub mod templates;

#[cfg(test)]
mod testing;

pub use bot::run;
