pub mod bootstrap;
pub mod cache;
pub mod candidates;
pub mod category;
pub mod commands;
pub mod config;
pub mod notice;
pub mod picker;
pub mod process;
pub mod resolver;
pub mod runtime;

#[cfg(test)]
mod testing;
