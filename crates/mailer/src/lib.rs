//! Process wiring for the `notify-mailer` binary.

pub mod app;
pub mod args;
pub mod input;
