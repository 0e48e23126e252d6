//! Application-level orchestration utilities.
//!
//! This module owns request execution (submit/supersede/abandon) and post-result
//! processing such as document export. UI/CLI layers call into this module to keep
//! responsibilities separated.

mod controller;
mod post_process;

pub(crate) use controller::{run_controller, AppEvent, UiCommand};
pub(crate) use post_process::process_result_completion;
