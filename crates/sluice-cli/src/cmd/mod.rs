pub mod advance;
pub mod clear;
pub mod completions;
pub mod list;
pub mod set_status;
pub mod show;
pub mod submit;
pub mod watch;
