pub mod common;
pub mod discard;
pub mod edit;
pub mod show;
