pub mod add;
pub mod common;
pub mod conflict;
pub mod delete;
pub mod edit;
pub mod export;
pub mod list;
pub mod seed;
pub mod show;
pub mod status;
pub mod sync;
