pub mod artifact;
pub mod commit;
pub mod config;
pub mod context;
pub mod error;
pub mod git;
pub mod io;
pub mod markdown;
pub mod paths;
pub mod pipeline;
pub mod plan;
pub mod rca;
pub mod state;
pub mod tracker;
pub mod types;
pub mod validate;

pub use error::{HandoffError, Result};
