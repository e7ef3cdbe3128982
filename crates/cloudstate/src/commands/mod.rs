pub mod id;
pub mod plan;
pub mod resources;
pub mod state;
