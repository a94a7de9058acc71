// tabrecon CLI library: everything between the command line and the engine.

pub mod context;
pub mod job;
pub mod paths;
pub mod persist;
pub mod pipeline;
pub mod validate;
