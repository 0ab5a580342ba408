pub mod evaluation;
pub mod joints;
pub mod pose;
pub mod post_process;
pub mod variables;
