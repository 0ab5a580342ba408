pub mod blend;
pub mod builtin;
pub mod evaluator;
pub mod registry;
pub mod root;
pub mod tree;
