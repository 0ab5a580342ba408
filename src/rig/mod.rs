pub mod descriptor;
pub mod transition;
