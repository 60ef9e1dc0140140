pub mod defaults;
pub mod generator;
pub mod template;
