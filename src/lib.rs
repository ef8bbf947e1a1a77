pub mod allocation;
pub mod runtime;
