pub mod farms;
pub mod inputs;
pub mod tasks;
pub mod workers;
