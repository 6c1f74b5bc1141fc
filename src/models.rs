pub mod farms;
pub mod inputs;
pub mod tasks;
pub mod workers;

// Usado em `#[serde(default = "crate::models::default_true")]`
pub(crate) fn default_true() -> bool {
    true
}
