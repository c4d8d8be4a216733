pub mod batch;
pub mod hf;
