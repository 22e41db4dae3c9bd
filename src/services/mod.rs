pub mod grading;
pub mod memory;
pub mod test_service;
