// Test modules for all components
pub mod test_logger;
pub mod test_smoothing;
