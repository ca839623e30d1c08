pub mod capture_dispatcher;
pub mod capture_sink;
