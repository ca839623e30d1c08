pub mod capture_session_use_case;
pub mod domain;
pub mod infrastructure;
pub mod session_logger;
