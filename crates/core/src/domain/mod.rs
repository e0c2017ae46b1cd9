pub mod import;
pub mod investment;
pub mod scenario;
