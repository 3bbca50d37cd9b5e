pub mod automation;
pub mod initdb;
pub mod seed;
pub mod serve;

pub use automation::run_automation;
pub use initdb::init_database;
pub use seed::seed_demo;
pub use serve::serve;
