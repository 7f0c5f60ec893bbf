//! Command implementations.

pub mod run;
pub mod set_ttl;
pub mod status;
pub mod sweep;

pub use self::run::execute_run;
pub use self::set_ttl::execute_set_ttl;
pub use self::status::execute_status;
pub use self::sweep::execute_sweep;
