pub mod check_config;
pub mod dispatch;
pub mod probe;
pub mod run;
