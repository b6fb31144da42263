pub mod auth;
pub mod employees;
pub mod leave;
pub mod me;
pub mod payroll;
pub mod reports;
pub mod route;
