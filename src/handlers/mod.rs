pub mod attendance;
pub mod leave;
pub mod payroll;
pub mod salary;
pub mod shared;
