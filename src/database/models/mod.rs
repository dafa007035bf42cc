pub mod attendance;
pub mod employee;
pub mod leave;
pub(crate) mod macros;
pub mod page;
pub mod payroll;
pub mod salary;

// Re-export all models for easy importing
pub use attendance::*;
pub use employee::*;
pub use leave::*;
pub use page::*;
pub use payroll::*;
pub use salary::*;
