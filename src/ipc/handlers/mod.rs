pub mod calc;
pub mod classrooms;
pub mod core;
pub mod students;
