pub mod assignment;
pub mod dashboard;
pub mod fees;
pub mod transitions;
