pub mod gesture;
pub mod session;
pub mod transform;
