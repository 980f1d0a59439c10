pub mod compose;
pub mod detect;
pub mod pixel;
pub mod surface;
