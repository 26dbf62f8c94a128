pub mod constraint;
pub mod parameter;
pub mod primitive;
