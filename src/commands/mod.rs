pub mod inspect;
pub mod profiles;
pub mod render;
