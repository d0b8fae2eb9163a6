mod status;
mod subscription;

pub mod dtos {
    pub use crate::subscription::dtos::*;
}

pub use crate::status::api::*;
pub use crate::subscription::api::*;
