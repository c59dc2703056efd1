mod booking;
mod notification;
mod slot;
mod status;

pub mod dtos {
    pub use crate::booking::dtos::*;
    pub use crate::notification::dtos::*;
    pub use crate::slot::dtos::*;
}

pub use crate::booking::api::*;
pub use crate::notification::api::*;
pub use crate::slot::api::*;
pub use crate::status::api::*;
