mod channel;
mod important_date;
mod reminder;
mod status;

pub mod dtos {
    pub use crate::channel::dtos::*;
    pub use crate::reminder::dtos::*;
}

pub use crate::channel::api::*;
pub use crate::important_date::api::*;
pub use crate::reminder::api::*;
pub use crate::status::api::*;
