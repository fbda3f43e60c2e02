//! External provider integrations.

pub mod chat_transport {
    pub use crate::chat_transport::*;
}

pub mod providers {
    pub use crate::providers::*;
}
