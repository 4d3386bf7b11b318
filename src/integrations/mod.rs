//! External service integrations.

pub mod turborater {
    pub use crate::turborater::*;
}
