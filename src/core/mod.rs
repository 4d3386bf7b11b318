// Domain-layer modules and shared errors/models
pub mod acord {
    pub use crate::acord::*;
}

pub mod dispatcher {
    pub use crate::dispatcher::*;
}

pub mod mapping {
    pub use crate::mapping::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
