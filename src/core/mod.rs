// Domain-layer modules and shared errors/models
pub mod enrichment {
    pub use crate::enrichment::*;
}

pub mod extractor {
    pub use crate::extractor::*;
}

pub mod fields {
    pub use crate::fields::*;
}

pub mod prompt {
    pub use crate::prompt::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
