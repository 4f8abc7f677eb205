#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod engine;

pub use engine::Engine;

pub mod model {
    pub use quadflow_model::*;
}

pub mod common {
    pub use quadflow_common::*;
}

pub mod logical {
    pub use quadflow_logical::*;
}

pub mod functions {
    pub use quadflow_functions::*;
}

pub mod physical {
    pub use quadflow_physical::*;
}

pub mod storage {
    pub use quadflow_storage::*;
}

pub mod execution {
    pub use quadflow_engine::*;
}
