pub mod apply;
pub mod compare;
pub mod remap;
pub mod resolve;
