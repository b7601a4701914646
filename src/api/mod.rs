// External interface of revcg: the JSON interchange format.

pub mod dto;

pub use dto::{CallDto, ChaDto, GraphDto, NodeDto, RevisionDto, TypeDto};
