pub mod infer;
pub mod inspect;
