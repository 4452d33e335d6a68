//! Business logic organized by bounded context. The only context in this
//! repository is `tools`.

pub mod tools;
