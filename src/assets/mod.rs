pub mod decode;
pub mod descriptor;
pub mod source;
pub mod store;
