pub mod compositor;
pub mod flatten;
pub mod indicator;
