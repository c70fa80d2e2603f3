pub mod length;
pub mod props;
