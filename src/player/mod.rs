pub mod scroll_sequence;
