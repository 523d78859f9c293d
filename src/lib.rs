// lib.rs
pub mod alignment_format;
pub mod breakpoint;
pub mod cigar;
pub mod commands;
pub mod config;
pub mod read;
pub mod sam;
pub mod segment;
pub mod trie;
