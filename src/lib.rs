pub mod build_info;
pub mod cli;
pub mod comm;
pub mod compare;
pub mod config;
pub mod decomposition;
pub mod domain;
pub mod error;
pub mod gather;
pub mod grid_file;
pub mod halo;
pub mod image;
pub mod serial;
pub mod solver;
pub mod stencil;
