//! CT scan/mask 二维切片对象的操作.

mod core;
mod save;

pub use core::{MaskSlice, ScanSlice};

pub use save::ImgWriteVis;
