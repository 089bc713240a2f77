//! 膝关节 CT 骨分割流水线.
//!
//! - [`runner::run_full`]: 分割, 胫骨变体, 标志点, 随机扩张组合标签与图像;
//! - [`runner::run_landmarks`]: 仅由已有胫骨掩码生成变体与标志点.
//!
//! 输入/输出路径见 [`utils::loader`].

pub mod figures;
pub mod result;
pub mod runner;
