#![warn(missing_docs)]
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供膝关节 CT 的骨骼分割、掩码变体生成与胫骨远端标志点提取.
//!
//! 所有体数据均按 `(z, h, w)` 访问, 即 (切片, 行, 列). 由 CT 派生的所有掩码都继承源 CT
//! 的分辨率与仿射信息, 因而可以直接与源 CT 叠加.
//!
//! # 注意
//!
//! 1. 该 crate 只处理带有清晰骨骼 HU 阈值的 CT, 不做任何基于学习的分割.
//! 2. 所有可由输入数据触发的失败都以 [`BoneError`] 返回; 越界访问等编程错误会直接 panic.
//!
//! # 模块
//!
//! ### 体数据与空间信息 ✅
//!
//! nifti 读写, 体素 -> 物理坐标变换, CT 窗口与二维切片视图.
//!
//! 实现位于 `knee-berry/src/data`.
//!
//! ### 三维形态学 & 精确欧氏距离变换 ✅
//!
//! 球形结构元的膨胀/腐蚀/闭运算, 以及可分离的精确距离变换.
//! 启用 `rayon` feature 后按轴并行.
//!
//! 实现位于 `knee-berry/src/data/morph_3d`.
//!
//! ### 阈值分割 ✅
//!
//! HU 阈值 -> 闭运算 -> 沿 z 轴切分为胫骨与股骨.
//!
//! 实现位于 `knee-berry/src/segment.rs`.
//!
//! ### 掩码变体 ✅
//!
//! 确定性扩张, 随机扩张 (可复现), 以及两个掩码的标签组合.
//!
//! 实现位于 `knee-berry/src/variants`.
//!
//! ### 标志点 ✅
//!
//! 最低切片上的内侧/外侧极值点, 及其制表输出.
//!
//! 实现位于 `knee-berry/src/landmark`.
//!
//! ### 可视化 ✅
//!
//! 冠状面叠加图.
//!
//! 实现位于 `knee-berry/src/viz`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 3D CT nii 文件基础数据结构.
mod data;

pub use data::{
    BinaryMask, BoneLabel, CtScan, CtWindow, ImgWriteVis, MaskSlice, NiftiHeaderAttr, ScanSlice,
    VoxelTransform,
};

pub use data::morph_3d;

pub mod consts;

pub mod error;

pub use error::{BoneError, BoneResult};

pub mod segment;

pub mod variants;

pub mod landmark;

pub mod viz;

pub mod prelude;
