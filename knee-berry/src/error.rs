//! 运行时错误.

use crate::Idx3d;
use std::fmt;
use std::io;

/// 分割、扩张、标志点提取与文件读写过程中的错误.
#[derive(Debug)]
pub enum BoneError {
    /// 掩码不含任何前景体素, 无法提取标志点.
    EmptyMask,

    /// 体素分辨率存在非正 (或非有限) 分量. 格式为 \[z, h, w\], 单位毫米.
    NonPositiveSpacing([f64; 3]),

    /// 扩张距离为负数或不是有限值.
    InvalidDistance(f64),

    /// CT HU 阈值区间非法. 依次为下限与上限.
    InvalidThreshold(f64, f64),

    /// 两个体数据形状不一致. 依次为期望形状与实际形状, 均为 (z, h, w).
    ShapeMismatch(Idx3d, Idx3d),

    /// 体数据形状与 header 描述不符.
    Shape(ndarray::ShapeError),

    /// nifti 读写错误 (包括文件不存在).
    Nifti(nifti::NiftiError),

    /// 图像编码或保存错误.
    Image(image::ImageError),

    /// 其他底层 I/O 错误.
    Io(io::Error),
}

impl fmt::Display for BoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyMask => write!(f, "mask is empty"),
            Self::NonPositiveSpacing([z, h, w]) => {
                write!(f, "non-positive voxel spacing (z: {z}, h: {h}, w: {w})")
            }
            Self::InvalidDistance(mm) => write!(f, "invalid expansion distance {mm} mm"),
            Self::InvalidThreshold(lo, hi) => write!(f, "invalid HU threshold [{lo}, {hi}]"),
            Self::ShapeMismatch(expected, found) => {
                write!(f, "shape mismatch: expected {expected:?}, found {found:?}")
            }
            Self::Shape(e) => write!(f, "volume shape error: {e}"),
            Self::Nifti(e) => write!(f, "nifti error: {e}"),
            Self::Image(e) => write!(f, "image error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for BoneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Shape(e) => Some(e),
            Self::Nifti(e) => Some(e),
            Self::Image(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<nifti::NiftiError> for BoneError {
    #[inline]
    fn from(e: nifti::NiftiError) -> Self {
        Self::Nifti(e)
    }
}

impl From<ndarray::ShapeError> for BoneError {
    #[inline]
    fn from(e: ndarray::ShapeError) -> Self {
        Self::Shape(e)
    }
}

impl From<image::ImageError> for BoneError {
    #[inline]
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

impl From<io::Error> for BoneError {
    #[inline]
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// 本 crate 的运行时结果.
pub type BoneResult<T> = Result<T, BoneError>;
