//! 掩码变体: 原始, 确定性扩张, 随机扩张.
//!
//! 变体集合由 [`VariantSpec`] 列表描述, 按列表顺序生成与保存.

use crate::error::BoneResult;
use crate::BinaryMask;
use log::info;
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

mod combine;
mod expand;
mod random;

pub use combine::{combine, combine_and_save};
pub use random::draw_radius;

/// 单个变体的生成方式.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VariantSpec {
    /// 原掩码.
    Original,

    /// 以 `mm` 毫米做确定性扩张.
    Expanded {
        /// 扩张距离, 毫米.
        mm: f64,
    },

    /// 以 `[0, max_mm)` 中的随机半径扩张.
    Random {
        /// 半径上限, 毫米.
        max_mm: f64,

        /// 随机种子.
        seed: u64,
    },
}

impl fmt::Display for VariantSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Original => write!(f, "Original"),
            Self::Expanded { mm } => write!(f, "Expanded_{mm}mm"),
            Self::Random { seed, .. } => write!(f, "Random_{seed}"),
        }
    }
}

impl VariantSpec {
    /// 胫骨的默认变体集合: 原始, 扩张 2 mm, 扩张 4 mm, 以及两个
    /// 上限 2 mm 的随机扩张 (种子 1, 2).
    pub fn tibia_defaults() -> Vec<VariantSpec> {
        vec![
            Self::Original,
            Self::Expanded { mm: 2.0 },
            Self::Expanded { mm: 4.0 },
            Self::Random {
                max_mm: 2.0,
                seed: 1,
            },
            Self::Random {
                max_mm: 2.0,
                seed: 2,
            },
        ]
    }

    /// 对 `mask` 应用该变体.
    pub fn apply(&self, mask: &BinaryMask) -> BoneResult<BinaryMask> {
        match *self {
            Self::Original => Ok(mask.clone()),
            Self::Expanded { mm } => mask.expand_mm(mm),
            Self::Random { max_mm, seed } => mask.randomize(max_mm, Some(seed)),
        }
    }
}

/// 已生成的变体.
#[derive(Debug, Clone)]
pub struct Variant {
    /// 显示名称, 如 `Expanded_2mm`.
    pub name: String,

    /// 变体掩码.
    pub mask: BinaryMask,
}

impl Variant {
    /// 保存时使用的文件名: `{prefix}_{小写名称}.nii.gz`.
    #[inline]
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{prefix}_{}.nii.gz", self.name.to_lowercase())
    }
}

/// 按 `specs` 的顺序生成 `mask` 的各个变体. 任一变体失败则整体失败.
pub fn generate_variants(mask: &BinaryMask, specs: &[VariantSpec]) -> BoneResult<Vec<Variant>> {
    specs
        .iter()
        .map(|spec| {
            let variant = Variant {
                name: spec.to_string(),
                mask: spec.apply(mask)?,
            };
            info!(
                "Variant `{}`: {} voxels",
                variant.name,
                variant.mask.foreground_len()
            );
            Ok(variant)
        })
        .collect()
}

/// 将 `variants` 依次保存到 `dir` 目录下, 返回所有写入的路径.
pub fn save_variants<P: AsRef<Path>>(
    dir: P,
    prefix: &str,
    variants: &[Variant],
) -> BoneResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut paths = Vec::with_capacity(variants.len());
    for variant in variants {
        let path = dir.join(variant.file_name(prefix));
        variant.mask.save(&path)?;
        info!("Saved `{}`", path.display());
        paths.push(path);
    }
    Ok(paths)
}
