//! 结果图像.

use knee_berry::error::BoneResult;
use knee_berry::segment::Segmentation;
use knee_berry::variants::Variant;
use knee_berry::viz::{self, Palette, MASK_COLOR};
use knee_berry::{BinaryMask, BoneLabel, CtScan};
use log::info;
use std::path::{Path, PathBuf};

/// 保存全部图像到 `dir`, 返回写入的路径.
///
/// 1. 分割标签叠加图;
/// 2. 全骨骼扩张掩码叠加图;
/// 3. 随机扩张标签叠加图;
/// 4. 每个非原始变体的掩码叠加图和掩码本身;
/// 5. 所有变体并排的掩码图.
pub fn save_all(
    dir: &Path,
    scan: &CtScan,
    seg: &Segmentation,
    bone_expanded: &BinaryMask,
    randomized: &BoneLabel,
    variants: &[Variant],
) -> BoneResult<Vec<PathBuf>> {
    let mut written = Vec::new();

    let path = dir.join("bone_segmented_overlay.png");
    viz::save_rgb(&viz::label_overlay(scan, &seg.label, &Palette::SEGMENTED)?, &path)?;
    written.push(path);

    let path = dir.join("bone_expanded_2mm_overlay.png");
    viz::save_rgb(&viz::mask_overlay(scan, bone_expanded, MASK_COLOR)?, &path)?;
    written.push(path);

    let path = dir.join("bone_segmented_randomized_overlay.png");
    viz::save_rgb(&viz::label_overlay(scan, randomized, &Palette::RANDOMIZED)?, &path)?;
    written.push(path);

    for v in variants.iter().skip(1) {
        let stem = format!("tibia_{}", v.name.to_lowercase());

        let path = dir.join(format!("{stem}_overlay.png"));
        viz::save_rgb(&viz::mask_overlay(scan, &v.mask, MASK_COLOR)?, &path)?;
        written.push(path);

        let path = dir.join(format!("{stem}.png"));
        viz::save_gray(&viz::mask_only(&v.mask), &path)?;
        written.push(path);
    }

    let masks: Vec<_> = variants.iter().map(|v| &v.mask).collect();
    let path = dir.join("tibia_variants.png");
    viz::save_gray(&viz::mask_strip(&masks)?, &path)?;
    written.push(path);

    info!("{} figures saved to `{}`", written.len(), dir.display());
    Ok(written)
}
