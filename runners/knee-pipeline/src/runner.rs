//! 程序运行函数.

use crate::figures;
use crate::result::PipelineResult;
use knee_berry::error::BoneResult;
use knee_berry::landmark::LandmarkTable;
use knee_berry::segment::{segment_bones, SegmentParams, Segmentation};
use knee_berry::variants::{combine_and_save, generate_variants, save_variants, VariantSpec};
use knee_berry::{BinaryMask, CtScan, NiftiHeaderAttr};
use log::info;
use std::path::Path;
use utils::loader;

/// 变体文件名前缀.
pub const TIBIA_PREFIX: &str = "mask_tibia";

/// 标志点表文件名.
pub const LANDMARK_FILE: &str = "tibial_landmarks.txt";

/// 随机扩张组合标签的文件名.
pub const RANDOMIZED_FILE: &str = "bone_segmented_randomized.nii.gz";

/// 全骨骼扩张掩码的文件名.
pub const BONE_EXPANDED_FILE: &str = "mask_bone_expanded_2mm.nii.gz";

/// 全骨骼扩张距离 (毫米).
pub const BONE_EXPAND_MM: f64 = 2.0;

/// 随机扩张组合标签: 半径上限 (毫米).
pub const RANDOM_MAX_MM: f64 = 2.0;

/// 随机扩张组合标签: 胫骨种子.
pub const TIBIA_SEED: u64 = 42;

/// 随机扩张组合标签: 股骨种子.
pub const FEMUR_SEED: u64 = 7;

/// 生成胫骨变体, 保存变体与标志点表.
fn variants_and_landmarks(
    tibia: &BinaryMask,
    result_dir: &Path,
    result: &mut PipelineResult,
) -> BoneResult<Vec<knee_berry::variants::Variant>> {
    let variants = generate_variants(tibia, &VariantSpec::tibia_defaults())?;
    result
        .written
        .extend(save_variants(result_dir, TIBIA_PREFIX, &variants)?);

    let table = LandmarkTable::from_variants(&variants)?;
    let path = result_dir.join(LANDMARK_FILE);
    table.save(&path)?;
    info!("{} landmark rows saved to `{}`", table.len(), path.display());
    result.written.push(path);
    result.landmarks = table;
    Ok(variants)
}

/// 完整流水线: 分割 -> 全骨骼扩张 -> 变体 -> 标志点 -> 随机扩张组合标签 -> 图像.
pub fn run_full_with(ct_path: &Path, result_dir: &Path) -> BoneResult<PipelineResult> {
    info!("Loading CT `{}`", ct_path.display());
    let scan = CtScan::open(ct_path)?;
    info!(
        "CT shape (z, h, w) = {:?}, spacing (z, h, w) = {:?} mm",
        scan.shape(),
        scan.pix_dim()
    );

    let seg = segment_bones(&scan, &SegmentParams::default())?;
    seg.save(result_dir)?;
    let mut result = PipelineResult {
        split_index: Some(seg.split_index),
        ..Default::default()
    };
    result.written.extend(
        [
            Segmentation::LABEL_FILE,
            Segmentation::TIBIA_FILE,
            Segmentation::FEMUR_FILE,
        ]
        .map(|f| result_dir.join(f)),
    );

    let bone = seg.label.bone().expand_mm(BONE_EXPAND_MM)?;
    let path = result_dir.join(BONE_EXPANDED_FILE);
    bone.save(&path)?;
    info!("Expanded bone mask saved to `{}`", path.display());
    result.written.push(path);

    let variants = variants_and_landmarks(&seg.tibia, result_dir, &mut result)?;

    let tibia = seg.tibia.randomize(RANDOM_MAX_MM, Some(TIBIA_SEED))?;
    let femur = seg.femur.randomize(RANDOM_MAX_MM, Some(FEMUR_SEED))?;
    let path = result_dir.join(RANDOMIZED_FILE);
    let randomized = combine_and_save(&scan, &tibia, &femur, &path)?;
    result.written.push(path);

    let figure_dir = result_dir.join(loader::FIGURE_DIR);
    result.written.extend(figures::save_all(
        &figure_dir,
        &scan,
        &seg,
        &bone,
        &randomized,
        &variants,
    )?);
    Ok(result)
}

/// 仅标志点: 读取已有的胫骨掩码, 生成变体并写出标志点表.
pub fn run_landmarks_with(result_dir: &Path) -> BoneResult<PipelineResult> {
    let path = result_dir.join(Segmentation::TIBIA_FILE);
    info!("Loading tibia mask `{}`", path.display());
    let tibia = BinaryMask::open(&path)?;
    let mut result = PipelineResult::default();
    variants_and_landmarks(&tibia, result_dir, &mut result)?;
    Ok(result)
}

/// 以环境变量配置运行完整流水线.
#[inline]
pub fn run_full() -> BoneResult<PipelineResult> {
    run_full_with(
        &loader::ct_path_from_env_or_home(),
        &loader::result_dir_from_env(),
    )
}

/// 以环境变量配置运行标志点流水线.
#[inline]
pub fn run_landmarks() -> BoneResult<PipelineResult> {
    run_landmarks_with(&loader::result_dir_from_env())
}
