//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::slice::{ImgWriteVis, MaskSlice, ScanSlice};
pub use crate::data::window::CtWindow;
pub use crate::data::{BinaryMask, BoneLabel, CtScan, NiftiHeaderAttr, VoxelTransform};

pub use crate::consts::gray::{BACKGROUND, FEMUR, FOREGROUND, TIBIA};
pub use crate::consts::{BONE_HU_LOWER, BONE_HU_UPPER};

pub use crate::error::{BoneError, BoneResult};
pub use crate::morph_3d::BallRadius;

pub use crate::landmark::{Landmark, LandmarkPair, LandmarkTable};
pub use crate::segment::{segment_bones, Segmentation, SegmentParams, SliceSplit};
pub use crate::variants::{combine, combine_and_save, Variant, VariantSpec};
pub use crate::viz::Palette;
