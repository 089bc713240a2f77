use std::fs;
use std::ops::Index;
use std::path::Path;

use ndarray::{Array3, ArrayView, Axis, Ix3, Zip};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::consts::gray::*;
use crate::error::{BoneError, BoneResult};
use crate::Idx3d;

pub mod affine;
pub mod morph_3d;
pub mod slice;
pub mod window;

pub use affine::VoxelTransform;
pub use slice::{ImgWriteVis, MaskSlice, ScanSlice};
pub use window::CtWindow;

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z.max(1) as usize, h as usize, w as usize)
}

/// 将 header 的体素个数数组同步为 (z, H, W) 形状 `shape`.
fn set_shape_to_header(header: &mut NiftiHeader, (z, h, w): Idx3d) {
    header.dim[0] = 3;
    header.dim[1] = w as _;
    header.dim[2] = h as _;
    header.dim[3] = z as _;
    for d in header.dim[4..].iter_mut() {
        *d = 1;
    }
}

/// 构造一个各轴分辨率为 `pix_dim` (\[z, h, w\], 单位毫米), 原点为 0
/// 且无旋转的 header.
fn fake_header(shape: Idx3d, [pz, ph, pw]: [f32; 3]) -> BoxedHeader {
    let mut header = Box::<NiftiHeader>::default();
    set_shape_to_header(&mut header, shape);
    header.pixdim[1] = pw;
    header.pixdim[2] = ph;
    header.pixdim[3] = pz;
    header.sform_code = 1;
    header.srow_x = [pw, 0.0, 0.0, 0.0];
    header.srow_y = [0.0, ph, 0.0, 0.0];
    header.srow_z = [0.0, 0.0, pz, 0.0];
    header
}

/// 读取 nii 文件, 获得 header 和按 (z, H, W) 组织的体数据.
macro_rules! read_volume {
    ($path: expr, $elem: ty) => {{
        let obj = ReaderOptions::new().read_file($path)?;
        let header = Box::new(obj.header().clone());

        // nifti 体数据按列优先 [W, H, z] 存储, 其内存布局恰好是行优先的 [z, H, W].
        // hint: 原第一维向下增长, 原第二维向右增长.
        let raw = obj.into_volume().into_ndarray::<$elem>()?.into_raw_vec();
        let data = Array3::<$elem>::from_shape_vec(get_shape_from_header(&header), raw)?;
        (header, data)
    }};
}

/// 以 `header` 的空间信息将按 (z, H, W) 组织的 `data` 写入 `path`.
/// 若 `path` 以 `.gz` 结尾则压缩存储. 父目录不存在时会被创建.
///
/// 强度缩放 (`scl_*`) 由 nifti 写入器重置; 这里只清除显示范围 `cal_*`.
macro_rules! write_volume {
    ($path: expr, $header: expr, $data: expr) => {{
        let path: &Path = $path;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let mut header: NiftiHeader = (*$header).clone();
        header.cal_min = 0.0;
        header.cal_max = 0.0;

        // [z, H, W] -> [W, H, z]
        let data = $data.view().permuted_axes([2, 1, 0]);
        WriterOptions::new(path)
            .reference_header(&header)
            .write_nifti(&data)?;
        Ok(())
    }};
}

/// 3D CT nii 文件 header 的共用属性和部分通用操作.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状大小.
    #[inline]
    fn shape(&self) -> Idx3d {
        get_shape_from_header(self.header())
    }

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取单个体素分辨率. 该分辨率以毫米为单位, 分别代表空间 (相邻切片方向),
    /// 高 (自然图像的垂直方向), 宽 (自然图像的水平方向).
    #[inline]
    fn pix_dim(&self) -> [f64; 3] {
        let [_, w, h, z, ..] = self.header().pixdim;
        [z as f64, h as f64, w as f64]
    }

    /// 同 [`Self::pix_dim`], 但要求三个分量都是正的有限值,
    /// 否则返回 `Err(BoneError::NonPositiveSpacing)`.
    fn checked_spacing(&self) -> BoneResult<[f64; 3]> {
        let spacing = self.pix_dim();
        if spacing.iter().all(|s| s.is_finite() && *s > 0.0) {
            Ok(spacing)
        } else {
            Err(BoneError::NonPositiveSpacing(spacing))
        }
    }

    /// nifti 文件自身描述的体素 -> 物理坐标 (RAS+) 仿射变换.
    #[inline]
    fn ras_transform(&self) -> VoxelTransform {
        VoxelTransform::from_header(self.header())
    }

    /// 体素 -> 物理坐标 (LPS+, 即 ITK 约定) 仿射变换.
    #[inline]
    fn lps_transform(&self) -> VoxelTransform {
        self.ras_transform().to_lps()
    }

    /// 两个体数据的形状是否一致? 若不一致则返回 `Err(BoneError::ShapeMismatch)`.
    fn ensure_same_shape<T: NiftiHeaderAttr>(&self, other: &T) -> BoneResult<()> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(BoneError::ShapeMismatch(self.shape(), other.shape()))
        }
    }
}

/// nii 格式 3D CT 扫描, 包括 header 和 CT 扫描 (HU). HU 值以 `f32` 保存.
#[derive(Debug, Clone)]
pub struct CtScan {
    header: BoxedHeader,
    data: Array3<f32>,
}

impl NiftiHeaderAttr for CtScan {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl Index<Idx3d> for CtScan {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl CtScan {
    /// 打开 nii 文件格式的 3D CT 扫描. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> BoneResult<Self> {
        let (header, data) = read_volume!(path.as_ref(), f32);
        Ok(Self { header, data })
    }

    /// 根据 header 和按 (z, H, W) 组织的 HU 数据直接创建 `CtScan`.
    /// header 中的形状信息会被同步为 `data` 的形状.
    pub fn from_parts(header: &NiftiHeader, data: Array3<f32>) -> Self {
        let mut header = Box::new(header.clone());
        set_shape_to_header(&mut header, data.dim());
        Self { header, data }
    }

    /// 根据 (z, H, W) 组织的 HU 数据和 \[z, h, w\] 分辨率创建实验用 `CtScan`.
    pub fn fake(data: Array3<f32>, pix_dim: [f32; 3]) -> Self {
        let header = fake_header(data.dim(), pix_dim);
        Self { header, data }
    }

    /// 将 HU 数据以 nifti 格式 (`f32`) 保存到 `path`, 空间信息与原 header 一致.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> BoneResult<()> {
        write_volume!(path.as_ref(), self.header, self.data)
    }

    /// 获取 3D 扫描第 `h_index` 行的冠状面视图, 形状为 (z, W).
    ///
    /// 当 `h_index` 越界时 panic.
    #[inline]
    pub fn coronal_at(&self, h_index: usize) -> ScanSlice<'_> {
        ScanSlice::new(self.data.index_axis(Axis(1), h_index))
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }
}

/// nii 格式 3D 二值掩码, 包括 header 和掩码数据. 体素值只有 0 和 1.
#[derive(Debug, Clone)]
pub struct BinaryMask {
    header: BoxedHeader,
    data: Array3<u8>,
}

/// nii 格式 3D 骨骼标签, 包括 header 和标签数据. 体素值只有
/// `BACKGROUND`, `TIBIA` 和 `FEMUR` 三种.
#[derive(Debug, Clone)]
pub struct BoneLabel {
    header: BoxedHeader,
    data: Array3<u8>,
}

/// `u8` 体数据的共用方法集合.
macro_rules! impl_u8_volume {
    ($($volume: ty),+) => {
        $(
            impl NiftiHeaderAttr for $volume {
                #[inline]
                fn header(&self) -> &NiftiHeader {
                    &self.header
                }
            }

            impl Index<Idx3d> for $volume {
                type Output = u8;

                #[inline]
                fn index(&self, index: Idx3d) -> &Self::Output {
                    &self.data[index]
                }
            }

            impl $volume {
                /// 将数据以 nifti 格式保存到 `path`, 空间信息与原 header 一致.
                /// 父目录不存在时会被创建.
                #[inline]
                pub fn save<P: AsRef<Path>>(&self, path: P) -> BoneResult<()> {
                    write_volume!(path.as_ref(), self.header, self.data)
                }

                /// 获取 z 空间的第 `z_index` 层不可变切片.
                ///
                /// 当 `z_index` 越界时 panic.
                #[inline]
                pub fn axial_at(&self, z_index: usize) -> MaskSlice<'_> {
                    MaskSlice::new(self.data.index_axis(Axis(0), z_index))
                }

                /// 获取第 `h_index` 行的冠状面视图, 形状为 (z, W).
                ///
                /// 当 `h_index` 越界时 panic.
                #[inline]
                pub fn coronal_at(&self, h_index: usize) -> MaskSlice<'_> {
                    MaskSlice::new(self.data.index_axis(Axis(1), h_index))
                }

                /// 获得数据的一份不可变 shallow copy.
                #[inline]
                pub fn data(&self) -> ArrayView<'_, u8, Ix3> {
                    self.data.view()
                }

                /// 获取值为 `value` 的体素个数.
                #[inline]
                pub fn count(&self, value: u8) -> usize {
                    self.data.iter().filter(|p| **p == value).count()
                }

                /// 是否不含任何前景体素?
                #[inline]
                pub fn is_empty(&self) -> bool {
                    self.data.iter().copied().all(is_background)
                }
            }
        )+
    };
}

impl_u8_volume!(BinaryMask, BoneLabel);

impl BinaryMask {
    /// 打开 nii 文件格式的 3D 掩码. 所有非零体素都被视为前景 (值为 1).
    pub fn open<P: AsRef<Path>>(path: P) -> BoneResult<Self> {
        let (header, mut data) = read_volume!(path.as_ref(), u8);
        data.mapv_inplace(|p| u8::from(is_foreground(p)));
        Ok(Self { header, data })
    }

    /// 根据 header 和按 (z, H, W) 组织的数据直接创建掩码.
    /// 所有非零体素都被视为前景. header 中的形状信息会被同步为 `data` 的形状.
    pub fn from_parts(header: &NiftiHeader, mut data: Array3<u8>) -> Self {
        let mut header = Box::new(header.clone());
        set_shape_to_header(&mut header, data.dim());
        data.mapv_inplace(|p| u8::from(is_foreground(p)));
        Self { header, data }
    }

    /// 根据按 (z, H, W) 组织的数据和 \[z, h, w\] 分辨率 (毫米) 创建实验用掩码.
    ///
    /// 生成的 header 原点为 0 且无旋转, 即体素 `(x, y, z)` 的物理坐标 (RAS) 为
    /// `(x * w_mm, y * h_mm, z * z_mm)`.
    pub fn fake(mut data: Array3<u8>, pix_dim: [f32; 3]) -> Self {
        let header = fake_header(data.dim(), pix_dim);
        data.mapv_inplace(|p| u8::from(is_foreground(p)));
        Self { header, data }
    }

    /// 以相同的 header 包装新数据. `data` 形状必须与 `self` 一致.
    #[inline]
    pub(crate) fn with_data(&self, data: Array3<u8>) -> Self {
        debug_assert_eq!(data.dim(), self.data.dim());
        Self {
            header: self.header.clone(),
            data,
        }
    }

    /// 前景体素个数.
    #[inline]
    pub fn foreground_len(&self) -> usize {
        self.count(FOREGROUND)
    }

    /// `self` 的前景是否包含 `other` 的全部前景? 形状不一致时返回 `false`.
    pub fn contains(&self, other: &BinaryMask) -> bool {
        self.data.dim() == other.data.dim()
            && Zip::from(&self.data)
                .and(&other.data)
                .all(|&a, &b| is_foreground(a) || is_background(b))
    }
}

impl BoneLabel {
    /// 打开 nii 文件格式的 3D 骨骼标签.
    pub fn open<P: AsRef<Path>>(path: P) -> BoneResult<Self> {
        let (header, data) = read_volume!(path.as_ref(), u8);
        Ok(Self { header, data })
    }

    /// 以 `header` 的空间信息组合两个掩码: `tibia` 的前景记为 `TIBIA`,
    /// `femur` 的前景记为 `FEMUR`. 两者重叠处后写者 (`FEMUR`) 胜出.
    ///
    /// 三者形状不一致时返回 `Err(BoneError::ShapeMismatch)`.
    pub fn compose(
        header: &NiftiHeader,
        tibia: &BinaryMask,
        femur: &BinaryMask,
    ) -> BoneResult<Self> {
        let shape = get_shape_from_header(header);
        for mask in [tibia, femur] {
            if mask.data.dim() != shape {
                return Err(BoneError::ShapeMismatch(shape, mask.data.dim()));
            }
        }
        let mut data = Array3::<u8>::zeros(shape);
        Zip::from(&mut data)
            .and(&tibia.data)
            .and(&femur.data)
            .for_each(|l, &t, &f| {
                if is_foreground(t) {
                    *l = TIBIA;
                }
                if is_foreground(f) {
                    *l = FEMUR;
                }
            });
        let mut header = Box::new(header.clone());
        set_shape_to_header(&mut header, shape);
        Ok(Self { header, data })
    }

    /// 提取值为 `value` 的体素, 构成二值掩码.
    pub fn mask_of(&self, value: u8) -> BinaryMask {
        BinaryMask {
            header: self.header.clone(),
            data: self.data.mapv(|p| u8::from(p == value)),
        }
    }

    /// 全部骨骼 (胫骨与股骨的并集) 掩码.
    pub fn bone(&self) -> BinaryMask {
        BinaryMask {
            header: self.header.clone(),
            data: self.data.mapv(|p| u8::from(is_foreground(p))),
        }
    }

    /// 胫骨掩码.
    #[inline]
    pub fn tibia(&self) -> BinaryMask {
        self.mask_of(TIBIA)
    }

    /// 股骨掩码.
    #[inline]
    pub fn femur(&self) -> BinaryMask {
        self.mask_of(FEMUR)
    }

    /// 依次拆分出胫骨和股骨掩码.
    #[inline]
    pub fn split(&self) -> (BinaryMask, BinaryMask) {
        (self.tibia(), self.femur())
    }

    /// 获取骨骼标签的基本统计信息.
    ///
    /// 统计信息格式为: \[背景体素数, 胫骨体素数, 股骨体素数\].
    /// 该操作不会统计任何其他体素信息.
    pub fn numeric_statistics(&self) -> [usize; 3] {
        let mut ans = [0; 3];
        for pixel in self.data.iter().filter(|p| **p <= FEMUR) {
            ans[*pixel as usize] += 1;
        }
        ans
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::s;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("knee-berry-{}", std::process::id()))
            .join(name)
    }

    fn cube_mask() -> BinaryMask {
        let mut data = Array3::<u8>::zeros((4, 5, 6));
        data.slice_mut(s![1..3, 1..4, 2..5]).fill(1);
        BinaryMask::fake(data, [2.5, 0.5, 0.75])
    }

    #[test]
    fn test_fake_header_shape_and_spacing() {
        let mask = cube_mask();
        assert_eq!(mask.shape(), (4, 5, 6));
        assert_eq!(mask.pix_dim(), [2.5, 0.5, 0.75]);
        assert_eq!(mask.foreground_len(), 2 * 3 * 3);
        assert!(mask.checked_spacing().is_ok());
    }

    #[test]
    fn test_from_parts_binarizes() {
        let mut data = Array3::<u8>::zeros((2, 2, 2));
        data[(0, 0, 0)] = 7;
        data[(1, 1, 1)] = 1;
        let mask = BinaryMask::from_parts(&NiftiHeader::default(), data);
        assert_eq!(mask[(0, 0, 0)], 1);
        assert_eq!(mask.foreground_len(), 2);
        assert_eq!(mask.shape(), (2, 2, 2));
    }

    #[test]
    fn test_non_positive_spacing_is_rejected() {
        let mask = BinaryMask::fake(Array3::zeros((2, 2, 2)), [1.0, 0.0, 1.0]);
        assert!(matches!(
            mask.checked_spacing(),
            Err(BoneError::NonPositiveSpacing(_))
        ));
    }

    #[test]
    fn test_compose_later_label_wins() {
        let mut t = Array3::<u8>::zeros((1, 1, 3));
        let mut f = Array3::<u8>::zeros((1, 1, 3));
        t.slice_mut(s![0, 0, 0..2]).fill(1);
        f.slice_mut(s![0, 0, 1..3]).fill(1);
        let tibia = BinaryMask::fake(t, [1.0; 3]);
        let femur = BinaryMask::fake(f, [1.0; 3]);
        let label = BoneLabel::compose(tibia.header(), &tibia, &femur).unwrap();
        assert_eq!(label.data().as_slice().unwrap(), &[TIBIA, FEMUR, FEMUR]);
        assert_eq!(label.numeric_statistics(), [0, 1, 2]);

        let (t2, f2) = label.split();
        assert_eq!(t2.foreground_len(), 1);
        assert_eq!(f2.foreground_len(), 2);
        assert_eq!(label.bone().data().as_slice().unwrap(), &[1, 1, 1]);
    }

    #[test]
    fn test_compose_shape_mismatch() {
        let a = BinaryMask::fake(Array3::zeros((1, 2, 3)), [1.0; 3]);
        let b = BinaryMask::fake(Array3::zeros((1, 3, 2)), [1.0; 3]);
        assert!(matches!(
            BoneLabel::compose(a.header(), &a, &b),
            Err(BoneError::ShapeMismatch((1, 2, 3), (1, 3, 2)))
        ));
    }

    #[test]
    fn test_mask_round_trip() {
        let mask = cube_mask();
        let path = temp_path("round_trip_mask.nii.gz");
        mask.save(&path).unwrap();

        let back = BinaryMask::open(&path).unwrap();
        assert_eq!(back.shape(), mask.shape());
        assert_eq!(back.data(), mask.data());
        assert_eq!(back.pix_dim(), mask.pix_dim());
        assert_eq!(back.header().sform_code, mask.header().sform_code);
        assert_eq!(back.header().srow_x, mask.header().srow_x);
        assert_eq!(back.header().srow_y, mask.header().srow_y);
        assert_eq!(back.header().srow_z, mask.header().srow_z);
        assert_eq!(back.ras_transform(), mask.ras_transform());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_label_round_trip() {
        let tibia = cube_mask();
        let femur = BinaryMask::fake(Array3::zeros((4, 5, 6)), [2.5, 0.5, 0.75]);
        let label = BoneLabel::compose(tibia.header(), &tibia, &femur).unwrap();
        let path = temp_path("round_trip_label.nii");
        label.save(&path).unwrap();

        let back = BoneLabel::open(&path).unwrap();
        assert_eq!(back.data(), label.data());
        assert_eq!(back.numeric_statistics(), label.numeric_statistics());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_scan_round_trip() {
        let data = Array3::from_shape_fn((3, 4, 5), |(z, h, w)| (z * 100 + h * 10 + w) as f32 - 50.5);
        let scan = CtScan::fake(data, [3.0, 0.8, 0.8]);
        let path = temp_path("round_trip_scan.nii.gz");
        scan.save(&path).unwrap();

        let back = CtScan::open(&path).unwrap();
        assert_eq!(back.data(), scan.data());
        assert_eq!(back[(2, 3, 4)], 183.5);
        assert_eq!(back.pix_dim(), scan.pix_dim());
        assert_eq!(back.coronal_at(1).shape(), (3, 5));
        assert_eq!(back.header().scl_slope, 1.0);
        assert_eq!(back.header().scl_inter, 0.0);
        assert_eq!(back.header().cal_max, 0.0);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_open_missing_file() {
        let r = BinaryMask::open(temp_path("does_not_exist.nii.gz"));
        assert!(matches!(r, Err(BoneError::Nifti(_))));
    }
}
