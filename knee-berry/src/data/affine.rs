//! 体素索引到物理坐标的仿射变换.

use nifti::NiftiHeader;

/// 4x4 齐次仿射变换, 将体素索引 `(x, y, z)` (即 `(w, h, z)`) 映射到毫米坐标.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VoxelTransform {
    m: [[f64; 4]; 4],
}

impl VoxelTransform {
    /// 读取 header 中最可信的仿射: 优先 sform, 其次 qform, 否则仅按分辨率缩放.
    /// 结果为 nifti 约定的 RAS+ 坐标.
    pub fn from_header(header: &NiftiHeader) -> Self {
        let affine = header.affine::<f64>();
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = affine[(i, j)];
            }
        }
        Self { m }
    }

    /// RAS+ 转为 LPS+ (ITK 约定), 即翻转前两个物理轴.
    pub fn to_lps(&self) -> Self {
        let mut m = self.m;
        for row in m.iter_mut().take(2) {
            for v in row.iter_mut() {
                *v = -*v;
            }
        }
        Self { m }
    }

    /// 将体素索引 `[x, y, z]` 映射到物理坐标.
    #[inline]
    pub fn apply(&self, [x, y, z]: [usize; 3]) -> [f64; 3] {
        self.apply_f64([x as f64, y as f64, z as f64])
    }

    /// 将 (可为小数的) 体素坐标 `[x, y, z]` 映射到物理坐标.
    pub fn apply_f64(&self, p: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (o, row) in out.iter_mut().zip(self.m.iter()) {
            // `+ 0.0` 将 -0.0 归一为 0.0.
            *o = row[0] * p[0] + row[1] * p[1] + row[2] * p[2] + row[3] + 0.0;
        }
        out
    }
}
