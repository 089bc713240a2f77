use super::LandmarkPair;
use crate::error::BoneResult;
use crate::variants::Variant;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// 表头. 以 Tab 分隔.
const HEADER: [&str; 13] = [
    "Mask", "med_x", "med_y", "med_z", "med_mm_x", "med_mm_y", "med_mm_z", "lat_x", "lat_y",
    "lat_z", "lat_mm_x", "lat_mm_y", "lat_mm_z",
];

/// 多个掩码的标志点表, 按插入顺序输出.
#[derive(Debug, Clone, Default)]
pub struct LandmarkTable {
    rows: Vec<(String, LandmarkPair)>,
}

impl LandmarkTable {
    /// 空表.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 对每个变体提取标志点. 任一变体为空则返回 `Err(BoneError::EmptyMask)`.
    pub fn from_variants(variants: &[Variant]) -> BoneResult<Self> {
        let mut table = Self::new();
        for v in variants {
            table.push(v.name.clone(), v.mask.medial_lateral_lowest()?);
        }
        Ok(table)
    }

    /// 追加一行.
    #[inline]
    pub fn push(&mut self, name: impl Into<String>, pair: LandmarkPair) {
        self.rows.push((name.into(), pair));
    }

    /// 所有行.
    #[inline]
    pub fn rows(&self) -> &[(String, LandmarkPair)] {
        &self.rows
    }

    /// 行数.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否为空表?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 以 Tab 分隔格式写出: 体素索引为整数, 物理坐标保留两位小数.
    pub fn write_to<W: Write>(&self, mut w: W) -> io::Result<()> {
        writeln!(w, "{}", HEADER.join("\t"))?;
        for (name, pair) in &self.rows {
            write!(w, "{name}")?;
            for lm in [&pair.medial, &pair.lateral] {
                let [x, y, z] = lm.voxel;
                let [px, py, pz] = lm.physical;
                write!(w, "\t{x}\t{y}\t{z}\t{px:.2}\t{py:.2}\t{pz:.2}")?;
            }
            writeln!(w)?;
        }
        w.flush()
    }

    /// 写入 `path`. 父目录不存在时会被创建.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> BoneResult<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        self.write_to(BufWriter::new(File::create(path)?))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Landmark;
    use crate::variants::{generate_variants, VariantSpec};
    use crate::BinaryMask;
    use ndarray::Array3;

    fn pair() -> LandmarkPair {
        LandmarkPair {
            medial: Landmark {
                voxel: [7, 3, 40],
                physical: [-12.346, 6.0, 101.999],
            },
            lateral: Landmark {
                voxel: [2, 5, 40],
                physical: [-1.0, 6.5, 101.999],
            },
        }
    }

    #[test]
    fn test_write_to() {
        let mut table = LandmarkTable::new();
        table.push("Original", pair());
        let mut buf = Vec::new();
        table.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Mask\tmed_x\tmed_y\tmed_z\tmed_mm_x\tmed_mm_y\tmed_mm_z\
             \tlat_x\tlat_y\tlat_z\tlat_mm_x\tlat_mm_y\tlat_mm_z"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Original\t7\t3\t40\t-12.35\t6.00\t102.00\t2\t5\t40\t-1.00\t6.50\t102.00"
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_from_variants_and_save() {
        let mut data = Array3::<u8>::zeros((3, 6, 6));
        data[(2, 2, 2)] = 1;
        data[(2, 2, 3)] = 1;
        let mask = BinaryMask::fake(data, [1.0; 3]);
        let variants = generate_variants(&mask, &VariantSpec::tibia_defaults()).unwrap();
        let table = LandmarkTable::from_variants(&variants).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.rows()[0].0, "Original");
        assert_eq!(table.rows()[0].1.lateral.voxel, [2, 2, 2]);
        assert_eq!(table.rows()[0].1.medial.voxel, [3, 2, 2]);

        let path = std::env::temp_dir()
            .join(format!("knee-berry-table-{}", std::process::id()))
            .join("landmarks.txt");
        table.save(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 6);
        assert!(text.lines().nth(3).unwrap().starts_with("Expanded_4mm\t"));
        std::fs::remove_file(path).ok();
    }
}
