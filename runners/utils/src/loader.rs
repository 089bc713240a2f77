//! 输入/输出路径. 环境变量优先, 否则使用默认位置.
//!
//! 环境变量只能覆盖这两个路径, 未设置时使用写死的默认位置.
//! 扩张距离, 随机种子等算法参数不从环境变量读取.

use std::env;
use std::path::PathBuf;

/// 默认输入 CT 的文件名.
pub const DEFAULT_CT_FILE: &str = "3702_left_knee.nii.gz";

/// 图像输出子目录.
pub const FIGURE_DIR: &str = "figures";

/// 非空环境变量的值.
#[inline]
fn non_empty_var(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// 获取输入 CT 路径.
///
/// 1. 若环境变量 `$KNEE_CT_PATH` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/knee/3702_left_knee.nii.gz`;
/// 3. 无法确定 home 目录时, 返回当前目录下的 `3702_left_knee.nii.gz`.
pub fn ct_path_from_env_or_home() -> PathBuf {
    non_empty_var("KNEE_CT_PATH").unwrap_or_else(|| match dirs::home_dir() {
        Some(home) => home.join("dataset").join("knee").join(DEFAULT_CT_FILE),
        None => PathBuf::from(DEFAULT_CT_FILE),
    })
}

/// 获取结果输出目录.
///
/// 1. 若环境变量 `$KNEE_RESULT_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `results`.
pub fn result_dir_from_env() -> PathBuf {
    non_empty_var("KNEE_RESULT_DIR").unwrap_or_else(|| PathBuf::from("results"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_var_falls_back() {
        assert_eq!(non_empty_var("KNEE_LOADER_TEST_NEVER_SET"), None);
        if env::var_os("KNEE_RESULT_DIR").is_none() {
            assert_eq!(result_dir_from_env(), PathBuf::from("results"));
        }
        if env::var_os("KNEE_CT_PATH").is_none() {
            assert!(ct_path_from_env_or_home().ends_with(DEFAULT_CT_FILE));
        }
    }
}
