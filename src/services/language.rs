//! 解题语言到判题环境 id 的映射
//!
//! id 对应 Judge0 CE 的语言编号。未收录的语言直接拒绝运行。

use phf::phf_map;

static LANGUAGE_IDS: phf::Map<&'static str, u32> = phf_map! {
    "java" => 62,
    "python" => 71,
    "python3" => 71,
    "c" => 50,
    "c++" => 54,
    "cpp" => 54,
    "typescript" => 74,
    "ts" => 74,
    "kotlin" => 78,
    "c#" => 51,
    "csharp" => 51,
};

/// 查找语言对应的判题环境 id（大小写不敏感）
pub fn language_id(language: &str) -> Option<u32> {
    let key = language.trim().to_ascii_lowercase();
    LANGUAGE_IDS.get(key.as_str()).copied()
}
