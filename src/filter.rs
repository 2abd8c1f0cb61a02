//! 空气方块过滤 - 跳过没有实体内容的方块

use crate::config::FilterConfig;

/// 识别为空气的方块标识符（默认值，用于向后兼容）
pub const AIR_BLOCKS: &[&str] = &["minecraft:air", "minecraft:cave_air", "minecraft:void_air"];

/// 判断方块是否为空气（使用默认列表）
pub fn is_air(name: &str) -> bool {
    AIR_BLOCKS.contains(&name)
}

/// 判断方块是否为空气（使用配置）
pub fn is_air_with_config(name: &str, config: &FilterConfig) -> bool {
    config.air_blocks.iter().any(|b| b == name)
}
