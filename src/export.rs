//! 导出原理图为 JSON 方块列表

use crate::config::Config;
use crate::filter::is_air_with_config;
use crate::litematic::read_litematic;
use crate::region::Region;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 一条导出记录：局部坐标、短标识符、残余状态属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub pos: (i32, i32, i32),
    pub id: String,
    #[serde(default)]
    pub props: String,
}

/// 导出原理图（使用默认配置）
pub fn export_schematic(
    schematic_path: &Path,
    output_path: &Path,
    region_name: Option<&str>,
) -> Result<usize> {
    export_schematic_with_config(schematic_path, output_path, region_name, &Config::default())
}

/// 导出原理图（使用配置）
pub fn export_schematic_with_config(
    schematic_path: &Path,
    output_path: &Path,
    region_name: Option<&str>,
    config: &Config,
) -> Result<usize> {
    let schematic = read_litematic(schematic_path)?;
    let region = schematic.region(region_name)?;

    println!(
        "区域 {}: 尺寸 {:?}, 体积 {}",
        region.name,
        region.size,
        region.volume()
    );

    let records = collect_region(region, config);
    write_records(output_path, &records, config.export.pretty)?;

    Ok(records.len())
}

/// 遍历区域的全部坐标，过滤空气并生成记录
pub fn collect_region(region: &Region, config: &Config) -> Vec<BlockRecord> {
    let mut records = Vec::new();
    if region.volume() == 0 {
        return records;
    }

    for x in region.min_x()..=region.max_x() {
        for y in region.min_y()..=region.max_y() {
            for z in region.min_z()..=region.max_z() {
                let Some(block) = region.get(x, y, z) else {
                    continue;
                };
                if config.export.skip_air && is_air_with_config(&block.name, &config.filter) {
                    continue;
                }

                let id = if config.export.strip_namespace {
                    block.short_name().to_string()
                } else {
                    block.name.clone()
                };

                records.push(BlockRecord {
                    pos: (x, y, z),
                    id,
                    props: block.properties_suffix(),
                });
            }
        }
    }

    records
}

/// 将记录写为单个 JSON 文档
pub fn write_records(path: &Path, records: &[BlockRecord], pretty: bool) -> Result<()> {
    let output = if pretty {
        serde_json::to_string_pretty(records)?
    } else {
        serde_json::to_string(records)?
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, output).with_context(|| format!("无法写入 {}", path.display()))?;
    Ok(())
}

/// 从 JSON 文档读回记录
pub fn read_records(path: &Path) -> Result<Vec<BlockRecord>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("无法读取 {}", path.display()))?;
    let records: Vec<BlockRecord> =
        serde_json::from_str(&content).with_context(|| format!("JSON 解析失败 {}", path.display()))?;
    Ok(records)
}
