//! 从 JSON 方块列表还原 .litematic

use crate::block::BlockState;
use crate::config::Config;
use crate::export::{read_records, BlockRecord};
use crate::litematic::{write_litematic, Schematic, SchematicMetadata};
use crate::region::Region;
use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// 还原原理图（使用默认配置）
pub fn restore_schematic(json_path: &Path, output_path: &Path) -> Result<usize> {
    restore_schematic_with_config(json_path, output_path, None, &Config::default())
}

/// 还原原理图（使用配置）
pub fn restore_schematic_with_config(
    json_path: &Path,
    output_path: &Path,
    region_name: Option<&str>,
    config: &Config,
) -> Result<usize> {
    let records = read_records(json_path)?;
    let count = records.len();

    let region_name = region_name.unwrap_or(config.restore.region_name.as_str());
    let region = build_region(region_name, &records, config)?;

    let name = output_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unnamed")
        .to_string();

    let now = now_millis();
    let mut regions = BTreeMap::new();
    regions.insert(region_name.to_string(), region);

    let schematic = Schematic {
        version: config.restore.version,
        sub_version: Some(config.restore.sub_version),
        data_version: config.restore.data_version,
        metadata: SchematicMetadata {
            name: Some(name),
            author: Some(config.restore.author.clone()),
            description: Some(String::new()),
            time_created: Some(now),
            time_modified: Some(now),
        },
        regions,
    };

    write_litematic(output_path, &schematic)?;
    Ok(count)
}

/// 由记录重建区域
///
/// 记录坐标是区域局部坐标，每个轴保持原样还原：
/// 坐标全部非负时区域尺寸为正，全部非正时为负，未覆盖的单元格为空气
pub fn build_region(name: &str, records: &[BlockRecord], config: &Config) -> Result<Region> {
    // 没有记录时生成 1x1x1 的纯空气区域
    if records.is_empty() {
        return Ok(Region::new(name, (0, 0, 0), (1, 1, 1)));
    }

    let mut min = records[0].pos;
    let mut max = records[0].pos;
    for record in records {
        let (x, y, z) = record.pos;
        min = (min.0.min(x), min.1.min(y), min.2.min(z));
        max = (max.0.max(x), max.1.max(y), max.2.max(z));
    }

    let size = (
        axis_size(min.0, max.0)?,
        axis_size(min.1, max.1)?,
        axis_size(min.2, max.2)?,
    );

    let mut region = Region::new(name, (0, 0, 0), size);
    for record in records {
        let block = BlockState::from_record(&record.id, &record.props, &config.restore.namespace)?;
        let (x, y, z) = record.pos;
        region.set_block(x, y, z, &block)?;
    }

    Ok(region)
}

/// 由单轴坐标范围推算区域尺寸，局部坐标范围始终包含 0
fn axis_size(min: i32, max: i32) -> Result<i32> {
    if min >= 0 {
        Ok(max + 1)
    } else if max <= 0 {
        Ok(min - 1)
    } else {
        bail!("坐标 {}..{} 同时覆盖正负两侧, 无法还原为单个区域", min, max)
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
