//! Litematic 文件解析与写入

use crate::block::BlockState;
use crate::region::{pack_block_states, unpack_block_states, Region};
use anyhow::{bail, Context, Result};
use fastnbt::{LongArray, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

/// 原理图元数据，缺失的字段在写回时补默认值
#[derive(Debug, Clone, Default)]
pub struct SchematicMetadata {
    pub name: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub time_created: Option<i64>,
    pub time_modified: Option<i64>,
}

/// 一个已加载的 litematic 原理图
#[derive(Debug, Clone)]
pub struct Schematic {
    pub version: i32,
    pub sub_version: Option<i32>,
    pub data_version: i32,
    pub metadata: SchematicMetadata,
    pub regions: BTreeMap<String, Region>,
}

impl Schematic {
    /// 按名称选择区域；未指定名称时要求原理图只有一个区域
    pub fn region(&self, name: Option<&str>) -> Result<&Region> {
        match name {
            Some(n) => self.regions.get(n).with_context(|| {
                format!("区域 {} 不存在, 可用区域: {}", n, self.region_names().join(", "))
            }),
            None => {
                if self.regions.len() == 1 {
                    self.regions.values().next().context("原理图没有区域")
                } else {
                    bail!(
                        "原理图包含 {} 个区域, 请用 --region 指定: {}",
                        self.regions.len(),
                        self.region_names().join(", ")
                    )
                }
            }
        }
    }

    pub fn region_names(&self) -> Vec<String> {
        self.regions.keys().cloned().collect()
    }

    /// 所有区域在原理图坐标系中的外接尺寸
    pub fn enclosing_size(&self) -> (i32, i32, i32) {
        let mut bounds: Option<((i32, i32, i32), (i32, i32, i32))> = None;
        for region in self.regions.values() {
            let (min, max) = region.schematic_bounds();
            bounds = Some(match bounds {
                None => (min, max),
                Some((bmin, bmax)) => (
                    (bmin.0.min(min.0), bmin.1.min(min.1), bmin.2.min(min.2)),
                    (bmax.0.max(max.0), bmax.1.max(max.1), bmax.2.max(max.2)),
                ),
            });
        }
        match bounds {
            Some((min, max)) => (max.0 - min.0 + 1, max.1 - min.1 + 1, max.2 - min.2 + 1),
            None => (0, 0, 0),
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.regions.values().map(|r| r.count_blocks()).sum()
    }

    pub fn total_volume(&self) -> usize {
        self.regions.values().map(|r| r.volume()).sum()
    }
}

/// 读取并解析 .litematic 文件
pub fn read_litematic(path: &Path) -> Result<Schematic> {
    let file = File::open(path).with_context(|| format!("无法打开 {}", path.display()))?;
    let mut decoder = flate2::read::GzDecoder::new(file);
    let mut data = Vec::new();
    decoder
        .read_to_end(&mut data)
        .with_context(|| format!("解压失败 {}", path.display()))?;

    let value: Value = fastnbt::from_bytes(&data)
        .with_context(|| format!("NBT 解析失败 {}", path.display()))?;
    schematic_from_nbt(&value)
}

/// 将原理图写入 .litematic 文件
pub fn write_litematic(path: &Path, schematic: &Schematic) -> Result<()> {
    let data = to_litematic_bytes(schematic)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, data).with_context(|| format!("无法写入 {}", path.display()))?;
    Ok(())
}

/// 序列化为 gzip 压缩的 litematic 字节
pub fn to_litematic_bytes(schematic: &Schematic) -> Result<Vec<u8>> {
    let nbt = schematic_to_nbt(schematic);
    let nbt_data = fastnbt::to_bytes(&nbt)?;

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&nbt_data)?;
    Ok(encoder.finish()?)
}

/// 读取 .litematic 文件的原始 NBT（dump 用，不做结构解码）
pub fn read_litematic_nbt(path: &Path) -> Result<Value> {
    let file = File::open(path).with_context(|| format!("无法打开 {}", path.display()))?;
    let mut decoder = flate2::read::GzDecoder::new(file);
    let mut data = Vec::new();
    decoder
        .read_to_end(&mut data)
        .with_context(|| format!("解压失败 {}", path.display()))?;
    Ok(fastnbt::from_bytes(&data)?)
}

// ============== NBT 转换 ==============

pub fn schematic_from_nbt(value: &Value) -> Result<Schematic> {
    let Value::Compound(root) = value else {
        bail!("根标签不是复合标签");
    };

    let version = int(root, "Version")?;
    let sub_version = int_opt(root, "SubVersion");
    let data_version = int(root, "MinecraftDataVersion")?;

    let metadata = match root.get("Metadata") {
        Some(Value::Compound(meta)) => SchematicMetadata {
            name: string_opt(meta, "Name"),
            author: string_opt(meta, "Author"),
            description: string_opt(meta, "Description"),
            time_created: long_opt(meta, "TimeCreated"),
            time_modified: long_opt(meta, "TimeModified"),
        },
        _ => SchematicMetadata::default(),
    };

    let Some(Value::Compound(regions_nbt)) = root.get("Regions") else {
        bail!("缺少 Regions 复合标签");
    };

    let mut regions = BTreeMap::new();
    for (name, region_value) in regions_nbt {
        let Value::Compound(region_map) = region_value else {
            bail!("区域 {} 不是复合标签", name);
        };
        let region = region_from_nbt(name, region_map)
            .with_context(|| format!("解析区域 {} 失败", name))?;
        regions.insert(name.clone(), region);
    }

    Ok(Schematic {
        version,
        sub_version,
        data_version,
        metadata,
        regions,
    })
}

pub fn schematic_to_nbt(schematic: &Schematic) -> Value {
    let mut root = HashMap::new();

    root.insert("Version".to_string(), Value::Int(schematic.version));
    if let Some(sub) = schematic.sub_version {
        root.insert("SubVersion".to_string(), Value::Int(sub));
    }
    root.insert(
        "MinecraftDataVersion".to_string(),
        Value::Int(schematic.data_version),
    );

    let mut meta = HashMap::new();
    let md = &schematic.metadata;
    meta.insert(
        "Name".to_string(),
        Value::String(md.name.clone().unwrap_or_else(|| "Unnamed".to_string())),
    );
    meta.insert(
        "Author".to_string(),
        Value::String(md.author.clone().unwrap_or_default()),
    );
    meta.insert(
        "Description".to_string(),
        Value::String(md.description.clone().unwrap_or_default()),
    );
    meta.insert(
        "TimeCreated".to_string(),
        Value::Long(md.time_created.unwrap_or(0)),
    );
    meta.insert(
        "TimeModified".to_string(),
        Value::Long(md.time_modified.unwrap_or(0)),
    );
    meta.insert(
        "RegionCount".to_string(),
        Value::Int(schematic.regions.len() as i32),
    );
    meta.insert(
        "TotalBlocks".to_string(),
        Value::Int(schematic.total_blocks() as i32),
    );
    meta.insert(
        "TotalVolume".to_string(),
        Value::Int(schematic.total_volume() as i32),
    );
    let (ex, ey, ez) = schematic.enclosing_size();
    meta.insert("EnclosingSize".to_string(), xyz_to_nbt(ex, ey, ez));
    root.insert("Metadata".to_string(), Value::Compound(meta));

    let regions: HashMap<String, Value> = schematic
        .regions
        .iter()
        .map(|(name, region)| (name.clone(), region_to_nbt(region)))
        .collect();
    root.insert("Regions".to_string(), Value::Compound(regions));

    Value::Compound(root)
}

fn region_from_nbt(name: &str, map: &HashMap<String, Value>) -> Result<Region> {
    let position = xyz(map, "Position")?;
    let size = xyz(map, "Size")?;

    let Some(Value::List(palette_nbt)) = map.get("BlockStatePalette") else {
        bail!("缺少 BlockStatePalette 列表");
    };
    let palette: Vec<BlockState> = palette_nbt
        .iter()
        .map(BlockState::from_nbt)
        .collect::<Result<_>>()?;

    let volume = size.0.unsigned_abs() as usize
        * size.1.unsigned_abs() as usize
        * size.2.unsigned_abs() as usize;

    let packed: Vec<i64> = match map.get("BlockStates") {
        Some(Value::LongArray(arr)) => arr.iter().copied().collect(),
        _ => bail!("缺少 BlockStates 长整型数组"),
    };
    let blocks = unpack_block_states(&packed, palette.len(), volume)?;

    // 结构字段之外的内容（实体、方块实体、计划刻）原样保留
    let extra: HashMap<String, Value> = map
        .iter()
        .filter(|(k, _)| {
            !matches!(
                k.as_str(),
                "Position" | "Size" | "BlockStatePalette" | "BlockStates"
            )
        })
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Region::from_parts(name, position, size, palette, blocks, extra)
}

fn region_to_nbt(region: &Region) -> Value {
    let mut map = region.extra.clone();

    map.insert(
        "Position".to_string(),
        xyz_to_nbt(region.position.0, region.position.1, region.position.2),
    );
    map.insert(
        "Size".to_string(),
        xyz_to_nbt(region.size.0, region.size.1, region.size.2),
    );

    let palette: Vec<Value> = region.palette.iter().map(|b| b.to_nbt()).collect();
    map.insert("BlockStatePalette".to_string(), Value::List(palette));

    let packed = pack_block_states(&region.blocks, region.palette.len());
    map.insert(
        "BlockStates".to_string(),
        Value::LongArray(LongArray::new(packed)),
    );

    // 读取方期望这些列表存在
    for key in ["Entities", "TileEntities", "PendingBlockTicks", "PendingFluidTicks"] {
        map.entry(key.to_string()).or_insert(Value::List(vec![]));
    }

    Value::Compound(map)
}

// ============== 取值辅助 ==============

fn int(map: &HashMap<String, Value>, key: &str) -> Result<i32> {
    match map.get(key) {
        Some(Value::Int(v)) => Ok(*v),
        Some(_) => bail!("字段 {} 不是整型", key),
        None => bail!("缺少 {} 字段", key),
    }
}

fn int_opt(map: &HashMap<String, Value>, key: &str) -> Option<i32> {
    match map.get(key) {
        Some(Value::Int(v)) => Some(*v),
        _ => None,
    }
}

fn long_opt(map: &HashMap<String, Value>, key: &str) -> Option<i64> {
    match map.get(key) {
        Some(Value::Long(v)) => Some(*v),
        Some(Value::Int(v)) => Some(*v as i64),
        _ => None,
    }
}

fn string_opt(map: &HashMap<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        _ => None,
    }
}

/// 读取 `{x, y, z}` 复合标签
fn xyz(map: &HashMap<String, Value>, key: &str) -> Result<(i32, i32, i32)> {
    let Some(Value::Compound(inner)) = map.get(key) else {
        bail!("缺少 {} 复合标签", key);
    };
    Ok((int(inner, "x")?, int(inner, "y")?, int(inner, "z")?))
}

fn xyz_to_nbt(x: i32, y: i32, z: i32) -> Value {
    let mut map = HashMap::new();
    map.insert("x".to_string(), Value::Int(x));
    map.insert("y".to_string(), Value::Int(y));
    map.insert("z".to_string(), Value::Int(z));
    Value::Compound(map)
}
