//! 区域模型 - 调色板、方块网格与坐标遍历

use crate::block::BlockState;
use crate::filter;
use anyhow::{bail, Result};
use fastnbt::Value;
use std::collections::HashMap;

/// 原理图中的一个命名区域
///
/// Size 的分量可以为负（区域向负方向延伸），局部坐标范围随之变化，
/// 内部存储始终按绝对尺寸展平
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub position: (i32, i32, i32),
    pub size: (i32, i32, i32),
    pub(crate) palette: Vec<BlockState>,
    pub(crate) blocks: Vec<usize>,
    /// 结构字段之外的原始 NBT（Entities、TileEntities、计划刻等），写回时透传
    pub(crate) extra: HashMap<String, Value>,
    palette_index: HashMap<BlockState, usize>,
}

impl Region {
    /// 创建空区域，调色板以空气打底（索引 0）
    pub fn new(name: impl Into<String>, position: (i32, i32, i32), size: (i32, i32, i32)) -> Self {
        let air = BlockState::new("minecraft:air");
        let mut palette_index = HashMap::new();
        palette_index.insert(air.clone(), 0);

        let volume =
            size.0.unsigned_abs() as usize * size.1.unsigned_abs() as usize * size.2.unsigned_abs() as usize;

        Region {
            name: name.into(),
            position,
            size,
            palette: vec![air],
            blocks: vec![0; volume],
            extra: HashMap::new(),
            palette_index,
        }
    }

    /// 从已解码的数据组装区域，校验方块数量与调色板索引
    pub fn from_parts(
        name: impl Into<String>,
        position: (i32, i32, i32),
        size: (i32, i32, i32),
        palette: Vec<BlockState>,
        blocks: Vec<usize>,
        extra: HashMap<String, Value>,
    ) -> Result<Self> {
        let name = name.into();
        let volume =
            size.0.unsigned_abs() as usize * size.1.unsigned_abs() as usize * size.2.unsigned_abs() as usize;

        if blocks.len() != volume {
            bail!(
                "区域 {} 方块数量不符: 期望 {} 实际 {}",
                name,
                volume,
                blocks.len()
            );
        }
        if palette.is_empty() && volume > 0 {
            bail!("区域 {} 调色板为空", name);
        }
        if let Some(&bad) = blocks.iter().find(|&&i| i >= palette.len()) {
            bail!(
                "区域 {} 调色板索引越界: {} (调色板大小 {})",
                name,
                bad,
                palette.len()
            );
        }

        let palette_index = palette
            .iter()
            .enumerate()
            .map(|(i, b)| (b.clone(), i))
            .collect();

        Ok(Region {
            name,
            position,
            size,
            palette,
            blocks,
            extra,
            palette_index,
        })
    }

    pub fn volume(&self) -> usize {
        self.size.0.unsigned_abs() as usize
            * self.size.1.unsigned_abs() as usize
            * self.size.2.unsigned_abs() as usize
    }

    // 局部坐标的闭区间边界：尺寸为正时 0..=s-1，为负时 s+1..=0

    pub fn min_x(&self) -> i32 {
        (self.size.0 + 1).min(0)
    }

    pub fn max_x(&self) -> i32 {
        (self.size.0 - 1).max(0)
    }

    pub fn min_y(&self) -> i32 {
        (self.size.1 + 1).min(0)
    }

    pub fn max_y(&self) -> i32 {
        (self.size.1 - 1).max(0)
    }

    pub fn min_z(&self) -> i32 {
        (self.size.2 + 1).min(0)
    }

    pub fn max_z(&self) -> i32 {
        (self.size.2 - 1).max(0)
    }

    /// 区域在原理图坐标系中的包围盒（最小角与最大角）
    pub fn schematic_bounds(&self) -> ((i32, i32, i32), (i32, i32, i32)) {
        (
            (
                self.position.0 + self.min_x(),
                self.position.1 + self.min_y(),
                self.position.2 + self.min_z(),
            ),
            (
                self.position.0 + self.max_x(),
                self.position.1 + self.max_y(),
                self.position.2 + self.max_z(),
            ),
        )
    }

    fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= self.min_x()
            && x <= self.max_x()
            && y >= self.min_y()
            && y <= self.max_y()
            && z >= self.min_z()
            && z <= self.max_z()
    }

    /// 局部坐标到展平索引，y 为主序，其次 z、x
    fn index_of(&self, x: i32, y: i32, z: i32) -> usize {
        let w = self.size.0.unsigned_abs() as usize;
        let l = self.size.2.unsigned_abs() as usize;
        let sx = (x - self.min_x()) as usize;
        let sy = (y - self.min_y()) as usize;
        let sz = (z - self.min_z()) as usize;
        sy * w * l + sz * w + sx
    }

    /// 获取局部坐标上的方块状态，越界或空区域返回 None
    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<&BlockState> {
        if self.volume() == 0 || !self.contains(x, y, z) {
            return None;
        }
        self.palette.get(self.blocks[self.index_of(x, y, z)])
    }

    /// 在局部坐标上放置方块，按需扩充调色板
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: &BlockState) -> Result<()> {
        if self.volume() == 0 || !self.contains(x, y, z) {
            bail!("坐标 ({}, {}, {}) 超出区域 {} 的范围", x, y, z, self.name);
        }
        let palette_index = self.get_or_insert_in_palette(block);
        let index = self.index_of(x, y, z);
        self.blocks[index] = palette_index;
        Ok(())
    }

    fn get_or_insert_in_palette(&mut self, block: &BlockState) -> usize {
        match self.palette_index.get(block) {
            Some(&index) => index,
            None => {
                let index = self.palette.len();
                self.palette.push(block.clone());
                self.palette_index.insert(block.clone(), index);
                index
            }
        }
    }

    pub fn palette(&self) -> &[BlockState] {
        &self.palette
    }

    /// 非空气方块数量
    pub fn count_blocks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|&&i| !filter::is_air(&self.palette[i].name))
            .count()
    }
}

/// 每个方块占用的位数，最少 2 位
pub fn bits_per_block(palette_len: usize) -> usize {
    std::cmp::max((palette_len as f64).log2().ceil() as usize, 2)
}

/// 解码紧密位压缩的 BlockStates 长整型数组
///
/// 条目可以横跨两个 long，与区块存储不同
pub fn unpack_block_states(packed: &[i64], palette_len: usize, volume: usize) -> Result<Vec<usize>> {
    let bits = bits_per_block(palette_len);
    let expected_len = (volume * bits + 63) / 64;
    if packed.len() < expected_len {
        bail!(
            "BlockStates 长度不符: 期望至少 {} 个 long, 实际 {}",
            expected_len,
            packed.len()
        );
    }

    let mask = (1u64 << bits) - 1;
    let mut blocks = Vec::with_capacity(volume);

    for index in 0..volume {
        let bit_index = index * bits;
        let start_long_index = bit_index / 64;
        let start_offset = bit_index % 64;

        let value = if start_offset + bits <= 64 {
            ((packed[start_long_index] as u64) >> start_offset) & mask
        } else {
            let low_bits = (packed[start_long_index] as u64) >> start_offset;
            let high_bits = packed[start_long_index + 1] as u64;
            (low_bits | (high_bits << (64 - start_offset))) & mask
        };

        blocks.push(value as usize);
    }

    Ok(blocks)
}

/// 将调色板索引编码为紧密位压缩的长整型数组
pub fn pack_block_states(blocks: &[usize], palette_len: usize) -> Vec<i64> {
    let bits = bits_per_block(palette_len);
    let expected_len = (blocks.len() * bits + 63) / 64;

    let mut packed = vec![0i64; expected_len];
    let mask = (1i64 << bits) - 1;

    for (index, &block) in blocks.iter().enumerate() {
        let bit_index = index * bits;
        let start_long_index = bit_index / 64;
        let end_long_index = (bit_index + bits - 1) / 64;
        let start_offset = bit_index % 64;

        let value = (block as i64) & mask;

        packed[start_long_index] |= value << start_offset;
        if start_long_index != end_long_index {
            packed[end_long_index] |= value >> (64 - start_offset);
        }
    }

    packed
}
