//! 方块状态的解析与格式化

use anyhow::{bail, Context, Result};
use fastnbt::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// 方块状态：完整标识符 + 状态属性
///
/// 属性使用 BTreeMap 保证输出顺序稳定（原版属性本身按字母序排列）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockState {
    pub name: String,
    pub properties: BTreeMap<String, String>,
}

impl BlockState {
    pub fn new(name: impl Into<String>) -> Self {
        BlockState {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// 去掉命名空间的短标识符（`minecraft:stone` -> `stone`）
    /// 没有命名空间时原样返回
    pub fn short_name(&self) -> &str {
        match self.name.split_once(':') {
            Some((_, id)) => id,
            None => &self.name,
        }
    }

    /// 完整状态标识符，如 `minecraft:oak_stairs[facing=north,half=bottom]`
    pub fn state_identifier(&self) -> String {
        format!("{}{}", self.name, self.properties_suffix())
    }

    /// 状态标识符中去掉方块名后剩余的属性部分
    /// 如 `[facing=north,half=bottom]`，没有属性时为空字符串
    pub fn properties_suffix(&self) -> String {
        if self.properties.is_empty() {
            return String::new();
        }
        let props: Vec<String> = self
            .properties
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        format!("[{}]", props.join(","))
    }

    /// 从导出记录还原方块状态
    ///
    /// `id` 缺少命名空间时补上默认命名空间，`props` 为 `[k=v,...]` 或空
    pub fn from_record(id: &str, props: &str, namespace: &str) -> Result<Self> {
        if id.is_empty() {
            bail!("方块标识符为空");
        }
        let name = if id.contains(':') {
            id.to_string()
        } else {
            format!("{}:{}", namespace, id)
        };
        let mut state = BlockState::new(name);
        state.properties = parse_properties(props)?;
        Ok(state)
    }

    /// 从 litematic 调色板条目解析（`{Name, Properties}` 复合标签）
    pub fn from_nbt(value: &Value) -> Result<Self> {
        let Value::Compound(map) = value else {
            bail!("调色板条目不是复合标签");
        };
        let name = match map.get("Name") {
            Some(Value::String(s)) => s.clone(),
            _ => bail!("调色板条目缺少 Name 字段"),
        };

        let mut properties = BTreeMap::new();
        if let Some(Value::Compound(props)) = map.get("Properties") {
            for (key, value) in props {
                if let Value::String(s) = value {
                    properties.insert(key.clone(), s.clone());
                }
            }
        }

        Ok(BlockState { name, properties })
    }

    /// 转换为 litematic 调色板条目
    pub fn to_nbt(&self) -> Value {
        let mut map = HashMap::new();
        map.insert("Name".to_string(), Value::String(self.name.clone()));

        if !self.properties.is_empty() {
            let props: HashMap<String, Value> = self
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            map.insert("Properties".to_string(), Value::Compound(props));
        }

        Value::Compound(map)
    }
}

/// 解析 `[k=v,k2=v2]` 形式的属性字符串
fn parse_properties(props: &str) -> Result<BTreeMap<String, String>> {
    let mut properties = BTreeMap::new();

    let inner = props.trim().trim_matches(|c| c == '[' || c == ']');
    if inner.trim().is_empty() {
        return Ok(properties);
    }

    for pair in inner.split(',') {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("无效的属性: {}", pair))?;
        properties.insert(key.trim().to_string(), value.trim().to_string());
    }

    Ok(properties)
}

#[cfg(test)]
mod tests {
    use super::BlockState;

    #[test]
    fn short_name_strips_namespace() {
        assert_eq!(BlockState::new("minecraft:stone").short_name(), "stone");
        assert_eq!(BlockState::new("create:cogwheel").short_name(), "cogwheel");
        assert_eq!(BlockState::new("stone").short_name(), "stone");
    }

    #[test]
    fn properties_suffix_is_sorted_and_bracketed() {
        let block = BlockState::new("minecraft:oak_stairs")
            .with_property("half", "bottom")
            .with_property("facing", "north");

        assert_eq!(block.properties_suffix(), "[facing=north,half=bottom]");
        assert_eq!(
            block.state_identifier(),
            "minecraft:oak_stairs[facing=north,half=bottom]"
        );
    }

    #[test]
    fn no_properties_means_empty_suffix() {
        let block = BlockState::new("minecraft:stone");
        assert_eq!(block.properties_suffix(), "");
        assert_eq!(block.state_identifier(), "minecraft:stone");
    }

    #[test]
    fn from_record_restores_namespace_and_properties() {
        let block = BlockState::from_record("oak_stairs", "[facing=north]", "minecraft").unwrap();
        assert_eq!(block.name, "minecraft:oak_stairs");
        assert_eq!(block.properties.get("facing"), Some(&"north".to_string()));

        let block = BlockState::from_record("create:cogwheel", "", "minecraft").unwrap();
        assert_eq!(block.name, "create:cogwheel");
        assert!(block.properties.is_empty());
    }

    #[test]
    fn from_record_rejects_malformed_properties() {
        assert!(BlockState::from_record("stone", "[facing]", "minecraft").is_err());
        assert!(BlockState::from_record("", "", "minecraft").is_err());
    }

    #[test]
    fn record_roundtrip() {
        let block = BlockState::new("minecraft:lever")
            .with_property("face", "wall")
            .with_property("powered", "true");

        let restored =
            BlockState::from_record(block.short_name(), &block.properties_suffix(), "minecraft")
                .unwrap();
        assert_eq!(block, restored);
    }

    #[test]
    fn nbt_roundtrip() {
        let block = BlockState::new("minecraft:note_block").with_property("note", "5");
        let restored = BlockState::from_nbt(&block.to_nbt()).unwrap();
        assert_eq!(block, restored);
    }
}
