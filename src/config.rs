//! 配置文件加载与管理

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 主配置结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 导出配置
    pub export: ExportConfig,
    /// 还原配置
    pub restore: RestoreConfig,
    /// 过滤配置
    pub filter: FilterConfig,
}

/// 导出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// 跳过空气方块
    pub skip_air: bool,
    /// 输出短标识符（去掉命名空间）
    pub strip_namespace: bool,
    /// 缩进输出 JSON
    pub pretty: bool,
}

/// 还原配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoreConfig {
    /// 短标识符补全用的默认命名空间
    pub namespace: String,
    /// 生成的区域名
    pub region_name: String,
    /// 元数据作者
    pub author: String,
    /// litematic 格式版本
    pub version: i32,
    pub sub_version: i32,
    /// Minecraft 数据版本（默认对应 1.20.2）
    pub data_version: i32,
}

/// 过滤配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// 识别为空气的方块标识符
    pub air_blocks: Vec<String>,
}

// ============== 默认值 ==============

impl Default for Config {
    fn default() -> Self {
        Self {
            export: ExportConfig::default(),
            restore: RestoreConfig::default(),
            filter: FilterConfig::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            skip_air: true,
            strip_namespace: true,
            pretty: false,
        }
    }
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            namespace: "minecraft".to_string(),
            region_name: "Unnamed".to_string(),
            author: "litj".to_string(),
            version: 6,
            sub_version: 1,
            data_version: 3578,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            air_blocks: crate::filter::AIR_BLOCKS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

// ============== 配置加载 ==============

impl Config {
    /// 从文件加载配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// 获取默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("litj").join("config.toml"))
    }

    /// 按优先级加载配置：
    /// 1. 当前目录的 litj.toml
    /// 2. 用户配置目录的 config.toml
    /// 3. 默认配置
    pub fn load() -> Self {
        // 当前目录
        let local_config = Path::new("litj.toml");
        if local_config.exists() {
            if let Ok(config) = Self::load_from_file(local_config) {
                eprintln!("已加载配置: litj.toml");
                return config;
            }
        }

        // 用户配置目录
        if let Some(user_config) = Self::default_config_path() {
            if user_config.exists() {
                if let Ok(config) = Self::load_from_file(&user_config) {
                    eprintln!("已加载配置: {}", user_config.display());
                    return config;
                }
            }
        }

        // 默认配置
        Self::default()
    }

    /// 生成默认配置文件内容
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
