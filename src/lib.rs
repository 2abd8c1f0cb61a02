//! Litematic 原理图 JSON 序列化工具
//!
//! 将 Litematica 原理图文件转换为方块列表 JSON, 以及逆向还原

pub mod block;
pub mod config;
pub mod export;
pub mod filter;
pub mod litematic;
pub mod nbt_json;
pub mod region;
pub mod restore;

pub use block::BlockState;
pub use config::Config;
pub use export::{collect_region, export_schematic, export_schematic_with_config, BlockRecord};
pub use litematic::{read_litematic, write_litematic, Schematic, SchematicMetadata};
pub use nbt_json::nbt_to_json;
pub use region::Region;
pub use restore::{restore_schematic, restore_schematic_with_config};
