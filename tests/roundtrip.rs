use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use litj::export::{export_schematic_with_config, read_records};
use litj::litematic::{read_litematic, write_litematic, Schematic, SchematicMetadata};
use litj::restore::restore_schematic_with_config;
use litj::{BlockState, Config, Region};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("litj_{}_{}", std::process::id(), name))
}

/// 构造带空气、普通方块和带属性方块的样例原理图
fn sample_schematic() -> Schematic {
    let mut region = Region::new("Unnamed", (0, 0, 0), (4, 3, 4));

    let stone = BlockState::new("minecraft:stone");
    let stairs = BlockState::new("minecraft:oak_stairs")
        .with_property("facing", "north")
        .with_property("half", "bottom");
    let cave_air = BlockState::new("minecraft:cave_air");
    let void_air = BlockState::new("minecraft:void_air");

    for x in 0..4 {
        for z in 0..4 {
            region.set_block(x, 0, z, &stone).unwrap();
        }
    }
    region.set_block(1, 1, 1, &stairs).unwrap();
    region.set_block(2, 1, 2, &cave_air).unwrap();
    region.set_block(3, 2, 3, &void_air).unwrap();

    let mut regions = BTreeMap::new();
    regions.insert("Unnamed".to_string(), region);

    Schematic {
        version: 6,
        sub_version: Some(1),
        data_version: 3578,
        metadata: SchematicMetadata {
            name: Some("sample".to_string()),
            author: Some("tester".to_string()),
            description: None,
            time_created: Some(1700000000000),
            time_modified: Some(1700000000000),
        },
        regions,
    }
}

#[test]
fn litematic_file_roundtrip() {
    let path = temp_path("roundtrip.litematic");
    let schematic = sample_schematic();

    write_litematic(&path, &schematic).expect("写入失败");
    let loaded = read_litematic(&path).expect("读取失败");

    assert_eq!(loaded.version, 6);
    assert_eq!(loaded.data_version, 3578);
    assert_eq!(loaded.metadata.name.as_deref(), Some("sample"));

    let original = schematic.region(None).unwrap();
    let region = loaded.region(None).unwrap();
    assert_eq!(region.size, original.size);
    for x in 0..4 {
        for y in 0..3 {
            for z in 0..4 {
                assert_eq!(
                    region.get(x, y, z),
                    original.get(x, y, z),
                    "方块不一致 ({}, {}, {})",
                    x,
                    y,
                    z
                );
            }
        }
    }

    fs::remove_file(&path).ok();
}

#[test]
fn export_excludes_air_and_splits_identifiers() {
    let schematic_path = temp_path("export.litematic");
    let json_path = temp_path("export.json");
    write_litematic(&schematic_path, &sample_schematic()).expect("写入失败");

    let config = Config::default();
    let count = export_schematic_with_config(&schematic_path, &json_path, None, &config)
        .expect("导出失败");

    // 16 个石头 + 1 个楼梯，三种空气都被过滤
    assert_eq!(count, 17);

    let records = read_records(&json_path).expect("读取记录失败");
    assert_eq!(records.len(), 17);
    assert!(records
        .iter()
        .all(|r| r.id != "air" && r.id != "cave_air" && r.id != "void_air"));

    let stairs = records.iter().find(|r| r.pos == (1, 1, 1)).expect("缺少楼梯");
    assert_eq!(stairs.id, "oak_stairs");
    assert_eq!(stairs.props, "[facing=north,half=bottom]");

    let stone = records.iter().find(|r| r.pos == (0, 0, 0)).expect("缺少石头");
    assert_eq!(stone.id, "stone");
    assert_eq!(stone.props, "");

    fs::remove_file(&schematic_path).ok();
    fs::remove_file(&json_path).ok();
}

#[test]
fn export_restore_export_is_stable() {
    let schematic_path = temp_path("stable.litematic");
    let json_path = temp_path("stable.json");
    let restored_path = temp_path("stable_restored.litematic");
    let json_path_2 = temp_path("stable_2.json");

    write_litematic(&schematic_path, &sample_schematic()).expect("写入失败");

    let config = Config::default();
    export_schematic_with_config(&schematic_path, &json_path, None, &config).expect("导出失败");
    restore_schematic_with_config(&json_path, &restored_path, None, &config).expect("还原失败");
    export_schematic_with_config(&restored_path, &json_path_2, None, &config)
        .expect("二次导出失败");

    let first = read_records(&json_path).expect("读取记录失败");
    let second = read_records(&json_path_2).expect("读取记录失败");
    assert_eq!(first, second);

    // 还原出的原理图元数据完整
    let restored = read_litematic(&restored_path).expect("读取失败");
    assert_eq!(restored.regions.len(), 1);
    assert!(restored.regions.contains_key("Unnamed"));
    assert_eq!(restored.total_blocks(), 17);

    for path in [&schematic_path, &json_path, &restored_path, &json_path_2] {
        fs::remove_file(path).ok();
    }
}

#[test]
fn export_selects_region_by_name() {
    let schematic_path = temp_path("multi.litematic");
    let json_path = temp_path("multi.json");

    let mut schematic = sample_schematic();
    let mut second = Region::new("Annex", (10, 0, 0), (2, 1, 1));
    second
        .set_block(0, 0, 0, &BlockState::new("minecraft:dirt"))
        .unwrap();
    schematic.regions.insert("Annex".to_string(), second);
    write_litematic(&schematic_path, &schematic).expect("写入失败");

    let config = Config::default();

    // 多区域时必须指定名称
    assert!(export_schematic_with_config(&schematic_path, &json_path, None, &config).is_err());

    let count =
        export_schematic_with_config(&schematic_path, &json_path, Some("Annex"), &config)
            .expect("导出失败");
    assert_eq!(count, 1);
    let records = read_records(&json_path).expect("读取记录失败");
    assert_eq!(records[0].id, "dirt");
    assert_eq!(records[0].pos, (0, 0, 0));

    fs::remove_file(&schematic_path).ok();
    fs::remove_file(&json_path).ok();
}
