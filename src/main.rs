//! Litematic 原理图 JSON 序列化工具

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use litj::litematic::{read_litematic, read_litematic_nbt};
use litj::{export_schematic_with_config, nbt_to_json, restore_schematic_with_config, Config};

/// Litematic 原理图 JSON 序列化工具
#[derive(Parser)]
#[command(name = "litj", version, about)]
struct Cli {
    /// 配置文件路径
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 导出原理图为 JSON 方块列表
    Export {
        /// 原理图文件路径
        schematic: PathBuf,
        /// 输出文件路径
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 区域名（原理图只有一个区域时可省略）
        #[arg(short, long)]
        region: Option<String>,
        /// 覆盖已存在的输出文件
        #[arg(long, visible_alias = "override")]
        overwrite: bool,
        /// 缩进输出 JSON
        #[arg(long)]
        pretty: bool,
        /// 保留空气方块
        #[arg(long)]
        keep_air: bool,
        /// 保留命名空间前缀
        #[arg(long)]
        keep_namespace: bool,
    },
    /// 从 JSON 方块列表还原原理图
    Restore {
        /// JSON 文件路径
        json: PathBuf,
        /// 输出文件路径
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 生成的区域名
        #[arg(long)]
        region_name: Option<String>,
        /// 覆盖已存在的输出文件
        #[arg(long, visible_alias = "override")]
        overwrite: bool,
    },
    /// 查看原理图元数据与区域信息
    Info {
        /// 原理图文件路径
        schematic: PathBuf,
    },
    /// 导出原始 NBT 为 JSON（调试用）
    Dump {
        /// 原理图文件路径
        schematic: PathBuf,
        /// 输出文件路径
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 覆盖已存在的输出文件
        #[arg(long, visible_alias = "override")]
        overwrite: bool,
    },
    /// 生成默认配置文件
    Config {
        /// 输出路径（默认: litj.toml）
        #[arg(short, long, default_value = "litj.toml")]
        output: PathBuf,
        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },
}

fn load_config(config_path: Option<PathBuf>) -> Config {
    if let Some(path) = config_path {
        match Config::load_from_file(&path) {
            Ok(config) => {
                eprintln!("已加载配置: {}", path.display());
                return config;
            }
            Err(e) => {
                eprintln!("警告: 无法加载配置 {}: {}", path.display(), e);
            }
        }
    }
    Config::load()
}

/// 默认输出路径：输入文件换扩展名
fn default_output(input: &PathBuf, extension: &str) -> PathBuf {
    let mut p = input.clone();
    p.set_extension(extension);
    p
}

fn check_overwrite(path: &PathBuf, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        anyhow::bail!("输出文件已存在: {:?}\n使用 --overwrite 覆盖", path);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load_config(cli.config);

    match cli.command {
        Commands::Export {
            schematic,
            output,
            region,
            overwrite,
            pretty,
            keep_air,
            keep_namespace,
        } => {
            let output_path = output.unwrap_or_else(|| default_output(&schematic, "json"));
            check_overwrite(&output_path, overwrite)?;

            // 命令行参数优先于配置
            if keep_air {
                config.export.skip_air = false;
            }
            if keep_namespace {
                config.export.strip_namespace = false;
            }
            if pretty {
                config.export.pretty = true;
            }

            println!("导出原理图: {:?}", schematic);
            println!("输出文件: {:?}", output_path);
            println!();

            let start = Instant::now();
            let count =
                export_schematic_with_config(&schematic, &output_path, region.as_deref(), &config)?;
            println!("已导出 {} 个方块", count);
            println!("\n耗时: {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Restore {
            json,
            output,
            region_name,
            overwrite,
        } => {
            let output_path = output.unwrap_or_else(|| default_output(&json, "litematic"));
            check_overwrite(&output_path, overwrite)?;

            println!("还原 JSON: {:?}", json);
            println!("输出文件: {:?}", output_path);
            println!();

            let start = Instant::now();
            let count = restore_schematic_with_config(
                &json,
                &output_path,
                region_name.as_deref(),
                &config,
            )?;
            println!("已还原 {} 个方块", count);
            println!("\n耗时: {:.2}s", start.elapsed().as_secs_f64());
        }

        Commands::Info { schematic } => {
            let sch = read_litematic(&schematic)?;
            let md = &sch.metadata;

            println!("文件: {:?}", schematic);
            println!("名称: {}", md.name.as_deref().unwrap_or("(未命名)"));
            println!("作者: {}", md.author.as_deref().unwrap_or("(未知)"));
            if let Some(desc) = md.description.as_deref() {
                if !desc.is_empty() {
                    println!("描述: {}", desc);
                }
            }
            println!(
                "格式版本: {}{}",
                sch.version,
                sch.sub_version
                    .map(|s| format!(".{}", s))
                    .unwrap_or_default()
            );
            println!("数据版本: {}", sch.data_version);
            let (ex, ey, ez) = sch.enclosing_size();
            println!("外接尺寸: {}x{}x{}", ex, ey, ez);
            println!("方块总数: {} / 体积 {}", sch.total_blocks(), sch.total_volume());
            println!();

            println!("区域 ({}):", sch.regions.len());
            for (name, region) in &sch.regions {
                println!(
                    "  {} 位置 {:?} 尺寸 {:?} 方块 {} 调色板 {}",
                    name,
                    region.position,
                    region.size,
                    region.count_blocks(),
                    region.palette().len()
                );
            }
        }

        Commands::Dump {
            schematic,
            output,
            overwrite,
        } => {
            let output_path = output.unwrap_or_else(|| default_output(&schematic, "nbt.json"));
            check_overwrite(&output_path, overwrite)?;

            let value = read_litematic_nbt(&schematic)?;
            let json = nbt_to_json(&value);
            fs::write(&output_path, serde_json::to_string_pretty(&json)?)?;
            println!("已导出原始 NBT: {:?}", output_path);
        }

        Commands::Config { output, force } => {
            if output.exists() && !force {
                anyhow::bail!("文件已存在: {:?}\n使用 --force 覆盖", output);
            }

            let default_config = Config::default();
            default_config.save_to_file(&output)?;
            println!("已生成配置文件: {:?}", output);
            println!("\n配置项说明:");
            println!("  [export]");
            println!(
                "    skip_air = {}         # 跳过空气方块",
                default_config.export.skip_air
            );
            println!(
                "    strip_namespace = {}  # 输出短标识符",
                default_config.export.strip_namespace
            );
            println!(
                "    pretty = {}          # 缩进输出 JSON",
                default_config.export.pretty
            );
            println!("  [filter]");
            println!("    air_blocks = [...]     # 识别为空气的方块");
            println!("  [restore]");
            println!(
                "    namespace = \"{}\"  # 短标识符补全的命名空间",
                default_config.restore.namespace
            );
            println!(
                "    data_version = {}    # Minecraft 数据版本",
                default_config.restore.data_version
            );
        }
    }

    Ok(())
}
