// ==========================================
// 样例输入生成器
// ==========================================
// 用途: 生成一对可直接跑通流水线的 MES 导出 CSV（生产完工 + 检修停机）
// 输出: <out-dir>/sample_production.csv, <out-dir>/sample_maintenance.csv
// 说明: 固定种子可复现
// ==========================================

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use clap::Parser;
use csv::Writer;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fs;
use std::path::PathBuf;

const TIMESTAMP_FORMAT: &str = "%m/%d/%y %H:%M";

// 生产表表头（保留 MES 原始拼写）
const PRODUCTION_HEADER: &[&str] = &[
    "UID",
    "CID",
    "Production Date",
    "Thickess",
    "Width",
    "Mass out tons",
    "Hours",
    "Grade",
    "NextProcess",
    "Type",
    "Cast",
    "Slab",
];

const MAINTENANCE_HEADER: &[&str] = &[
    "Start",
    "Time (Hours)",
    "Crew",
    "Shifts",
    "Category",
    "Delay Type",
    "Area",
    "Sub Area",
    "Hierachy",
    "Decription",
    "Day",
];

// 检修子区域: 产线设备（部分带 "(n)" 后缀）+ 公辅 + 应排除设备
const SUB_AREAS: &[&str] = &[
    "Entry Coil Car",
    "Coil Prep Sattion",
    "Decoiler(1)",
    "Decoiler(2)",
    "Entry Guide Table",
    "Entry SnubberHold Down & Pressure Rolls",
    "Entry & Exit Feed Table",
    "Pinch Roll & Bending Unit",
    "Flattener, Pinch & Deflator Rolls",
    "Temper Mill Unit",
    "Crop Shear",
    "Recoiler (3)",
    "First Conveyor",
    "Second Conveyor",
    "Scale M65 (conveyor)",
    "Delivery Conveyor",
    "Exit Coil Car",
    "Strapping Machine",
    "Lube System",
    "Central Hyd System",
    "Cranes",
    "Computer Room",
];

const PRIME_TYPES: &[&str] = &["HL", "HM", "98", "71", "72"];
const SCRAP_TYPES: &[&str] = &["HX", "HY", "HC"];
const GRADES: &[&str] = &["SAE1006", "SAE1008", "S235JR", "DD11"];
const NEXT_PROCESSES: &[&str] = &["PKL", "CRM", "SHP"];
const CATEGORIES: &[(&str, &str)] = &[
    ("Mechanical", "Breakdown"),
    ("Electrical", "Breakdown"),
    ("Operational", "Delay"),
    ("Planned", "Maintenance"),
];
const CREWS: &[&str] = &["A", "B", "C", "D"];

#[derive(Parser, Debug)]
#[command(name = "generate_sample_inputs")]
#[command(about = "生成样例 MES 导出 CSV", long_about = None)]
struct Args {
    /// 输出目录
    #[arg(short, long, default_value = "sample_inputs")]
    out_dir: PathBuf,

    /// 母卷数量
    #[arg(long, default_value_t = 120)]
    parents: usize,

    /// 检修记录数量
    #[arg(long, default_value_t = 60)]
    maintenance_rows: usize,

    /// 随机种子
    #[arg(long, default_value_t = 20240601)]
    seed: u64,
}

fn fmt_ts(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn start_of_sample() -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(6, 0, 0))
        .context("无效起始时间")
}

/// 生产完工记录: 每母卷 2~4 分卷, 卷间 2~8 分钟, 偶发长停机
fn generate_production(rng: &mut ChaCha8Rng, parents: usize) -> Result<(Vec<Vec<String>>, NaiveDateTime)> {
    let mut ts = start_of_sample()?;
    let mut rows = Vec::new();

    for p in 0..parents {
        let cid = format!("C{:06}", 500_000 + p);
        let thickness: f64 = rng.gen_range(1.5..4.2);
        let width: f64 = rng.gen_range(1100.0..1650.0);
        let grade = GRADES.choose(rng).copied().unwrap_or("SAE1006");
        let cast = format!("{}", 80_000 + p / 6);

        if rng.gen_bool(0.03) {
            ts += Duration::minutes(rng.gen_range(400..900));
        }

        let pieces = rng.gen_range(2..=4);
        for piece in 0..pieces {
            ts += Duration::minutes(rng.gen_range(2..=8));
            let type_code = if rng.gen_bool(0.12) {
                SCRAP_TYPES.choose(rng)
            } else {
                PRIME_TYPES.choose(rng)
            }
            .copied()
            .unwrap_or("HL");

            rows.push(vec![
                format!("{cid}{}", (b'A' + piece as u8) as char),
                cid.clone(),
                fmt_ts(ts),
                format!("{thickness:.2}"),
                format!("{width:.0}"),
                format!("{:.3}", rng.gen_range(4.0..22.0)),
                format!("{:.2}", rng.gen_range(0.1..0.4)),
                grade.to_string(),
                NEXT_PROCESSES.choose(rng).copied().unwrap_or("PKL").to_string(),
                type_code.to_string(),
                cast.clone(),
                format!("S{:07}", 1_000_000 + p),
            ]);
        }
    }

    Ok((rows, ts))
}

/// 检修停机记录: 均匀散布在生产时间跨度内
fn generate_maintenance(
    rng: &mut ChaCha8Rng,
    count: usize,
    end: NaiveDateTime,
) -> Result<Vec<Vec<String>>> {
    let start = start_of_sample()?;
    let span_min = (end - start).num_minutes().max(1);

    let mut rows: Vec<(NaiveDateTime, Vec<String>)> = (0..count)
        .map(|_| {
            let at = start + Duration::minutes(rng.gen_range(0..span_min));
            let (category, delay_type) = CATEGORIES.choose(rng).copied().unwrap_or(("Mechanical", "Breakdown"));
            let sub_area = SUB_AREAS.choose(rng).copied().unwrap_or("Decoiler");
            let row = vec![
                fmt_ts(at),
                format!("{:.2}", rng.gen_range(0.05..3.0)),
                CREWS.choose(rng).copied().unwrap_or("A").to_string(),
                CREWS.choose(rng).copied().unwrap_or("A").to_string(),
                category.to_string(),
                delay_type.to_string(),
                "Finishing".to_string(),
                sub_area.to_string(),
                format!("Finishing/{sub_area}"),
                format!("{category} stop on {sub_area}"),
                at.format("%A").to_string(),
            ];
            (at, row)
        })
        .collect();
    rows.sort_by_key(|(at, _)| *at);

    Ok(rows.into_iter().map(|(_, row)| row).collect())
}

fn write_csv(path: &PathBuf, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut wtr = Writer::from_path(path).with_context(|| format!("创建文件失败: {}", path.display()))?;
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("创建输出目录失败: {}", args.out_dir.display()))?;

    // 1. 生产完工
    let (production, last_ts) = generate_production(&mut rng, args.parents)?;
    let production_path = args.out_dir.join("sample_production.csv");
    write_csv(&production_path, PRODUCTION_HEADER, &production)?;
    println!("✓ 生成 {} ({}条)", production_path.display(), production.len());

    // 2. 检修停机
    let maintenance = generate_maintenance(&mut rng, args.maintenance_rows, last_ts)?;
    let maintenance_path = args.out_dir.join("sample_maintenance.csv");
    write_csv(&maintenance_path, MAINTENANCE_HEADER, &maintenance)?;
    println!("✓ 生成 {} ({}条)", maintenance_path.display(), maintenance.len());

    println!(
        "运行: coil-line-etl run --production {} --maintenance {} --seed {}",
        production_path.display(),
        maintenance_path.display(),
        args.seed
    );
    Ok(())
}
