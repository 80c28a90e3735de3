//! 簡單需求預測示例

use forecast::{
    AlgorithmId, Decimal, ForecastCalculator, ForecastConfig, ForecastRequest, InventoryLevel,
    ItemCategory, ItemInfo, RawObservation, YearMonth,
};
use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 產生兩年的每月消耗紀錄：基準量 + 趨勢 + 年底旺季 + 雜訊
fn history(
    rng: &mut StdRng,
    item_id: &str,
    base: f64,
    growth: f64,
) -> anyhow::Result<Vec<RawObservation>> {
    let start = YearMonth::new(2023, 1).context("無效的起始月份")?;
    let mut records = Vec::new();

    for step in 0..24u32 {
        let month = start.checked_add_months(step).context("月份超出範圍")?;
        let peak = if month.month() >= 11 { base * 0.4 } else { 0.0 };
        let noise = rng.gen_range(-0.05_f64..0.05) * base;
        let quantity = (base + growth * step as f64 + peak + noise).round();
        records.push(RawObservation::new(item_id, month.to_string(), quantity));
    }

    Ok(records)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== 簡單需求預測示例 ===\n");

    let mut rng = StdRng::seed_from_u64(42);
    let mut observations = history(&mut rng, "RAW-FLOUR", 800.0, 5.0)?;
    observations.extend(history(&mut rng, "PKG-BOX", 120.0, 0.0)?);
    observations.extend(history(&mut rng, "FG-BREAD", 300.0, -2.0)?);

    let request = ForecastRequest::new(6)
        .with_algorithms(vec![
            AlgorithmId::MovingAverage,
            AlgorithmId::SeasonalTrend,
            AlgorithmId::WeightedEnsemble,
        ])
        .with_items(vec![
            ItemInfo::new("RAW-FLOUR".to_string(), "高筋麵粉".to_string())
                .with_category(ItemCategory::RawMaterial),
            ItemInfo::new("PKG-BOX".to_string(), "外箱".to_string())
                .with_category(ItemCategory::Packaging),
            ItemInfo::new("FG-BREAD".to_string(), "吐司".to_string())
                .with_category(ItemCategory::FinishedGood),
        ]);

    let calculator = ForecastCalculator::new(ForecastConfig::default())?;
    let run = calculator.smart_forecast(&observations, &request)?;

    for result in &run.results {
        println!("物料: {} ({})", result.item_name, result.item_id);
        for algorithm in request.resolved_algorithms() {
            let values: Vec<String> = result
                .predictions_for(algorithm)
                .iter()
                .map(|v| format!("{:.0}", v))
                .collect();
            println!("  {:<22} {}", algorithm.as_str(), values.join(" / "));
        }
    }

    // 與目前庫存比較
    let inventory = InventoryLevel::new(
        "RAW-FLOUR".to_string(),
        Decimal::from(2500),
        Decimal::from(500),
        Decimal::new(3250, 2),
    );
    let demand = run
        .result_for(&inventory.item_id)
        .and_then(|flour| flour.total_for(AlgorithmId::WeightedEnsemble));
    if let Some(demand) = demand {
        println!(
            "\n{} 未來 6 個月預測消耗 {}，現有庫存 {}，缺口 {}",
            inventory.item_id,
            demand,
            inventory.quantity,
            (demand - inventory.quantity).max(Decimal::ZERO)
        );
    }

    if let Some(ms) = run.calculation_time_ms {
        println!("\n計算耗時: {} ms", ms);
    }

    Ok(())
}
