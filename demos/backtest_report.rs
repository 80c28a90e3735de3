//! 回測準確度報告示例

use forecast::{
    AlgorithmId, EnsembleWeighting, ErrorMetric, ForecastCalculator, ForecastConfig,
    RawObservation,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== 回測準確度報告 ===\n");

    let mut rng = StdRng::seed_from_u64(7);
    let mut observations = Vec::new();
    let items: [(&str, f64); 3] = [("RAW-SUGAR", 400.0), ("RAW-BUTTER", 150.0), ("PKG-BAG", 900.0)];
    for (item_id, base) in items {
        for month in 1..=12 {
            let quantity = base * (1.0 + rng.gen_range(-0.15_f64..0.15));
            observations.push(RawObservation::new(
                item_id,
                format!("2024-{:02}", month),
                quantity.round(),
            ));
        }
    }
    // 歷史太短，不會納入回測
    observations.push(RawObservation::new("SF-NEW", "2024-12", 30.0));

    let config = ForecastConfig::default().with_weighting(EnsembleWeighting {
        metric: ErrorMetric::Rmse,
        ..EnsembleWeighting::default()
    });
    let calculator = ForecastCalculator::new(config)?;
    let report = calculator.evaluate_accuracy(&observations, 6, &AlgorithmId::ALL)?;

    println!("保留最後 {} 個月做回測", report.test_window);
    println!("{:<22} {:>10} {:>10} {:>6}", "演算法", "MAE", "RMSE", "樣本");
    for score in report.scores.values() {
        let fmt = |v: Option<f64>| v.map_or("-".to_string(), |v| format!("{:.2}", v));
        println!(
            "{:<22} {:>10} {:>10} {:>6}",
            score.algorithm.as_str(),
            fmt(score.mae),
            fmt(score.rmse),
            score.sample_count
        );
    }
    println!("\n略過的物料: {:?}", report.skipped_items);

    println!("\n{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
