//! Metrics reduction
//!
//! Pure functions turning collected series into comparable figures. No
//! network access happens here.
//!
//! # Throughput
//!
//! ```text
//! rate           = times / duration
//! valid_duration = 0.9 * duration          (ramp-up/ramp-down discount)
//! tps            = (transactions.last - transactions.first) / valid_duration
//! ctps           = (balance.last - balance.first) / valid_duration
//! ```
//!
//! TPS and CTPS are rounded to four decimals. Degenerate inputs (zero
//! duration, empty or decreasing series) are refused with
//! `BenchError::Aggregation` instead of producing infinities.

use rust_decimal::{Decimal, RoundingStrategy};
use std::time::Duration;

use crate::types::{BenchError, LatencySummary, MetricsRecord, ThroughputSamples};

/// Share of the wall-clock window counted as steady state
pub const VALID_WINDOW_FRACTION: Decimal = Decimal::from_parts(9, 0, 0, false, 1);

/// Decimal places of reported TPS and CTPS
pub const METRIC_DECIMALS: u32 = 4;

/// Reduce one run's samples into its throughput record
///
/// Always yields exactly one record; call once per run segment to build a
/// comparison table.
pub fn throughput_records(samples: &ThroughputSamples) -> Result<Vec<MetricsRecord>, BenchError> {
    let duration = duration_secs(samples.duration);
    if duration.is_zero() {
        return Err(BenchError::aggregation("measurement duration is zero"));
    }
    let valid_duration = duration * VALID_WINDOW_FRACTION;
    if valid_duration.is_zero() {
        return Err(BenchError::aggregation("valid measurement duration is zero"));
    }

    let valid_trans = span(&samples.transactions, "transactions")?;
    let confirmed = span(&samples.balance, "balance")?;

    let rate = (Decimal::from(samples.times) / duration).normalize();
    let tps = round(Decimal::from(valid_trans) / valid_duration);
    let ctps = round(Decimal::from(confirmed) / valid_duration);

    Ok(vec![MetricsRecord {
        nodes: samples.nodes,
        client: samples.senders,
        rate,
        duration: valid_duration.normalize(),
        tps,
        ctps,
    }])
}

/// Summarise wait-and-measure samples, skipping failed (`None`) ones
///
/// Percentiles use the nearest-rank method.
pub fn summarize_latencies(samples: &[Option<Duration>]) -> Result<LatencySummary, BenchError> {
    let mut confirmed: Vec<Duration> = samples.iter().flatten().copied().collect();
    let failed = samples.len() - confirmed.len();
    if confirmed.is_empty() {
        return Err(BenchError::aggregation(format!(
            "no confirmed latency samples ({} failed)",
            failed
        )));
    }
    confirmed.sort_unstable();

    let total: Duration = confirmed.iter().sum();
    let count = confirmed.len();
    Ok(LatencySummary {
        samples: count,
        failed,
        min: confirmed[0],
        max: confirmed[count - 1],
        mean: total / count as u32,
        p50: percentile(&confirmed, 50),
        p99: percentile(&confirmed, 99),
    })
}

fn duration_secs(duration: Duration) -> Decimal {
    Decimal::new(duration.as_millis() as i64, 3)
}

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(METRIC_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Growth of a cumulative series between its first and last sample
fn span(series: &[u64], name: &str) -> Result<u64, BenchError> {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(BenchError::aggregation(format!("{} series is empty", name)));
    };
    last.checked_sub(*first).ok_or_else(|| {
        BenchError::aggregation(format!(
            "{} series decreases (first {}, last {})",
            name, first, last
        ))
    })
}

fn percentile(sorted: &[Duration], p: usize) -> Duration {
    let rank = (p * sorted.len()).div_ceil(100);
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn samples(transactions: Vec<u64>, balance: Vec<u64>, times: u64, secs: u64) -> ThroughputSamples {
        ThroughputSamples {
            transactions,
            balance,
            times,
            nodes: 4,
            senders: 10,
            duration: Duration::from_secs(secs),
        }
    }

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn test_reference_workload() {
        let records = throughput_records(&samples(vec![0, 100], vec![0, 50], 120, 100)).unwrap();

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.nodes, 4);
        assert_eq!(record.client, 10);
        assert_eq!(record.rate, dec("1.2"));
        assert_eq!(record.duration, dec("90"));
        assert_eq!(record.tps, dec("1.1111"));
        assert_eq!(record.ctps, dec("0.5556"));
    }

    #[rstest]
    #[case::intermediate_samples_ignored(vec![10, 40, 70, 100], vec![5, 6, 7, 50], dec("1.0000"), dec("0.5000"))]
    #[case::no_growth(vec![7, 7], vec![3, 3], Decimal::ZERO, Decimal::ZERO)]
    #[case::single_sample(vec![42], vec![42], Decimal::ZERO, Decimal::ZERO)]
    fn test_only_first_and_last_samples_count(
        #[case] transactions: Vec<u64>,
        #[case] balance: Vec<u64>,
        #[case] tps: Decimal,
        #[case] ctps: Decimal,
    ) {
        let records = throughput_records(&samples(transactions, balance, 90, 100)).unwrap();
        assert_eq!(records[0].tps, tps);
        assert_eq!(records[0].ctps, ctps);
    }

    #[test]
    fn test_sub_second_duration() {
        let mut input = samples(vec![0, 9], vec![0, 9], 10, 0);
        input.duration = Duration::from_millis(500);

        let record = &throughput_records(&input).unwrap()[0];

        assert_eq!(record.rate, dec("20"));
        assert_eq!(record.duration, dec("0.45"));
        assert_eq!(record.tps, dec("20"));
    }

    #[rstest]
    #[case::zero_duration(samples(vec![0, 100], vec![0, 50], 120, 0), "duration is zero")]
    #[case::empty_transactions(samples(vec![], vec![0, 50], 120, 100), "transactions series is empty")]
    #[case::empty_balance(samples(vec![0, 100], vec![], 120, 100), "balance series is empty")]
    #[case::decreasing(samples(vec![100, 0], vec![0, 50], 120, 100), "transactions series decreases")]
    fn test_degenerate_inputs_are_refused(#[case] input: ThroughputSamples, #[case] expected: &str) {
        let result = throughput_records(&input);
        match result {
            Err(BenchError::Aggregation { message }) => assert!(
                message.contains(expected),
                "expected '{}' in '{}'",
                expected,
                message
            ),
            other => panic!("expected aggregation error, got {:?}", other),
        }
    }

    #[test]
    fn test_latency_summary_excludes_failed_samples() {
        let samples: Vec<Option<Duration>> = vec![
            Some(Duration::from_secs(3)),
            None,
            Some(Duration::from_secs(1)),
            Some(Duration::from_secs(2)),
            None,
        ];

        let summary = summarize_latencies(&samples).unwrap();

        assert_eq!(summary.samples, 3);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.min, Duration::from_secs(1));
        assert_eq!(summary.max, Duration::from_secs(3));
        assert_eq!(summary.mean, Duration::from_secs(2));
        assert_eq!(summary.p50, Duration::from_secs(2));
        assert_eq!(summary.p99, Duration::from_secs(3));
    }

    #[test]
    fn test_latency_percentiles_nearest_rank() {
        let samples: Vec<Option<Duration>> =
            (1..=100).map(|ms| Some(Duration::from_millis(ms))).collect();

        let summary = summarize_latencies(&samples).unwrap();

        assert_eq!(summary.p50, Duration::from_millis(50));
        assert_eq!(summary.p99, Duration::from_millis(99));
    }

    #[rstest]
    #[case::empty(vec![])]
    #[case::all_failed(vec![None, None])]
    fn test_latency_summary_without_confirmed_samples(#[case] samples: Vec<Option<Duration>>) {
        assert!(matches!(
            summarize_latencies(&samples),
            Err(BenchError::Aggregation { .. })
        ));
    }
}
