//! CSV report output
//!
//! This module centralizes the report formats:
//! - Throughput: `NODE,CLIENT,RATE,DURATION,TPS,CTPS`
//! - Latency: `SAMPLE,LATENCY` (failed samples leave `LATENCY` empty)
//! - Query: `QUERY,TIMES,SUCCEEDED,FAILED,DURATION,QPS`
//!
//! Decimal figures are written with four decimal places. All writers take
//! any `Write` so they can target stdout, files or buffers alike.

use std::io::Write;
use std::time::Duration;

use csv::Writer;
use rust_decimal::Decimal;

use crate::types::{BenchError, MetricsRecord, QueryReport};

pub const THROUGHPUT_HEADER: [&str; 6] = ["NODE", "CLIENT", "RATE", "DURATION", "TPS", "CTPS"];
pub const LATENCY_HEADER: [&str; 2] = ["SAMPLE", "LATENCY"];
pub const QUERY_HEADER: [&str; 6] = ["QUERY", "TIMES", "SUCCEEDED", "FAILED", "DURATION", "QPS"];

/// Write throughput records, one row per run segment
pub fn write_throughput_csv(
    records: &[MetricsRecord],
    output: &mut dyn Write,
) -> Result<(), BenchError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(THROUGHPUT_HEADER)?;

    for record in records {
        writer.write_record(&[
            record.nodes.to_string(),
            record.client.to_string(),
            format!("{:.4}", record.rate),
            format!("{:.4}", record.duration),
            format!("{:.4}", record.tps),
            format!("{:.4}", record.ctps),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write wait-and-measure samples in sample order, latency in seconds
pub fn write_latency_csv(
    samples: &[Option<Duration>],
    output: &mut dyn Write,
) -> Result<(), BenchError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(LATENCY_HEADER)?;

    for (index, sample) in samples.iter().enumerate() {
        let latency = sample.map(seconds).unwrap_or_default();
        writer.write_record(&[index.to_string(), latency])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the outcome of a query run
pub fn write_query_csv(report: &QueryReport, output: &mut dyn Write) -> Result<(), BenchError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(QUERY_HEADER)?;

    let millis = report.duration.as_millis() as i64;
    let qps = if millis == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(report.succeeded as u64) / Decimal::new(millis, 3)
    };
    writer.write_record(&[
        report.url.clone(),
        report.times.to_string(),
        report.succeeded.to_string(),
        report.failed.to_string(),
        seconds(report.duration),
        format!("{:.4}", qps.round_dp(4)),
    ])?;

    writer.flush()?;
    Ok(())
}

fn seconds(duration: Duration) -> String {
    let micros = Decimal::from(duration.as_micros() as u64);
    format!("{:.4}", (micros / Decimal::from(1_000_000u64)).round_dp(4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(tps: Decimal, ctps: Decimal) -> MetricsRecord {
        MetricsRecord {
            nodes: 4,
            client: 10,
            rate: Decimal::new(12, 1),
            duration: Decimal::from(90),
            tps,
            ctps,
        }
    }

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut dyn Write) -> Result<(), BenchError>,
    {
        let mut output = Vec::new();
        let result = write(&mut output);
        assert!(result.is_ok());
        String::from_utf8(output).unwrap()
    }

    #[rstest]
    #[case::single_record(
        vec![record(Decimal::new(11111, 4), Decimal::new(5556, 4))],
        "NODE,CLIENT,RATE,DURATION,TPS,CTPS\n4,10,1.2000,90.0000,1.1111,0.5556\n"
    )]
    #[case::zero_throughput(
        vec![record(Decimal::ZERO, Decimal::ZERO)],
        "NODE,CLIENT,RATE,DURATION,TPS,CTPS\n4,10,1.2000,90.0000,0.0000,0.0000\n"
    )]
    #[case::empty(vec![], "NODE,CLIENT,RATE,DURATION,TPS,CTPS\n")]
    fn test_write_throughput_csv(#[case] records: Vec<MetricsRecord>, #[case] expected: &str) {
        let output = render(|out| write_throughput_csv(&records, out));
        assert_eq!(output, expected);
    }

    #[rstest]
    #[case::confirmed(
        vec![Some(Duration::from_millis(2500)), Some(Duration::from_micros(1_234_567))],
        "SAMPLE,LATENCY\n0,2.5000\n1,1.2346\n"
    )]
    #[case::failed_sample_left_empty(
        vec![Some(Duration::from_secs(1)), None, Some(Duration::from_secs(3))],
        "SAMPLE,LATENCY\n0,1.0000\n1,\n2,3.0000\n"
    )]
    #[case::empty(vec![], "SAMPLE,LATENCY\n")]
    fn test_write_latency_csv(#[case] samples: Vec<Option<Duration>>, #[case] expected: &str) {
        let output = render(|out| write_latency_csv(&samples, out));
        assert_eq!(output, expected);
    }

    #[rstest]
    #[case::all_succeeded(20, 0, Duration::from_secs(4), "http://127.0.0.1:5600,20,20,0,4.0000,5.0000\n")]
    #[case::some_failed(20, 5, Duration::from_millis(2500), "http://127.0.0.1:5600,20,15,5,2.5000,6.0000\n")]
    #[case::zero_duration(1, 0, Duration::ZERO, "http://127.0.0.1:5600,1,1,0,0.0000,0.0000\n")]
    fn test_write_query_csv(
        #[case] times: usize,
        #[case] failed: usize,
        #[case] duration: Duration,
        #[case] expected_row: &str,
    ) {
        let report = QueryReport {
            url: "http://127.0.0.1:5600".to_string(),
            times,
            succeeded: times - failed,
            failed,
            duration,
        };

        let output = render(|out| write_query_csv(&report, out));

        assert_eq!(
            output,
            format!("QUERY,TIMES,SUCCEEDED,FAILED,DURATION,QPS\n{}", expected_row)
        );
    }
}
