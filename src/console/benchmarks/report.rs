//! CSV result files and the summary statistics that go into them.
//!
//! The result files are plain comma-separated values: the cells are labels
//! and numbers, never free text, so no quoting is needed.
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Arithmetic mean. Zero for an empty sample set.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation. Zero when there are fewer than two samples.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn std_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let avg = mean(values);
    let variance = values.iter().map(|value| (value - avg).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    variance.sqrt()
}

/// Writes a CSV file with a header row.
///
/// # Errors
///
/// Will return an error if the file cannot be created or written.
pub fn write_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, "{}", header.join(","))?;

    for row in rows {
        writeln!(writer, "{}", row.join(","))?;
    }

    writer.flush()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::{mean, std_deviation, write_csv};

    #[test]
    fn the_mean_of_an_empty_sample_set_should_be_zero() {
        assert!(mean(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn the_mean_should_be_the_arithmetic_average() {
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn the_std_deviation_should_be_zero_for_fewer_than_two_samples() {
        assert!(std_deviation(&[42.0]).abs() < f64::EPSILON);
    }

    #[test]
    fn the_std_deviation_should_use_the_sample_formula() {
        // Sample (n-1) variance of [2, 4, 4, 4, 5, 5, 7, 9] is 4.571...
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_deviation(&values) - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn it_should_write_the_header_and_the_rows() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.csv");

        write_csv(
            &path,
            &["Run", "Throughput (B/s)"],
            &[vec!["1".to_owned(), "1000".to_owned()], vec!["2".to_owned(), "2000".to_owned()]],
        )
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Run,Throughput (B/s)\n1,1000\n2,2000\n");
    }
}
