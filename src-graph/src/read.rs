//! Read frequency response curves from delimited text files.
//!
//! Files contain one sample per line, `frequency<delim>spl[<delim>...]`;
//! extra fields are ignored. Malformed rows are skipped with a diagnostic
//! naming the row and the source, never treated as fatal.

use std::error::Error;
use std::fs;
use std::path::Path;

use csv::ReaderBuilder;

use crate::Curve;

/// Parse delimited curve data from a string.
///
/// # Arguments
/// * `text` - Raw file content
/// * `delimiter` - Field delimiter byte (e.g. b',')
/// * `source` - Identifier used in diagnostics for skipped rows
///
/// # Returns
/// * A Curve holding every row whose first two fields parse as floats.
///   Empty or all-invalid input yields an empty curve.
pub fn parse_curve(text: &str, delimiter: u8, source: &str) -> Curve {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(text.as_bytes());

    let mut freq = Vec::new();
    let mut spl = Vec::new();

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Ignoring unreadable row in {}: {}", source, e);
                continue;
            }
        };

        let parsed = match (record.get(0), record.get(1)) {
            (Some(f), Some(s)) => match (f.trim().parse::<f64>(), s.trim().parse::<f64>()) {
                (Ok(f), Ok(s)) => Some((f, s)),
                _ => None,
            },
            _ => None,
        };

        match parsed {
            Some((f, s)) => {
                freq.push(f);
                spl.push(s);
            }
            None => {
                eprintln!("Ignoring: {:?} in {}", record, source);
            }
        }
    }

    Curve::from_vecs(freq, spl)
}

/// Read a frequency response curve from a delimited text file.
///
/// # Arguments
/// * `path` - Path to the data file
/// * `delimiter` - Field delimiter byte
///
/// # Returns
/// * Result containing a Curve struct or an I/O error
pub fn read_curve(path: &Path, delimiter: u8) -> Result<Curve, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_curve(&text, delimiter, &path.display().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_column_data() {
        let curve = parse_curve("20,0.5\n1000,3.25\n20000,-2\n", b',', "test");
        assert_eq!(curve.len(), 3);
        assert_eq!(curve.freq.to_vec(), vec![20.0, 1000.0, 20000.0]);
        assert_eq!(curve.spl.to_vec(), vec![0.5, 3.25, -2.0]);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let curve = parse_curve("100,1.0,phase,0.2\n200,2.0,junk\n", b',', "test");
        assert_eq!(curve.len(), 2);
        assert_eq!(curve.spl.to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let curve = parse_curve(
            "Frequency,SPL\n100,1.0\nnot,numeric\n300\n400,4.0\n",
            b',',
            "test",
        );
        assert_eq!(curve.freq.to_vec(), vec![100.0, 400.0]);
        assert_eq!(curve.spl.to_vec(), vec![1.0, 4.0]);
    }

    #[test]
    fn alternate_delimiter() {
        let curve = parse_curve("100;1.0\n200;2.0\n", b';', "test");
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn empty_input_yields_empty_curve() {
        let curve = parse_curve("", b',', "test");
        assert!(curve.is_empty());
    }
}
